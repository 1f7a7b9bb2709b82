use async_trait::async_trait;
use tracing::debug;

use super::selection::{BestFileSelector, FileFilter};
use super::types::CandidateFile;
use crate::core::error::{ModError, ModResult};

/// Files requested per listing page.
pub const PAGE_SIZE: u32 = 50;

/// Listing stops once the page index reaches this many records.
pub const MAX_SCAN_OFFSET: u32 = 10_000;

/// Everything the installer and reconciler need from a remote catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Map a slug to a numeric mod id.
    async fn resolve_slug(&self, slug: &str) -> ModResult<u64>;

    /// One page of a mod's files, starting at record `index`.
    async fn list_files(
        &self,
        mod_id: u64,
        index: u32,
        page_size: u32,
    ) -> ModResult<Vec<CandidateFile>>;

    /// Direct lookup of a pinned file, no filtering applied.
    ///
    /// Without `mod_id` the file is looked up by id alone and the returned
    /// record carries its owning mod in `mod_id`.
    async fn get_file(&self, mod_id: Option<u64>, file_id: u64) -> ModResult<CandidateFile>;

    /// A fresh (possibly short-lived) download URL for one file.
    async fn download_url(&self, mod_id: u64, file_id: u64) -> ModResult<String>;

    /// Scan the mod's listing page by page and return the newest file that
    /// passes `filter`.
    async fn resolve_best_file(&self, mod_id: u64, filter: &FileFilter) -> ModResult<CandidateFile> {
        let mut selector = BestFileSelector::new(filter);
        let mut index = 0;

        while index < MAX_SCAN_OFFSET {
            let page = self.list_files(mod_id, index, PAGE_SIZE).await?;
            debug!("Mod {}: {} files at offset {}", mod_id, page.len(), index);
            for file in &page {
                selector.offer(file);
            }
            if page.len() < PAGE_SIZE as usize {
                break;
            }
            index += PAGE_SIZE;
        }

        selector
            .finish()
            .ok_or(ModError::NoMatchingFile { mod_id })
    }
}
