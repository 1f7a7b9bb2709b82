use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::layout::StorageLayout;
use super::publish::{publish, remove_entry};
use crate::core::catalog::{CandidateFile, CatalogApi};
use crate::core::downloader::{verify_file, Downloader};
use crate::core::error::{ModError, ModResult};
use crate::core::manifest::{InstalledFile, ManifestEntry, ResolvedFile};

/// Downloads, verifies and publishes one resolved file at a time.
pub struct ModInstaller {
    layout: StorageLayout,
    downloader: Downloader,
}

impl ModInstaller {
    pub fn new(layout: StorageLayout, downloader: Downloader) -> Self {
        Self { layout, downloader }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Install `file` for `mod_id` and return the updated manifest entry.
    ///
    /// 1. resolve a fresh download URL
    /// 2. stream into a staging file
    /// 3. verify the first supported advertised hash
    /// 4. move into the content-addressed store
    /// 5. publish under the visible name
    ///
    /// Any failure before step 5 completes leaves the mods directory as it
    /// was. Staging and store leftovers are harmless.
    pub async fn install<C>(
        &self,
        catalog: &C,
        mod_id: u64,
        file: &CandidateFile,
        entry: ManifestEntry,
    ) -> ModResult<ManifestEntry>
    where
        C: CatalogApi + ?Sized,
    {
        let download_url = catalog.download_url(mod_id, file.id).await?;
        let stored = self.layout.content_path(mod_id, file.id, &file.file_name);

        if self.reusable(&stored, file).await {
            info!("Reusing stored copy of mod {} file {}", mod_id, file.id);
        } else {
            self.fetch_into_store(&download_url, mod_id, file, &stored)
                .await?;
        }

        let visible_name = StorageLayout::visible_name(mod_id, file.id, &file.file_name);
        let visible = self.layout.visible_path(&visible_name);
        let method = publish(&stored, &visible).await?;
        debug!("Published {:?} via {:?}", visible, method);

        // A different file of the same mod may still be visible.
        if let Some(previous) = entry.installed.as_ref() {
            if previous.path != visible_name {
                let stale = self.layout.visible_path(&previous.path);
                if let Err(e) = remove_entry(&stale).await {
                    warn!("Could not remove superseded {:?}: {}", stale, e);
                }
            }
        }

        Ok(ManifestEntry {
            reference: entry.reference,
            resolved: Some(ResolvedFile::snapshot(file, &download_url)),
            installed: Some(InstalledFile {
                file_id: file.id,
                path: visible_name,
                installed_at_epoch: Utc::now().timestamp(),
            }),
            extra: entry.extra,
        })
    }

    /// A stored copy is reused only when it can be verified.
    async fn reusable(&self, stored: &Path, file: &CandidateFile) -> bool {
        if file.verifiable_hash().is_none() {
            return false;
        }
        if !tokio::fs::try_exists(stored).await.unwrap_or(false) {
            return false;
        }
        matches!(verify_file(stored, file).await, Ok(Some(_)))
    }

    async fn fetch_into_store(
        &self,
        url: &str,
        mod_id: u64,
        file: &CandidateFile,
        stored: &Path,
    ) -> ModResult<()> {
        let staging = self.layout.staging_path(mod_id, file.id);
        let result = self.stage(url, file, &staging, stored).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&staging).await;
        }
        result
    }

    async fn stage(
        &self,
        url: &str,
        file: &CandidateFile,
        staging: &Path,
        stored: &Path,
    ) -> ModResult<()> {
        let bytes = self.downloader.download_file(url, staging).await?;

        match verify_file(staging, file).await? {
            Some(algorithm) => debug!("{} verified ({})", file.file_name, algorithm.name()),
            None => warn!(
                "{} advertises no supported hash, installing unverified",
                file.file_name
            ),
        }

        if let Some(dir) = stored.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ModError::io(dir, e))?;
        }
        tokio::fs::rename(staging, stored)
            .await
            .map_err(|e| ModError::io(stored, e))?;

        info!("Downloaded {} ({} bytes)", file.file_name, bytes);
        Ok(())
    }
}
