// ─── Mods Manager ───
// Entry point for hosts: wires settings, catalog client, installer and
// reconciler together for one mods directory.

use std::path::PathBuf;

use tracing::info;

use crate::core::catalog::CurseForgeClient;
use crate::core::config::ModsSettings;
use crate::core::downloader::Downloader;
use crate::core::error::ModResult;
use crate::core::installer::{ModInstaller, StorageLayout};
use crate::core::manifest::{ManifestEntry, ManifestStore};
use crate::core::reconciler::{ReconcileOptions, ReconcileReport, Reconciler, ResolutionPolicy};

pub struct ModsManager {
    settings: ModsSettings,
    reconciler: Reconciler<CurseForgeClient>,
}

impl ModsManager {
    /// Prepare the state layout and authenticate against the catalog.
    pub async fn new(
        settings: ModsSettings,
        mods_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> ModResult<Self> {
        let data_dir: PathBuf = data_dir.into();
        let layout = StorageLayout::new(mods_dir, &data_dir);
        layout.ensure_dirs().await?;

        let catalog = CurseForgeClient::connect(&settings).await?;
        let downloader = Downloader::new(settings.download_timeout)?
            .with_cache(settings.cache_download_url.clone());
        let policy = ResolutionPolicy {
            channel: settings.release_channel,
            game_version: settings.game_version_filter.clone(),
            auto_update: settings.auto_update,
        };

        info!(
            "Mods manager ready (channel {}, game version {})",
            policy.channel,
            policy.game_version.as_deref().unwrap_or("any")
        );

        let reconciler = Reconciler::new(catalog, ModInstaller::new(layout, downloader), policy);
        Ok(Self {
            settings,
            reconciler,
        })
    }

    pub fn layout(&self) -> &StorageLayout {
        self.reconciler.layout()
    }

    /// Reconcile the mods directory against a reference blob.
    pub async fn install_all(&self, blob: &str) -> ModResult<ReconcileReport> {
        let options = ReconcileOptions {
            prune: self.settings.prune,
            fail_on_error: self.settings.fail_on_error,
        };
        self.reconciler.reconcile(blob, options).await
    }

    pub async fn installed(&self) -> Vec<(String, ManifestEntry)> {
        installed_mods(self.layout()).await
    }
}

/// Manifest entries with a recorded installation, ordered by key.
///
/// Reads local state only, no credentials needed.
pub async fn installed_mods(layout: &StorageLayout) -> Vec<(String, ManifestEntry)> {
    ManifestStore::new(layout.manifest_path())
        .load()
        .await
        .mods
        .into_iter()
        .filter(|(_, entry)| entry.installed.is_some())
        .collect()
}
