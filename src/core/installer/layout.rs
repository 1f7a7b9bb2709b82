use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::publish::remove_entry;
use crate::core::error::{ModError, ModResult};

const STATE_DIR_NAME: &str = ".curseforge-mods";

/// On-disk layout used by the installer.
///
/// ```text
/// <mods_dir>/cf-<mod>-<file>-<name>      visible entries (links or copies)
/// <data_dir>/.curseforge-mods/
///     downloads/                         staging for in-flight downloads
///     files/<mod>/<file>/<name>          content-addressed store
///     manifest.json
/// ```
#[derive(Debug, Clone)]
pub struct StorageLayout {
    mods_dir: PathBuf,
    state_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(mods_dir: impl Into<PathBuf>, data_dir: impl AsRef<Path>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            state_dir: data_dir.as_ref().join(STATE_DIR_NAME),
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.state_dir.join("downloads")
    }

    pub fn files_dir(&self) -> PathBuf {
        self.state_dir.join("files")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir.join("manifest.json")
    }

    /// Create every directory of the layout and clear publish leftovers
    /// from an interrupted earlier run.
    pub async fn ensure_dirs(&self) -> ModResult<()> {
        for dir in [
            self.mods_dir.clone(),
            self.state_dir.clone(),
            self.downloads_dir(),
            self.files_dir(),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| ModError::io(&dir, e))?;
        }
        self.sweep_partials().await
    }

    /// Remove hidden `.<name>.<id>.partial` entries from the mods directory.
    async fn sweep_partials(&self) -> ModResult<()> {
        let mut entries = tokio::fs::read_dir(&self.mods_dir)
            .await
            .map_err(|e| ModError::io(&self.mods_dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ModError::io(&self.mods_dir, e))?
        {
            let name = entry.file_name();
            if !is_partial_name(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            match remove_entry(&path).await {
                Ok(()) => debug!("Removed stale publish entry {:?}", path),
                Err(e) => warn!("Could not remove stale publish entry {:?}: {}", path, e),
            }
        }
        Ok(())
    }

    /// Unique staging file for one download attempt.
    pub fn staging_path(&self, mod_id: u64, file_id: u64) -> PathBuf {
        self.downloads_dir()
            .join(format!("{mod_id}-{file_id}-{}.tmp", Uuid::new_v4().simple()))
    }

    /// Store directory holding every file ever installed for a mod.
    pub fn mod_store_dir(&self, mod_key: &str) -> PathBuf {
        self.files_dir().join(mod_key)
    }

    pub fn content_path(&self, mod_id: u64, file_id: u64, file_name: &str) -> PathBuf {
        let mut name = safe_filename(file_name);
        if name.is_empty() || name.chars().all(|c| c == '.') {
            name = format!("file-{file_id}");
        }
        self.mod_store_dir(&mod_id.to_string())
            .join(file_id.to_string())
            .join(name)
    }

    /// Stable, collision-free name inside the mods directory.
    pub fn visible_name(mod_id: u64, file_id: u64, file_name: &str) -> String {
        format!("cf-{mod_id}-{file_id}-{}", safe_filename(file_name))
    }

    pub fn visible_path(&self, relative: &str) -> PathBuf {
        self.mods_dir.join(relative)
    }
}

fn is_partial_name(name: &str) -> bool {
    name.len() > ".partial".len() + 1 && name.starts_with('.') && name.ends_with(".partial")
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
