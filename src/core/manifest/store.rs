use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::model::{Manifest, SCHEMA_VERSION};
use crate::core::error::{ModError, ModResult};

/// Loads and saves the manifest document at a fixed path.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest. A missing or unparsable file yields an empty
    /// manifest ("nothing installed"); corruption is logged, never fatal.
    pub async fn load(&self) -> Manifest {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No manifest at {:?}, starting empty", self.path);
                return Manifest::default();
            }
            Err(e) => {
                warn!("Cannot read manifest {:?}: {}", self.path, e);
                return Manifest::default();
            }
        };

        match serde_json::from_str::<Manifest>(&raw) {
            Ok(manifest) => {
                if manifest.schema_version != SCHEMA_VERSION {
                    warn!(
                        "Manifest schema version {} differs from {}, reading best-effort",
                        manifest.schema_version, SCHEMA_VERSION
                    );
                }
                manifest
            }
            Err(e) => {
                warn!("Corrupt manifest at {:?}: {}", self.path, e);
                Manifest::default()
            }
        }
    }

    /// Stamp `last_check_epoch` and write the manifest atomically: the JSON
    /// goes to a sibling temp file first and is renamed over the target.
    pub async fn save(&self, manifest: &mut Manifest) -> ModResult<()> {
        manifest.last_check_epoch = Utc::now().timestamp();
        self.write(manifest).await
    }

    /// Write without touching `last_check_epoch`.
    pub async fn write(&self, manifest: &Manifest) -> ModResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        let persistence = |source| ModError::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(persistence)?;
        }

        let temp_path = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        if let Err(source) = write_synced(&temp_path, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(persistence(source));
        }
        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(persistence(source));
        }

        debug!("Manifest saved to {:?}", self.path);
        Ok(())
    }
}

/// Write `bytes` and flush them to disk before returning, so a later
/// rename never exposes an empty file after a crash.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ReleaseType;
    use crate::core::manifest::{HashInfo, InstalledFile, ManifestEntry, ResolvedFile};

    fn sample() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.last_check_epoch = 1_710_000_000;
        manifest.mods.insert(
            "238222".into(),
            ManifestEntry {
                reference: "jei@forge".into(),
                resolved: Some(ResolvedFile {
                    file_id: 5101,
                    file_name: "jei-forge.jar".into(),
                    display_name: "JEI Forge".into(),
                    file_date: "2024-03-01T00:00:00Z".into(),
                    release_type: ReleaseType::Beta,
                    download_url: "https://edge.example/jei-forge.jar".into(),
                    hash: Some(HashInfo {
                        algo: "sha1".into(),
                        value: "da39a3ee5e6b4b0d3255bfef95601890afd80709".into(),
                    }),
                }),
                installed: Some(InstalledFile {
                    file_id: 5101,
                    path: "cf-238222-5101-jei-forge.jar".into(),
                    installed_at_epoch: 1_710_000_000,
                }),
                extra: serde_json::Map::new(),
            },
        );
        manifest.mods.insert("42".into(), ManifestEntry::new("42"));
        manifest
    }

    #[tokio::test]
    async fn round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        let original = sample();

        store.write(&original).await.unwrap();
        let loaded = store.load().await;
        assert_eq!(loaded, original);

        store.write(&loaded).await.unwrap();
        assert_eq!(store.load().await, original);
    }

    #[tokio::test]
    async fn missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        let manifest = store.load().await;
        assert_eq!(manifest, Manifest::default());
    }

    #[tokio::test]
    async fn corrupt_manifest_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let manifest = ManifestStore::new(path).load().await;
        assert!(manifest.mods.is_empty());
    }

    #[tokio::test]
    async fn save_stamps_check_time_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("state").join("manifest.json"));
        let mut manifest = Manifest::default();
        store.save(&mut manifest).await.unwrap();

        assert!(manifest.last_check_epoch > 0);
        let names: Vec<_> = std::fs::read_dir(dir.path().join("state"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("manifest.json")]);
    }

    #[tokio::test]
    async fn overwrite_replaces_previous_manifest_completely() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let store = ManifestStore::new(path.clone());
        store.write(&sample()).await.unwrap();

        let mut smaller = Manifest::default();
        smaller.mods.insert("42".into(), ManifestEntry::new("42"));
        store.write(&smaller).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let on_disk: Manifest = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, smaller);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn synced_write_persists_every_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.tmp");
        let payload = vec![b'x'; 256 * 1024];
        write_synced(&path, &payload).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[tokio::test]
    async fn unwritable_location_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let store = ManifestStore::new(blocker.join("manifest.json"));
        let err = store.save(&mut Manifest::default()).await.unwrap_err();
        assert!(matches!(err, ModError::Persistence { .. }));
    }
}
