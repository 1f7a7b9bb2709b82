use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::catalog::{CandidateFile, HashAlgorithm, ReleaseType};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Durable record of desired and installed mods, persisted as
/// `manifest.json` in the state directory.
///
/// Other schema versions are read best-effort; top-level fields this build
/// does not know about are carried through `extra` and written back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub last_check_epoch: i64,
    /// Keyed by numeric mod id as a string.
    #[serde(default)]
    pub mods: BTreeMap<String, ManifestEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_check_epoch: 0,
            mods: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Manifest {
    /// Entry whose recorded reference string is exactly `raw`.
    pub fn find_by_reference(&self, raw: &str) -> Option<(&String, &ManifestEntry)> {
        self.mods.iter().find(|(_, entry)| entry.reference == raw)
    }
}

/// Per-mod state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Reference exactly as the user wrote it.
    #[serde(default)]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<InstalledFile>,
    /// Per-entry fields written by other tools, kept on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ManifestEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            resolved: None,
            installed: None,
            extra: serde_json::Map::new(),
        }
    }

    /// True when the recorded installation is `file_id` and agrees with the
    /// resolved snapshot. Any disagreement means a reinstall is due.
    pub fn is_installed_as(&self, file_id: u64) -> bool {
        match (&self.installed, &self.resolved) {
            (Some(installed), Some(resolved)) => {
                installed.file_id == file_id && resolved.file_id == file_id
            }
            (Some(installed), None) => installed.file_id == file_id,
            (None, _) => false,
        }
    }
}

/// Snapshot of the chosen catalog file, taken at install time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    pub file_id: u64,
    pub file_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub file_date: String,
    pub release_type: ReleaseType,
    #[serde(default)]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashInfo>,
}

impl ResolvedFile {
    pub fn snapshot(file: &CandidateFile, download_url: &str) -> Self {
        Self {
            file_id: file.id,
            file_name: file.file_name.clone(),
            display_name: file.display_name.clone(),
            file_date: file.file_date.clone(),
            release_type: file.release_type,
            download_url: download_url.to_string(),
            hash: HashInfo::preferred(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    pub algo: String,
    pub value: String,
}

impl HashInfo {
    /// SHA1 when advertised, otherwise MD5.
    fn preferred(file: &CandidateFile) -> Option<Self> {
        let pick = |wanted: HashAlgorithm| {
            file.hashes
                .iter()
                .find(|h| h.algorithm() == Some(wanted))
                .map(|h| HashInfo {
                    algo: wanted.name().to_string(),
                    value: h.value.clone(),
                })
        };
        pick(HashAlgorithm::Sha1).or_else(|| pick(HashAlgorithm::Md5))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledFile {
    pub file_id: u64,
    /// Visible name relative to the mods directory.
    pub path: String,
    pub installed_at_epoch: i64,
}
