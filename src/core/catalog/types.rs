use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maturity level the catalog assigns to a file.
///
/// Serialized as the catalog's integer code (`1` release, `2` beta,
/// `3` alpha). Unknown codes are preserved so a page never fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ReleaseType {
    Release,
    Beta,
    Alpha,
    Other(u8),
}

impl From<u8> for ReleaseType {
    fn from(code: u8) -> Self {
        match code {
            1 => ReleaseType::Release,
            2 => ReleaseType::Beta,
            3 => ReleaseType::Alpha,
            other => ReleaseType::Other(other),
        }
    }
}

impl From<ReleaseType> for u8 {
    fn from(release_type: ReleaseType) -> Self {
        match release_type {
            ReleaseType::Release => 1,
            ReleaseType::Beta => 2,
            ReleaseType::Alpha => 3,
            ReleaseType::Other(code) => code,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Release => write!(f, "release"),
            ReleaseType::Beta => write!(f, "beta"),
            ReleaseType::Alpha => write!(f, "alpha"),
            ReleaseType::Other(code) => write!(f, "type-{code}"),
        }
    }
}

/// Policy selecting which release types are eligible during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseChannel {
    #[default]
    Release,
    Beta,
    Alpha,
    Any,
}

impl ReleaseChannel {
    pub fn allowed(&self) -> &'static [ReleaseType] {
        match self {
            ReleaseChannel::Release => &[ReleaseType::Release],
            ReleaseChannel::Beta => &[ReleaseType::Release, ReleaseType::Beta],
            ReleaseChannel::Alpha | ReleaseChannel::Any => {
                &[ReleaseType::Release, ReleaseType::Beta, ReleaseType::Alpha]
            }
        }
    }

    pub fn allows(&self, release_type: ReleaseType) -> bool {
        self.allowed().contains(&release_type)
    }
}

impl FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "release" => Ok(ReleaseChannel::Release),
            "beta" => Ok(ReleaseChannel::Beta),
            "alpha" => Ok(ReleaseChannel::Alpha),
            "any" => Ok(ReleaseChannel::Any),
            other => Err(format!("unknown release channel '{other}'")),
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseChannel::Release => write!(f, "release"),
            ReleaseChannel::Beta => write!(f, "beta"),
            ReleaseChannel::Alpha => write!(f, "alpha"),
            ReleaseChannel::Any => write!(f, "any"),
        }
    }
}

/// Digest algorithms the catalog advertises that we can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
}

impl HashAlgorithm {
    /// Catalog wire code: `1` SHA1, `2` MD5.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(HashAlgorithm::Sha1),
            2 => Some(HashAlgorithm::Md5),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
        }
    }
}

/// One `{algo, value}` pair from a file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    pub algo: u8,
    pub value: String,
}

impl FileHash {
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_code(self.algo)
    }
}

/// A file the catalog offers for a mod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFile {
    pub id: u64,
    /// Owning mod; always present on single-file lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_id: Option<u64>,
    pub file_name: String,
    #[serde(default)]
    pub display_name: String,
    /// ISO-8601, so string order is chronological order.
    #[serde(default)]
    pub file_date: String,
    pub release_type: ReleaseType,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub hashes: Vec<FileHash>,
    #[serde(default)]
    pub game_versions: Vec<String>,
}

impl CandidateFile {
    /// First advertised hash with an algorithm we support.
    pub fn verifiable_hash(&self) -> Option<(HashAlgorithm, &str)> {
        self.hashes
            .iter()
            .find_map(|h| h.algorithm().map(|algo| (algo, h.value.as_str())))
    }
}
