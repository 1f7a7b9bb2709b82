pub mod api;
pub mod client;
pub mod selection;
pub mod types;

pub use api::{CatalogApi, MAX_SCAN_OFFSET, PAGE_SIZE};
pub use client::CurseForgeClient;
pub use selection::{BestFileSelector, FileFilter};
pub use types::{CandidateFile, FileHash, HashAlgorithm, ReleaseChannel, ReleaseType};
