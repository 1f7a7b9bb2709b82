pub mod model;
pub mod store;

pub use model::{HashInfo, InstalledFile, Manifest, ManifestEntry, ResolvedFile, SCHEMA_VERSION};
pub use store::ManifestStore;
