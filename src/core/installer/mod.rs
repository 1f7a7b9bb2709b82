pub mod layout;
pub mod mod_installer;
pub mod publish;

pub use layout::{safe_filename, StorageLayout};
pub use mod_installer::ModInstaller;
