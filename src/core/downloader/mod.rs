pub mod checksum;
pub mod client;

pub use checksum::{digest_file, verify_file};
pub use client::Downloader;
