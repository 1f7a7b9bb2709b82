// ─── Gamekeeper Mods Core ───
// Keeps a game server's mods directory in line with a list of CurseForge
// references.
//
// Architecture:
//   core/
//     reference/  Reference grammar + blob expansion (@file includes)
//     catalog/    CurseForge API client, file filters, newest-file scan
//     downloader/ Streaming downloads + SHA1/MD5 verification
//     installer/  Storage layout, content store, visible publishing
//     manifest/   Durable manifest model + atomic persistence
//     reconciler/ One pass over the reference list, pruning, report
//     config/     Values file + environment, typed settings
//     manager     Wiring for hosts and the binary

pub mod catalog;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod installer;
pub mod manager;
pub mod manifest;
pub mod reconciler;
pub mod reference;
