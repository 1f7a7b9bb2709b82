pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::{ConfigValues, ModsSettings};
pub use crate::core::error::{ModError, ModResult};
pub use crate::core::manager::{installed_mods, ModsManager};
pub use crate::core::reconciler::ReconcileReport;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gamekeeper_mods=debug")),
        )
        .try_init();
}
