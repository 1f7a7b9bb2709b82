pub mod pass;
pub mod report;

pub use pass::{ReconcileOptions, Reconciler, ResolutionPolicy};
pub use report::{FailedReference, ReconcileReport};
