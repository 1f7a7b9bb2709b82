use crate::core::error::ModError;

/// One reference that could not be satisfied in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedReference {
    pub reference: String,
    pub reason: String,
}

/// Outcome of a reconciliation pass, by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Freshly downloaded or republished.
    pub installed: Vec<String>,
    /// Already satisfied on disk.
    pub unchanged: Vec<String>,
    /// Manifest keys removed by pruning.
    pub pruned: Vec<String>,
    pub failed: Vec<FailedReference>,
}

impl ReconcileReport {
    pub fn record_failure(&mut self, reference: &str, error: &ModError) {
        self.failed.push(FailedReference {
            reference: reference.to_string(),
            reason: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Aggregate error naming every failed reference.
    pub fn failure_error(&self) -> ModError {
        ModError::Failures {
            count: self.failed.len(),
            references: self.failed.iter().map(|f| f.reference.clone()).collect(),
        }
    }
}
