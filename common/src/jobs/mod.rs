//! Status of batch uploads, as polled by the upload page.

use serde::{Deserialize, Serialize};

/// Where a batch is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPhase {
    Idle,
    TemplateUploading,
    RowProcessing,
    Complete,
    Failed(String),
}

impl BatchPhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, BatchPhase::Complete | BatchPhase::Failed(_))
    }
}

/// Result of processing one input row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    Success,
    Skipped(String),
    Failed(String),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success)
    }
}

/// Snapshot of one batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchStatus {
    pub batch_id: String,
    pub phase: BatchPhase,
    pub progress: u8,
    pub total_rows: usize,
    pub success_count: usize,
    /// Includes skipped rows.
    pub fail_count: usize,
    pub has_rank: bool,
    pub logs: Vec<String>,
}

impl BatchStatus {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            phase: BatchPhase::Idle,
            progress: 0,
            total_rows: 0,
            success_count: 0,
            fail_count: 0,
            has_rank: false,
            logs: Vec::new(),
        }
    }
}

/// `round(processed / total * 100)`, halves rounded up.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let processed = processed.min(total);
    ((processed * 200 + total) / (total * 2)) as u8
}
