//! # Batch Upload Orchestrator
//!
//! Runs one batch of certificate uploads against the remote service:
//!
//! 1.  **Setup checks**: the template image, title, issue date and name color
//!     are validated before anything leaves the server. The rank color is only
//!     checked once the rows show that a rank will be printed.
//! 2.  **Row extraction**: the CSV file or the manual entries are turned into
//!     rows. A CSV header without email/name columns ends the batch here.
//! 3.  **Template upload** (`TemplateUploading`): the image is uploaded once and
//!     the returned template and folder identifiers are shared by every row.
//! 4.  **Row processing** (`RowProcessing`): rows are handled one after the
//!     other, in input order, with at most one remote call in flight. A row that
//!     lacks an email or a name is skipped without calling the service; any
//!     other row is submitted and counted as uploaded or failed. A failed row
//!     never stops the batch.
//! 5.  **Completion**: a summary line with the counters is always logged, also
//!     when setup failed and no row was attempted.
//!
//! Progress and log lines are pushed through a [`BatchReporter`] to the job
//! controller, which keeps the snapshot polled by the upload page.
//!
//! Batches are not idempotent: running the same rows twice creates the
//! certificates twice on the remote side.

use crate::job_controller::state::{BatchEvent, BatchUpdate};
use crate::remote::{CertificateService, ServiceError};
use crate::services::batches::rows::{self, ExtractError, RowSource};
use chrono::NaiveDate;
use common::jobs::{progress_percent, BatchPhase, RowOutcome};
use common::model::submission::CertificateSubmission;
use common::model::upload::UploadConfig;
use log::{info, warn};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tokio::sync::mpsc;

/// Everything a batch needs, owned by the batch for its whole run.
#[derive(Debug, Clone)]
pub struct Batch {
    pub config: UploadConfig,
    pub template: Vec<u8>,
    pub source: RowSource,
}

/// Problems that end a batch before any row is attempted.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Template image is required")]
    MissingTemplate,

    #[error("Certificate title is required")]
    MissingTitle,

    #[error("Issue date '{0}' is not a valid YYYY-MM-DD date")]
    InvalidIssueDate(String),

    #[error("Issue date {0} is in the future")]
    FutureIssueDate(NaiveDate),

    #[error("{field} color '{value}' must look like #RRGGBB")]
    InvalidColor { field: &'static str, value: String },

    #[error(transparent)]
    Rows(#[from] ExtractError),

    #[error("No certificate rows found")]
    NoRows,

    #[error(transparent)]
    Template(ServiceError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub success: usize,
    /// Skipped rows included.
    pub failed: usize,
}

/// Sends the events of one batch to the job controller.
pub struct BatchReporter {
    batch_id: String,
    tx: mpsc::Sender<BatchUpdate>,
}

impl BatchReporter {
    pub fn new(batch_id: impl Into<String>, tx: mpsc::Sender<BatchUpdate>) -> Self {
        Self {
            batch_id: batch_id.into(),
            tx,
        }
    }

    async fn send(&self, event: BatchEvent) {
        let update = BatchUpdate {
            batch_id: self.batch_id.clone(),
            event,
        };
        if self.tx.send(update).await.is_err() {
            warn!("Batch {}: status updater is gone", self.batch_id);
        }
    }

    async fn phase(&self, phase: BatchPhase) {
        self.send(BatchEvent::Phase(phase)).await;
    }

    async fn log(&self, line: impl Into<String>) {
        self.send(BatchEvent::Log(line.into())).await;
    }
}

/// Runs the batch to its end and reports the final counters.
///
/// Never fails: setup errors are logged and turned into the `Failed` phase.
pub async fn run_batch<S: CertificateService>(
    service: &S,
    batch: Batch,
    today: NaiveDate,
    reporter: &BatchReporter,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    let phase = match process_batch(service, batch, today, reporter, &mut summary).await {
        Ok(()) => {
            info!(
                "Batch {} complete: {} uploaded, {} failed",
                reporter.batch_id, summary.success, summary.failed
            );
            reporter
                .log(format!(
                    "Upload complete. Success: {}, Failed: {}",
                    summary.success, summary.failed
                ))
                .await;
            BatchPhase::Complete
        }
        Err(e) => {
            warn!("Batch {} aborted: {e}", reporter.batch_id);
            reporter.log(format!("Error: {e}")).await;
            reporter
                .log(format!(
                    "Upload aborted. Success: {}, Failed: {}",
                    summary.success, summary.failed
                ))
                .await;
            BatchPhase::Failed(e.to_string())
        }
    };

    reporter.phase(phase).await;
    summary
}

async fn process_batch<S: CertificateService>(
    service: &S,
    batch: Batch,
    today: NaiveDate,
    reporter: &BatchReporter,
    summary: &mut BatchSummary,
) -> Result<(), SetupError> {
    let Batch {
        config,
        template,
        source,
    } = batch;

    validate_setup(&config, &template, today)?;

    reporter.log("Parsing rows...").await;
    let extracted = rows::extract(source)?;
    if extracted.rows.is_empty() {
        return Err(SetupError::NoRows);
    }
    let total = extracted.rows.len();
    if extracted.has_rank {
        check_color("Rank", &config.rank.color)?;
    }
    reporter
        .send(BatchEvent::Rows {
            total,
            has_rank: extracted.has_rank,
        })
        .await;
    if let Some(columns) = &extracted.columns {
        let header = |idx: usize| columns.headers.get(idx).map_or("", String::as_str);
        reporter
            .log(format!(
                "Using column '{}' for email and '{}' for name.",
                header(columns.email),
                header(columns.name)
            ))
            .await;
    }
    reporter
        .log(format!("Found {total} rows. Starting upload..."))
        .await;
    if extracted.has_rank {
        reporter.log("Rank data detected.").await;
    }

    reporter.phase(BatchPhase::TemplateUploading).await;
    reporter.log("Uploading template...").await;
    let ids = service
        .upload_template(&template, &config.certificate_title)
        .await
        .map_err(SetupError::Template)?;
    reporter.log("Template uploaded.").await;

    reporter.phase(BatchPhase::RowProcessing).await;
    for (index, row) in extracted.rows.into_iter().enumerate() {
        let row_number = index + 1;

        let (outcome, line) = match row.into_record() {
            Err(reason) => {
                let line = format!("Row {row_number}: Skipped ({reason})");
                (RowOutcome::Skipped(reason), line)
            }
            Ok(record) => {
                let submission = CertificateSubmission::new(&record, &config, &ids);
                match service.upload_certificate(&submission).await {
                    Ok(()) => (
                        RowOutcome::Success,
                        format!("Row {row_number}: Uploaded ({})", record.name),
                    ),
                    Err(e) => {
                        warn!("Batch {} row {row_number}: {e}", reporter.batch_id);
                        let line = format!("Row {row_number}: Failed - {e}");
                        (RowOutcome::Failed(e.to_string()), line)
                    }
                }
            }
        };

        if outcome.is_success() {
            summary.success += 1;
        } else {
            summary.failed += 1;
        }
        reporter.log(line).await;
        reporter
            .send(BatchEvent::Row {
                outcome,
                progress: progress_percent(row_number, total),
            })
            .await;
    }

    Ok(())
}

/// Checks the batch-wide inputs.
pub fn validate_setup(
    config: &UploadConfig,
    template: &[u8],
    today: NaiveDate,
) -> Result<(), SetupError> {
    if template.is_empty() {
        return Err(SetupError::MissingTemplate);
    }
    if config.certificate_title.trim().is_empty() {
        return Err(SetupError::MissingTitle);
    }

    let issue_date = NaiveDate::parse_from_str(config.issue_date.trim(), "%Y-%m-%d")
        .map_err(|_| SetupError::InvalidIssueDate(config.issue_date.clone()))?;
    if issue_date > today {
        return Err(SetupError::FutureIssueDate(issue_date));
    }

    check_color("Name", &config.name.color)
}

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static regex is valid"));

fn check_color(field: &'static str, value: &str) -> Result<(), SetupError> {
    if COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(SetupError::InvalidColor {
            field,
            value: value.to_string(),
        })
    }
}
