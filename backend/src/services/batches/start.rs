//! `POST /api/batches/start`
//!
//! Reads the multipart form of the upload page, registers the batch with the
//! job controller and spawns the orchestrator. The handler does not wait for
//! the batch; callers poll the status endpoint with the returned `batch_id`.
//!
//! Only the shape of the form is checked here. Whether the template, title,
//! date and rows are usable is decided by the orchestrator, which reports a
//! bad batch as `Failed` in its status like any other setup failure.

use crate::config::Config;
use crate::error::AppError;
use crate::job_controller::state::{BatchEvent, BatchUpdate, BatchesState};
use crate::remote::CertificateService;
use crate::services::batches::orchestrator::{run_batch, Batch, BatchReporter};
use crate::services::batches::rows::RowSource;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse, ResponseError};
use chrono::Local;
use common::jobs::BatchPhase;
use common::model::certificate::ManualEntry;
use common::model::upload::UploadConfig;
use common::requests::StartBatchResponse;
use futures_util::StreamExt;
use log::{error, info, warn};
use mime_guess::mime;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) async fn process<S: CertificateService + 'static>(
    state: web::Data<BatchesState>,
    service: web::Data<S>,
    config: web::Data<Config>,
    payload: Multipart,
) -> HttpResponse {
    let scheduled = match read_batch(payload, config.max_upload_bytes).await {
        Ok(batch) => schedule_batch(&state, service.into_inner(), batch).await,
        Err(e) => Err(e),
    };

    match scheduled {
        Ok(batch_id) => HttpResponse::Ok().json(StartBatchResponse { batch_id }),
        Err(e) => {
            warn!("Batch not started: {e}");
            e.error_response()
        }
    }
}

async fn read_field(field: &mut Field, name: &str, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(AppError::FieldTooLarge {
                field: name.to_string(),
                limit,
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn parse_json<T: serde::de::DeserializeOwned>(
    field: &'static str,
    bytes: &[u8],
) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|source| AppError::InvalidJson { field, source })
}

/// Judged by the file name when there is one, otherwise by the part's
/// declared content type.
fn is_image(filename: &str, content_type: Option<&mime::Mime>) -> bool {
    let guessed = if filename.is_empty() {
        None
    } else {
        mime_guess::from_path(filename).first()
    };
    match (guessed, content_type) {
        (Some(m), _) => m.type_() == mime::IMAGE,
        (None, Some(m)) => m.type_() == mime::IMAGE,
        (None, None) => false,
    }
}

/// Collects the form fields into a [`Batch`].
async fn read_batch(mut payload: Multipart, limit: usize) -> Result<Batch, AppError> {
    let mut config: Option<UploadConfig> = None;
    let mut template = Vec::new();
    let mut csv: Option<Vec<u8>> = None;
    let mut entries: Option<Vec<ManualEntry>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();

        match field_name.as_deref() {
            Some("config") => {
                let bytes = read_field(&mut field, "config", limit).await?;
                config = Some(parse_json("config", &bytes)?);
            }
            Some("template") => {
                if !is_image(&filename, field.content_type()) {
                    return Err(AppError::MalformedUpload(format!(
                        "template '{filename}' is not an image"
                    )));
                }
                template = read_field(&mut field, "template", limit).await?;
            }
            Some("file") => {
                if !filename.is_empty() && !filename.to_lowercase().ends_with(".csv") {
                    return Err(AppError::MalformedUpload(
                        "The file must end with .csv".to_string(),
                    ));
                }
                csv = Some(read_field(&mut field, "file", limit).await?);
            }
            Some("entries") => {
                let bytes = read_field(&mut field, "entries", limit).await?;
                entries = Some(parse_json("entries", &bytes)?);
            }
            _ => {}
        }
    }

    let config =
        config.ok_or_else(|| AppError::MalformedUpload("missing 'config' field".to_string()))?;
    let source = match (csv, entries) {
        (Some(bytes), None) => RowSource::Csv(bytes),
        (None, Some(entries)) => RowSource::Manual(entries),
        (Some(_), Some(_)) => {
            return Err(AppError::MalformedUpload(
                "send either a 'file' or an 'entries' field, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::MalformedUpload(
                "missing rows: send a 'file' or an 'entries' field".to_string(),
            ))
        }
    };

    Ok(Batch {
        config,
        template,
        source,
    })
}

/// Registers the batch and spawns it. Returns the new batch id.
///
/// The outer task only watches the inner one, so a panic inside the batch
/// still ends with a `Failed` status and frees the in-flight slot.
async fn schedule_batch<S: CertificateService + 'static>(
    state: &BatchesState,
    service: Arc<S>,
    batch: Batch,
) -> Result<String, AppError> {
    let batch_id = Uuid::new_v4().to_string();
    state.begin(&batch_id).await?;
    info!("Batch {batch_id} scheduled");

    let tx = state.tx.clone();
    let reporter = BatchReporter::new(batch_id.clone(), tx.clone());
    let watched_id = batch_id.clone();

    tokio::spawn(async move {
        let today = Local::now().date_naive();
        let handle =
            tokio::spawn(async move { run_batch(service.as_ref(), batch, today, &reporter).await });

        if let Err(e) = handle.await {
            error!("Batch {watched_id} task failed: {e}");
            let _ = tx
                .send(BatchUpdate {
                    batch_id: watched_id,
                    event: BatchEvent::Phase(BatchPhase::Failed(format!("Task join error: {e}"))),
                })
                .await;
        }
    });

    Ok(batch_id)
}
