//! Batch certificate uploads.
//!
//! The provided routes (all behind the admin session guard) are:
//! - `POST /api/batches/start`: multipart upload with a `config` JSON field, a
//!   `template` image and the rows, either as a `file` CSV field or as an
//!   `entries` JSON array. The batch runs in the background and the handler
//!   answers right away with its `batch_id`. Only one batch runs at a time; a
//!   start while another is running gets `409 Conflict`.
//! - `GET /api/batches/status/{batch_id}`: the current `BatchStatus` with the
//!   phase, counters, progress percentage and log lines.

use crate::remote::CertificateService;
use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
pub mod orchestrator;
pub mod rows;
mod start;

const API_PATH: &str = "/api/batches";

/// Configures the batch routes. `main.rs` mounts the scope behind
/// `services::auth::guard::require_session`.
pub fn configure_routes<S: CertificateService + 'static>() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process::<S>))
        .route("/status/{batch_id}", get().to(get_status::process))
}
