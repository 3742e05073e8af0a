//! Public certificate verification.
//!
//! - `GET /verify/{cert_id}`: HTML page with the holder, title, issue date and
//!   status of a certificate.
//! - `GET /api/verify/{cert_id}`: the same lookup as JSON.
//!
//! A lookup the remote service answers with an error is shown as not found
//! (`404`). A lookup that could not reach the service at all is shown as
//! unavailable (`502`), so a visitor is not told a genuine certificate is
//! invalid because of a network problem.

use crate::remote::{CertificateService, ServiceError};
use actix_web::http::StatusCode;
use actix_web::web::{get, scope};
use actix_web::Scope;

mod api;
mod page;

pub fn configure_routes<S: CertificateService + 'static>() -> Scope {
    scope("/verify").route("/{cert_id}", get().to(page::process::<S>))
}

pub fn configure_api_routes<S: CertificateService + 'static>() -> Scope {
    scope("/api/verify").route("/{cert_id}", get().to(api::process::<S>))
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Rejected(_) => StatusCode::NOT_FOUND,
        ServiceError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}
