//! Route guard for the admin area.
//!
//! Only the presence of the session cookie is checked, not its value. Without
//! it, page routes are redirected to the login page and API routes answer
//! `401 Unauthorized`.

use super::SESSION_COOKIE;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse};
use log::debug;
use serde_json::json;

pub const LOGIN_PAGE: &str = "/admin/login";

pub async fn require_session<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    if req.cookie(SESSION_COOKIE).is_some() {
        return next.call(req).await.map(ServiceResponse::map_into_left_body);
    }

    debug!("No admin session for {}", req.path());
    let response = if req.path().starts_with("/api/") {
        HttpResponse::Unauthorized().json(json!({ "error": "Not logged in" }))
    } else {
        HttpResponse::Found()
            .insert_header((LOCATION, LOGIN_PAGE))
            .finish()
    };
    Ok(req.into_response(response).map_into_right_body())
}
