//! Admin session handling.
//!
//! There is a single shared admin password. A successful login sets the
//! `admin_session` cookie; the guard in [`guard`] only checks that the cookie is
//! present.
//!
//! Routes:
//! - `POST /api/auth/login`: JSON `{"password": ...}`. Sets the cookie and
//!   answers `{"success": true}`, or `401` with `{"success": false}`.
//! - `POST /api/auth/logout`: clears the cookie. The upload page calls it after
//!   a period of inactivity.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod guard;
mod login;
mod logout;

pub const SESSION_COOKIE: &str = "admin_session";

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login::process))
        .route("/logout", post().to(logout::process))
}
