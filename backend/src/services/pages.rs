//! Pages and assets compiled into the binary from `backend/static`.
//!
//! - `GET /`: home page linking to the admin upload and the verification page.
//! - `GET /admin/login`: login form.
//! - `GET /admin/upload`: upload form with the batch log; `main.rs` mounts it
//!   behind the session guard.
//! - anything else is looked up as a static asset (the default service).

use actix_web::web::{get, scope, ServiceConfig};
use actix_web::{HttpRequest, HttpResponse, Scope};
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

fn embedded(file_path: &str) -> HttpResponse {
    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}

async fn home() -> HttpResponse {
    embedded("index.html")
}

async fn login_page() -> HttpResponse {
    embedded("login.html")
}

async fn upload_page() -> HttpResponse {
    embedded("upload.html")
}

pub async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    // Pages are only reachable through their routes.
    if path.is_empty() || path.ends_with(".html") {
        return HttpResponse::NotFound().body("Not Found");
    }
    embedded(path)
}

pub fn configure_public(cfg: &mut ServiceConfig) {
    cfg.route("/", get().to(home))
        .route("/admin/login", get().to(login_page));
}

pub fn upload_scope() -> Scope {
    scope("/admin/upload").route("", get().to(upload_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn pages_and_assets_are_served() {
        let app = test::init_service(
            App::new()
                .configure(configure_public)
                .service(upload_scope())
                .default_service(web::route().to(serve_embedded)),
        )
        .await;

        for (uri, content_type) in [
            ("/", "text/html"),
            ("/admin/login", "text/html"),
            ("/admin/upload", "text/html"),
            ("/app.css", "text/css"),
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let header = resp.headers().get("content-type").unwrap().to_str().unwrap();
            assert!(header.starts_with(content_type), "{uri}: {header}");
        }

        for uri in ["/missing.js", "/upload.html"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
