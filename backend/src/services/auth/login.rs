use super::SESSION_COOKIE;
use crate::config::Config;
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use common::requests::{LoginRequest, LoginResponse};
use log::{info, warn};

pub(crate) async fn process(
    config: web::Data<Config>,
    payload: web::Json<LoginRequest>,
) -> HttpResponse {
    if payload.password != config.admin_password {
        warn!("Rejected admin login");
        return HttpResponse::Unauthorized().json(LoginResponse { success: false });
    }

    info!("Admin logged in");
    HttpResponse::Ok()
        .cookie(session_cookie(config.production))
        .json(LoginResponse { success: true })
}

fn session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "true")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::hours(24))
        .path("/")
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::configure_routes;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;
    use serde_json::json;

    fn config(production: bool) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 0,
            remote_url: "http://unused".into(),
            admin_password: "open sesame".into(),
            production,
            request_timeout: std::time::Duration::from_secs(1),
            max_upload_bytes: 1024,
        }
    }

    #[actix_web::test]
    async fn correct_password_sets_strict_session_cookie() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(config(true)))
                .service(configure_routes()),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "password": "open sesame" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
        assert_eq!(cookie.path(), Some("/"));

        let body: LoginResponse = read_body_json(resp).await;
        assert!(body.success);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized_without_cookie() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(config(false)))
                .service(configure_routes()),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "password": "guess" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.response().cookies().count(), 0);
    }

    #[test]
    fn cookie_is_not_secure_outside_production() {
        assert_eq!(session_cookie(false).secure(), Some(false));
    }
}
