use super::status_for;
use crate::remote::CertificateService;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub(crate) async fn process<S: CertificateService + 'static>(
    cert_id: web::Path<String>,
    service: web::Data<S>,
) -> HttpResponse {
    match service.verify_certificate(cert_id.trim()).await {
        Ok(cert) => HttpResponse::Ok().json(cert),
        Err(e) => {
            let kind = if e.is_transport() {
                "unavailable"
            } else {
                "not_found"
            };
            HttpResponse::build(status_for(&e)).json(json!({
                "error": kind,
                "message": e.to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::FakeService;
    use crate::services::verify::configure_api_routes;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use common::model::certificate::Certificate;
    use serde_json::Value;

    fn service() -> FakeService {
        FakeService::accepting().with_certificate(Certificate {
            cert_id: "C-1".into(),
            status: "active".into(),
            name: "Alice".into(),
            certificate_title: "Rust 101".into(),
            issue_date: "2025-03-12".into(),
            email: None,
            rank: None,
        })
    }

    #[actix_web::test]
    async fn known_certificate_is_returned() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service()))
                .service(configure_api_routes::<FakeService>()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/verify/C-1").to_request();
        let cert: Certificate = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cert.name, "Alice");
    }

    #[actix_web::test]
    async fn not_found_and_unavailable_are_distinct() {
        let down = FakeService {
            verify_transport_down: true,
            ..service()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service()))
                .service(configure_api_routes::<FakeService>()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/verify/C-404").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_found");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(down))
                .service(configure_api_routes::<FakeService>()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/verify/C-1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
