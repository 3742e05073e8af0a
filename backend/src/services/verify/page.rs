use super::status_for;
use crate::remote::{CertificateService, ServiceError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate};
use common::model::certificate::Certificate;

pub(crate) async fn process<S: CertificateService + 'static>(
    cert_id: web::Path<String>,
    service: web::Data<S>,
) -> HttpResponse {
    let (status, body) = match service.verify_certificate(cert_id.trim()).await {
        Ok(cert) => (StatusCode::OK, render_certificate(&cert)),
        Err(e) => (status_for(&e), render_failure(&e)),
    };
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// `2025-03-12` or an RFC 3339 timestamp as `12 Mar 2025`; anything else as is.
pub(crate) fn format_issue_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()));
    match date {
        Some(date) => date.format("%-d %b %Y").to_string(),
        None => raw.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/app.css\">\n</head>\n\
         <body>\n<main class=\"card\">\n{content}\n</main>\n</body>\n</html>\n"
    )
}

fn render_certificate(cert: &Certificate) -> String {
    let indicator = if cert.is_active() { "active" } else { "inactive" };
    let rank = cert
        .rank
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| format!("<dt>Rank</dt><dd>{}</dd>\n", escape(r)))
        .unwrap_or_default();

    let content = format!(
        "<header class=\"banner\"><h1>Certificate Verification</h1><p>Official Record</p></header>\n\
         <dl>\n<dt>Certificate Holder</dt><dd class=\"holder\">{name}</dd>\n\
         <dt>Issued For</dt><dd>{title}</dd>\n{rank}\
         <dt>Issue Date</dt><dd>{date}</dd>\n</dl>\n\
         <footer><span class=\"status {indicator}\">{status} Status</span>\
         <span class=\"cert-id\">ID: {id}</span></footer>",
        name = escape(&cert.name),
        title = escape(&cert.certificate_title),
        date = escape(&format_issue_date(&cert.issue_date)),
        status = escape(&cert.status),
        id = escape(&cert.cert_id),
    );
    layout("Certificate Verification", &content)
}

fn render_failure(err: &ServiceError) -> String {
    let (heading, message) = match err {
        ServiceError::Rejected(message) => ("Verification Failed", message.as_str()),
        ServiceError::Transport(_) => (
            "Verification Unavailable",
            "The verification service could not be reached. Please try again later.",
        ),
    };
    let content = format!(
        "<div class=\"failure\"><h1>{heading}</h1><p>{}</p></div>",
        escape(message)
    );
    layout(heading, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::FakeService;
    use crate::services::verify::configure_routes;
    use actix_web::test::{
        call_and_read_body, call_service, init_service, read_body, TestRequest,
    };
    use actix_web::App;

    fn cert(status: &str) -> Certificate {
        Certificate {
            cert_id: "C-1".into(),
            status: status.into(),
            name: "Alice <Admin>".into(),
            certificate_title: "Rust 101".into(),
            issue_date: "2025-03-12T00:00:00.000Z".into(),
            email: None,
            rank: Some("Gold".into()),
        }
    }

    #[test]
    fn issue_dates_are_written_out() {
        assert_eq!(format_issue_date("2025-03-12"), "12 Mar 2025");
        assert_eq!(format_issue_date("2025-03-02T10:00:00+01:00"), "2 Mar 2025");
        assert_eq!(format_issue_date("sometime"), "sometime");
    }

    #[test]
    fn certificate_page_escapes_and_marks_status() {
        let html = render_certificate(&cert("active"));
        assert!(html.contains("Alice &lt;Admin&gt;"));
        assert!(html.contains("12 Mar 2025"));
        assert!(html.contains("status active"));
        assert!(html.contains("ID: C-1"));
        assert!(html.contains("<dt>Rank</dt><dd>Gold</dd>"));

        assert!(render_certificate(&cert("revoked")).contains("status inactive"));
    }

    #[actix_web::test]
    async fn unknown_id_renders_not_found_page() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(FakeService::accepting()))
                .service(configure_routes::<FakeService>()),
        )
        .await;

        let req = TestRequest::get().uri("/verify/C-404").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Verification Failed"));
        assert!(html.contains("Certificate not found"));
    }

    #[actix_web::test]
    async fn known_id_renders_record() {
        let service = FakeService::accepting().with_certificate(cert("active"));
        let app = init_service(
            App::new()
                .app_data(web::Data::new(service))
                .service(configure_routes::<FakeService>()),
        )
        .await;

        let req = TestRequest::get().uri("/verify/C-1").to_request();
        let body = call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Certificate Verification"));
        assert!(html.contains("Rust 101"));
    }
}
