use super::{CertificateService, ServiceError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::certificate::Certificate;
use common::model::submission::CertificateSubmission;
use common::model::upload::TemplateIds;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Answer shape shared by every mode of the script endpoint.
#[derive(Debug, Deserialize)]
struct ServiceResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    template_drive_id: Option<String>,
    #[serde(default)]
    output_folder_id: Option<String>,
}

impl ServiceResponse {
    fn into_success(self, fallback: &str) -> Result<Self, ServiceError> {
        if self.status == "success" {
            Ok(self)
        } else {
            Err(ServiceError::Rejected(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}

#[derive(Serialize)]
struct TemplateUpload<'a> {
    mode: &'static str,
    image_data: String,
    event_name: &'a str,
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        // The URL holds the row payload; keep it out of messages.
        if e.is_timeout() {
            ServiceError::Transport("request timed out".to_string())
        } else {
            ServiceError::Transport(e.without_url().to_string())
        }
    }
}

/// HTTP client for the script endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    url: String,
}

impl RemoteClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn call(&self, request: reqwest::RequestBuilder) -> Result<ServiceResponse, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Transport(format!(
                "remote service answered {status}"
            )));
        }
        response
            .json::<ServiceResponse>()
            .await
            .map_err(|e| {
                ServiceError::Transport(format!("unreadable response: {}", e.without_url()))
            })
    }
}

impl CertificateService for RemoteClient {
    async fn upload_template(&self, image: &[u8], label: &str) -> Result<TemplateIds, ServiceError> {
        let payload = TemplateUpload {
            mode: "upload_template",
            image_data: BASE64.encode(image),
            event_name: label,
        };

        let response = self
            .call(self.http.post(&self.url).json(&payload))
            .await
            .inspect_err(|e| error!("Template upload error: {e}"))?
            .into_success("Template upload failed")?;

        match (response.template_drive_id, response.output_folder_id) {
            (Some(template_drive_id), Some(output_folder_id))
                if !template_drive_id.is_empty() && !output_folder_id.is_empty() =>
            {
                Ok(TemplateIds {
                    template_drive_id,
                    output_folder_id,
                })
            }
            _ => Err(ServiceError::Rejected(
                "Template upload did not return template and folder identifiers".to_string(),
            )),
        }
    }

    async fn upload_certificate(
        &self,
        submission: &CertificateSubmission,
    ) -> Result<(), ServiceError> {
        let payload = serde_json::to_string(submission)
            .map_err(|e| ServiceError::Transport(format!("could not encode payload: {e}")))?;
        debug!("Uploading certificate for {}", submission.base().email);

        self.call(
            self.http
                .get(&self.url)
                .query(&[("mode", "upload"), ("payload", payload.as_str())]),
        )
        .await
        .inspect_err(|e| error!("Upload error: {e}"))?
        .into_success("Upload failed")?;
        Ok(())
    }

    async fn verify_certificate(&self, cert_id: &str) -> Result<Certificate, ServiceError> {
        let response = self
            .call(self.http.get(&self.url).query(&[("id", cert_id)]))
            .await
            .inspect_err(|e| error!("Verification error: {e}"))?
            .into_success("Invalid certificate")?;

        let data = response
            .data
            .ok_or_else(|| ServiceError::Rejected("Invalid certificate".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| ServiceError::Transport(format!("unreadable certificate: {e}")))
    }
}
