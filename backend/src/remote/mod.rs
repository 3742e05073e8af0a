//! Access to the external certificate service.
//!
//! The service is a single script endpoint that owns all durable state: it
//! stores templates and certificates, renders the PDFs and QR codes and sends
//! the emails. This module only speaks its request/response format.
//!
//! Calls never retry. Expected failures come back as [`ServiceError`] so a batch
//! can record them and move on to the next row.

mod client;

pub use client::RemoteClient;

use common::model::certificate::Certificate;
use common::model::submission::CertificateSubmission;
use common::model::upload::TemplateIds;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with `status: "error"`.
    #[error("{0}")]
    Rejected(String),

    /// No usable answer: connection failure, timeout, HTTP error status or a
    /// body that is not the expected JSON.
    #[error("Network error: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Transport(_))
    }
}

/// The three operations the batch orchestrator and the verification page need.
pub trait CertificateService: Send + Sync {
    /// Stores the template image; `label` names the remote output folder.
    fn upload_template(
        &self,
        image: &[u8],
        label: &str,
    ) -> impl Future<Output = Result<TemplateIds, ServiceError>> + Send;

    fn upload_certificate(
        &self,
        submission: &CertificateSubmission,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn verify_certificate(
        &self,
        cert_id: &str,
    ) -> impl Future<Output = Result<Certificate, ServiceError>> + Send;
}
