use serde::{Deserialize, Serialize};

/// One recipient, built from a CSV row or a manual entry once both required
/// fields are known to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub email: String,
    pub name: String,
    pub rank: Option<String>,
}

impl CertificateRecord {
    /// The rank, if the row carries a non-blank one.
    pub fn rank(&self) -> Option<&str> {
        self.rank.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

/// A row typed in by hand on the upload page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: Option<String>,
}

/// A certificate as stored by the remote service and returned by a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub cert_id: String,
    pub status: String,
    pub name: String,
    pub certificate_title: String,
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
}

impl Certificate {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}
