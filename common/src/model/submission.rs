//! Wire payload for a single certificate upload.
//!
//! Rows that carry a rank are sent with the rank text and its formatting; rows
//! without one leave those keys out entirely. The variant is picked once per row
//! in [`CertificateSubmission::new`].

use crate::model::certificate::CertificateRecord;
use crate::model::upload::{TemplateIds, UploadConfig};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseSubmission {
    pub email: String,
    pub name: String,
    pub issue_date: String,
    pub certificate_title: String,
    pub template_drive_id: String,
    pub output_folder_id: String,
    pub name_font: String,
    pub name_size: f64,
    pub name_color: String,
    pub name_x_pos: f64,
    pub name_y_pos: f64,
    pub qr_x_pos: f64,
    pub qr_y_pos: f64,
    pub email_subject: String,
    pub email_body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankFields {
    pub rank: String,
    pub rank_font: String,
    pub rank_size: f64,
    pub rank_color: String,
    pub rank_x_pos: f64,
    pub rank_y_pos: f64,
}

/// Serialized flat: `WithRank` is the base object plus the `rank*` keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CertificateSubmission {
    Base(BaseSubmission),
    WithRank {
        #[serde(flatten)]
        base: BaseSubmission,
        #[serde(flatten)]
        rank: RankFields,
    },
}

impl CertificateSubmission {
    pub fn new(record: &CertificateRecord, config: &UploadConfig, ids: &TemplateIds) -> Self {
        let base = BaseSubmission {
            email: record.email.clone(),
            name: record.name.clone(),
            issue_date: config.issue_date.clone(),
            certificate_title: config.certificate_title.clone(),
            template_drive_id: ids.template_drive_id.clone(),
            output_folder_id: ids.output_folder_id.clone(),
            name_font: config.name.font.clone(),
            name_size: config.name.size,
            name_color: config.name.color.clone(),
            name_x_pos: config.name.x_pos,
            name_y_pos: config.name.y_pos,
            qr_x_pos: config.qr.x_pos,
            qr_y_pos: config.qr.y_pos,
            email_subject: config.email.subject.clone(),
            email_body: config.email.body.clone(),
        };

        match record.rank() {
            Some(rank) => CertificateSubmission::WithRank {
                base,
                rank: RankFields {
                    rank: rank.to_string(),
                    rank_font: config.rank.font.clone(),
                    rank_size: config.rank.size,
                    rank_color: config.rank.color.clone(),
                    rank_x_pos: config.rank.x_pos,
                    rank_y_pos: config.rank.y_pos,
                },
            },
            None => CertificateSubmission::Base(base),
        }
    }

    pub fn base(&self) -> &BaseSubmission {
        match self {
            CertificateSubmission::Base(base) => base,
            CertificateSubmission::WithRank { base, .. } => base,
        }
    }

    pub fn has_rank(&self) -> bool {
        matches!(self, CertificateSubmission::WithRank { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> TemplateIds {
        TemplateIds {
            template_drive_id: "tpl-1".into(),
            output_folder_id: "out-1".into(),
        }
    }

    fn record(rank: Option<&str>) -> CertificateRecord {
        CertificateRecord {
            email: "a@x.com".into(),
            name: "Alice".into(),
            rank: rank.map(str::to_string),
        }
    }

    #[test]
    fn row_without_rank_omits_rank_keys() {
        let config = UploadConfig::new("Rust 101", "2025-03-12");
        let submission = CertificateSubmission::new(&record(None), &config, &ids());
        assert!(!submission.has_rank());

        let value = serde_json::to_value(&submission).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["template_drive_id"], "tpl-1");
        assert_eq!(object["certificate_title"], "Rust 101");
        assert!(object.keys().all(|k| !k.starts_with("rank")));
    }

    #[test]
    fn ranked_row_is_flattened() {
        let config = UploadConfig::new("Rust 101", "2025-03-12");
        let submission = CertificateSubmission::new(&record(Some("Gold")), &config, &ids());
        assert!(submission.has_rank());

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["rank"], "Gold");
        assert_eq!(value["rank_font"], "Arial");
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["output_folder_id"], "out-1");
    }
}
