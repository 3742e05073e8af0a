//! Batch-wide settings entered once on the upload page.
//!
//! Positions are in centimeters from the top-left corner of the template and
//! sizes in points; the remote service does the actual rendering. Every
//! formatting group has a default so the page may leave any of them out.

use serde::{Deserialize, Serialize};

/// Font and position of a text field drawn on the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPlacement {
    pub font: String,
    pub size: f64,
    pub color: String,
    pub x_pos: f64,
    pub y_pos: f64,
}

impl TextPlacement {
    fn with(size: f64, color: &str, y_pos: f64) -> Self {
        Self {
            font: "Arial".to_string(),
            size,
            color: color.to_string(),
            x_pos: 14.85,
            y_pos,
        }
    }

    pub fn default_rank() -> Self {
        Self::with(20.0, "#333333", 12.5)
    }
}

impl Default for TextPlacement {
    fn default() -> Self {
        Self::with(36.0, "#000000", 10.5)
    }
}

/// Where the verification QR code goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrPlacement {
    pub x_pos: f64,
    pub y_pos: f64,
}

impl Default for QrPlacement {
    fn default() -> Self {
        Self {
            x_pos: 25.0,
            y_pos: 16.0,
        }
    }
}

/// Email sent by the remote service with each certificate.
///
/// `{name}`, `{title}` and `{verify_url}` are substituted remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for EmailTemplate {
    fn default() -> Self {
        Self {
            subject: "Your certificate for {title}".to_string(),
            body: "Dear {name},\n\nYour certificate for {title} is attached.\n\
                   You can verify it at any time at {verify_url}."
                .to_string(),
        }
    }
}

fn default_rank_placement() -> TextPlacement {
    TextPlacement::default_rank()
}

/// Shared parameters of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    pub certificate_title: String,
    /// `YYYY-MM-DD`.
    pub issue_date: String,
    #[serde(default)]
    pub name: TextPlacement,
    #[serde(default = "default_rank_placement")]
    pub rank: TextPlacement,
    #[serde(default)]
    pub qr: QrPlacement,
    #[serde(default)]
    pub email: EmailTemplate,
}

impl UploadConfig {
    pub fn new(certificate_title: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            certificate_title: certificate_title.into(),
            issue_date: issue_date.into(),
            name: TextPlacement::default(),
            rank: TextPlacement::default_rank(),
            qr: QrPlacement::default(),
            email: EmailTemplate::default(),
        }
    }
}

/// Identifiers handed back by the remote service after the template upload.
/// Every certificate of the batch must reference both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateIds {
    pub template_drive_id: String,
    pub output_folder_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_formatting_defaults() {
        let json = r#"{"certificate_title":"Rust 101","issue_date":"2025-03-12"}"#;
        let config: UploadConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, UploadConfig::new("Rust 101", "2025-03-12"));
        assert_eq!(config.rank, TextPlacement::default_rank());
    }

    #[test]
    fn partial_group_keeps_other_defaults() {
        let json = r##"{
            "certificate_title": "Rust 101",
            "issue_date": "2025-03-12",
            "name": { "color": "#ff0000", "size": 48 }
        }"##;
        let config: UploadConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name.color, "#ff0000");
        assert_eq!(config.name.size, 48.0);
        assert_eq!(config.name.font, "Arial");
    }
}
