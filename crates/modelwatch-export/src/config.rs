use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::section::SectionKey;

/// Output artifact format.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Fixed page size document with a running vertical cursor.
    #[default]
    PaginatedDocument,
    /// Wide-layout deck, one section per slide.
    SlideDeck,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PaginatedDocument => "html",
            ExportFormat::SlideDeck => "slides.html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportFormat::PaginatedDocument => write!(f, "document"),
            ExportFormat::SlideDeck => write!(f, "slides"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "paginated" | "paginated_document" | "pdf" => {
                Ok(ExportFormat::PaginatedDocument)
            }
            "slides" | "slide_deck" | "deck" | "pptx" => Ok(ExportFormat::SlideDeck),
            _ => Err(format!(
                "Unknown export format: {}. Expected `document` or `slides`",
                s
            )),
        }
    }
}

pub const DEFAULT_IMAGE_WIDTH_FRACTION: f64 = 0.9;

/// Parameters for the export orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Wait applied once before the first capture so rendering can settle.
    pub settle_delay_ms: u64,
    /// Fraction of the content width used by captured images.
    pub image_width_fraction: f64,
    /// Sections included when the caller does not pick any.
    pub sections: Vec<SectionKey>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            settle_delay_ms: 500,
            image_width_fraction: DEFAULT_IMAGE_WIDTH_FRACTION,
            sections: SectionKey::ALL.to_vec(),
        }
    }
}

impl ExportConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Reject values the composers cannot lay out.
    pub fn validate(&self) -> Result<(), String> {
        let f = self.image_width_fraction;
        if !(f > 0.0 && f <= 1.0) {
            return Err(format!("image_width_fraction must be in (0, 1], got {}", f));
        }
        Ok(())
    }

    /// Load and validate an export configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ExportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ExportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|reason| ExportError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_str_aliases() {
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::PaginatedDocument);
        assert_eq!("Slides".parse::<ExportFormat>().unwrap(), ExportFormat::SlideDeck);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ExportConfig = serde_json::from_str(r#"{"settle_delay_ms": 0}"#).unwrap();
        assert_eq!(cfg.settle_delay_ms, 0);
        assert_eq!(cfg.image_width_fraction, 0.9);
        assert_eq!(cfg.sections.len(), SectionKey::ALL.len());
    }

    fn load(json: &str) -> Result<ExportConfig, ExportError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, json).unwrap();
        ExportConfig::from_json_file(&path)
    }

    #[test]
    fn width_fraction_above_one_is_rejected() {
        let err = load(r#"{"image_width_fraction": 1.5}"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig { .. }));
        assert!(err.to_string().contains("image_width_fraction"));
    }

    #[test]
    fn negative_width_fraction_is_rejected() {
        let err = load(r#"{"image_width_fraction": -0.5}"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig { .. }));
    }

    #[test]
    fn zero_width_fraction_is_rejected() {
        assert!(matches!(
            load(r#"{"image_width_fraction": 0.0}"#),
            Err(ExportError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn full_width_fraction_loads() {
        let cfg = load(r#"{"image_width_fraction": 1.0, "settle_delay_ms": 0}"#).unwrap();
        assert_eq!(cfg.image_width_fraction, 1.0);
    }
}
