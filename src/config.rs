// ⚙️ Configuration - display, export, sync and document settings from TOML
//
// Every section and key is optional. A missing file section falls back to
// the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dates::{DateFallback, DisplayFormat};
use crate::export::pdf::DEFAULT_ROWS_PER_PAGE;
use crate::export::{ExportProjector, PdfWriter};
use crate::documents::LocalDocumentStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// `us` (MM/DD/YYYY), `iso` or `long`
    #[serde(default)]
    pub date_format: DisplayFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_rows_per_page")]
    pub pdf_rows_per_page: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// `reject` drops fetched rows with unreadable dates, `today` keeps them
    #[serde(default)]
    pub date_fallback: DateFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_documents_root")]
    pub root: PathBuf,
}

impl ReportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        Ok(config)
    }

    /// `from_file` when a path is given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn projector(&self) -> ExportProjector<'static> {
        ExportProjector::new().with_display(self.display.date_format)
    }

    pub fn pdf_writer(&self) -> PdfWriter {
        PdfWriter::new().with_rows_per_page(self.export.pdf_rows_per_page)
    }

    pub fn document_store(&self) -> LocalDocumentStore {
        LocalDocumentStore::new(&self.documents.root)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pdf_rows_per_page: default_rows_per_page(),
        }
    }
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: default_documents_root(),
        }
    }
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

fn default_documents_root() -> PathBuf {
    PathBuf::from("documents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReportConfig::from_toml("").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.display.date_format, DisplayFormat::Us);
        assert_eq!(config.export.pdf_rows_per_page, 30);
        assert_eq!(config.sync.date_fallback, DateFallback::Reject);
        assert_eq!(config.documents.root, PathBuf::from("documents"));
    }

    #[test]
    fn test_partial_sections() {
        let config = ReportConfig::from_toml(
            r#"
            [display]
            date_format = "long"

            [sync]
            date_fallback = "today"
            "#,
        )
        .unwrap();

        assert_eq!(config.display.date_format, DisplayFormat::Long);
        assert_eq!(config.sync.date_fallback, DateFallback::Today);
        assert_eq!(config.export.pdf_rows_per_page, 30);
    }

    #[test]
    fn test_unknown_choice_is_an_error() {
        assert!(ReportConfig::from_toml("[display]\ndate_format = \"julian\"").is_err());
    }

    #[test]
    fn test_writer_settings_flow_through() {
        let config = ReportConfig::from_toml("[export]\npdf_rows_per_page = 12").unwrap();
        assert_eq!(config.pdf_writer().rows_per_page(), 12);

        let config = ReportConfig::from_toml("[documents]\nroot = \"/srv/report-docs\"").unwrap();
        assert_eq!(config.document_store().root(), Path::new("/srv/report-docs"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ReportConfig::from_file("/nonexistent/reports.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/reports.toml"));
    }
}
