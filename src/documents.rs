// 📎 Document Store - attachment bytes in, stable path reference out
//
// Records only ever hold the returned path string. Layout on disk:
//   <root>/<employee_id>/<report_type>/<sha256 prefix>-<sanitized name>

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::taxonomy::ReportType;

const HASH_PREFIX_LEN: usize = 12;
const MAX_NAME_LEN: usize = 96;

/// Who the document belongs to and which report type it supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub employee_id: String,
    pub report_type: ReportType,
}

impl DocumentKey {
    pub fn new(employee_id: impl Into<String>, report_type: ReportType) -> Self {
        DocumentKey {
            employee_id: employee_id.into(),
            report_type,
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// Persist the bytes and return the path reference to put on the record
    fn store(&self, key: &DocumentKey, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Filesystem-backed store. Identical content under the same name maps to the same path.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalDocumentStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a reference returned by `store` back to an absolute path
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

impl DocumentStore for LocalDocumentStore {
    fn store(&self, key: &DocumentKey, file_name: &str, bytes: &[u8]) -> Result<String> {
        let owner = sanitize(&key.employee_id);
        if owner.is_empty() {
            return Err(anyhow!("document owner id is empty"));
        }

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = format!("{:x}", hasher.finalize());

        let name = match sanitize(file_name) {
            n if n.is_empty() => "document".to_string(),
            n => n,
        };
        let stored_name = format!("{}-{}", &digest[..HASH_PREFIX_LEN], name);

        let relative = format!("{}/{}/{}", owner, key.report_type.as_str(), stored_name);
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create document directory {}", parent.display()))?;
        }
        fs::write(&target, bytes).with_context(|| format!("Failed to write document {}", target.display()))?;

        tracing::info!(path = %relative, size = bytes.len(), "Stored document");
        Ok(relative)
    }
}

/// Keep the final path component, restricted to `[A-Za-z0-9._-]`
fn sanitize(name: &str) -> String {
    let name = name.trim();
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    trimmed.chars().take(MAX_NAME_LEN).collect()
}
