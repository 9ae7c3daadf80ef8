//! # Upload Store
//!
//! Persists uploaded document files and hands back the name and public URL
//! under which they are served.

use async_trait::async_trait;
use consulta::constants::UPLOADS_URL_PREFIX;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Where a freshly written upload ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    /// The generated on-disk file name.
    pub stored_name: String,
    /// The URL path the file is served from.
    pub url: String,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Writes `bytes` under a new, collision-resistant name derived from `original_name`.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> anyhow::Result<StoredUpload>;

    /// Removes a stored file. Removing a file that is already gone is not an error.
    async fn remove(&self, stored_name: &str) -> anyhow::Result<()>;

    /// The directory served under `/uploads`.
    fn root(&self) -> &Path;
}

/// Builds `<unix-millis>-<uuid-v4-simple><.ext>`, keeping the original extension.
pub fn generate_stored_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let id = Uuid::new_v4().simple();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{millis}-{id}{extension}")
}

/// Stores uploads as plain files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    root: PathBuf,
}

impl LocalUploadStore {
    /// Creates the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            anyhow::anyhow!("Failed to create uploads directory '{}': {e}", root.display())
        })?;
        Ok(Self { root })
    }

    fn path_of(&self, stored_name: &str) -> anyhow::Result<PathBuf> {
        if stored_name.is_empty() || stored_name.contains(['/', '\\']) || stored_name == ".." {
            anyhow::bail!("Refusing to touch unexpected upload name '{stored_name}'");
        }
        Ok(self.root.join(stored_name))
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> anyhow::Result<StoredUpload> {
        let stored_name = generate_stored_name(original_name);
        let path = self.path_of(&stored_name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write upload '{}': {e}", path.display()))?;
        info!(stored_name = %stored_name, size = bytes.len(), "Stored uploaded file.");

        Ok(StoredUpload {
            url: format!("{UPLOADS_URL_PREFIX}/{stored_name}"),
            stored_name,
        })
    }

    async fn remove(&self, stored_name: &str) -> anyhow::Result<()> {
        let path = self.path_of(stored_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(stored_name = %stored_name, "Removed uploaded file.");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(stored_name = %stored_name, "Upload was already missing on disk.");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to remove upload '{}': {e}",
                path.display()
            )),
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
