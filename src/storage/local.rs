use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::ObjectStorage;
use crate::config::StorageConfig;
use crate::errors::{StorageError, StorageResult};

/// Object storage backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, public_base_url: S) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root_path.clone(), config.public_base_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> StorageResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).await?;
        }
        Ok(())
    }

    /// Resolve an object path below the root, rejecting traversal
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path.trim_matches('/'));
        let is_safe = !path.trim_matches('/').is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_safe {
            return Err(StorageError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        debug!(
            "Writing {} bytes ({}) to {}",
            bytes.len(),
            content_type,
            full_path.display()
        );
        fs::write(&full_path, &bytes).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = self.resolve(prefix)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = prefix.trim_matches('/');
        let mut entries = fs::read_dir(&dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(format!("{}/{}", prefix, entry.file_name().to_string_lossy()));
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        for path in paths {
            let full_path = self.resolve(path)?;
            match fs::remove_file(&full_path).await {
                Ok(()) => debug!("Removed stored object {}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Stored object {} already gone", path);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|key| key.split(['?', '#']).next().unwrap_or(key).to_string())
            .filter(|key| !key.is_empty())
    }
}
