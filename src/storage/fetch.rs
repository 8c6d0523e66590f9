use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use super::ImageSource;
use crate::config::ImageConfig;
use crate::config::defaults::DEFAULT_USER_AGENT;
use crate::errors::ImageUploadError;

/// Reads device files from disk and downloads remote images over HTTP
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageSource {
    pub fn new(max_bytes: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, max_bytes })
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.max_download_bytes, config.download_timeout)
    }

    fn local_path(uri: &str) -> Result<PathBuf, ImageUploadError> {
        if let Some(rest) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if uri.contains("://") {
            return Err(ImageUploadError::UnsupportedUri {
                uri: uri.to_string(),
            });
        }
        Ok(PathBuf::from(uri))
    }

    fn download_error(url: &str, message: impl Into<String>) -> ImageUploadError {
        ImageUploadError::Download {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn read_local(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError> {
        let path = Self::local_path(uri)?;
        fs::read(&path).await.map_err(|source| ImageUploadError::Read {
            uri: uri.to_string(),
            source,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageUploadError> {
        debug!("Downloading image {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::download_error(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::download_error(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(Self::download_error(
                    url,
                    format!("Image too large ({} bytes, max {})", length, self.max_bytes),
                ));
            }
        }

        // Content-Length may be absent or wrong; enforce the cap while streaming
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::download_error(url, e.to_string()))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(Self::download_error(
                    url,
                    format!("Image too large (max {} bytes)", self.max_bytes),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}
