//! Durable photo storage and photo byte sources
//!
//! [`ObjectStorage`] is the bucket the catalogue writes photos to and
//! [`ImageSource`] is where photo bytes come from before they are stored
//! (device files or third-party URLs).

pub mod fetch;
pub mod local;

use async_trait::async_trait;
use image::ImageFormat;

use crate::errors::{ImageUploadError, StorageResult};

pub use fetch::HttpImageSource;
pub use local::LocalObjectStorage;

/// Key/value object storage addressed by slash separated paths
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path`, replacing any existing object
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Object paths directly under `prefix`
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Remove objects; paths that do not exist are ignored
    async fn remove(&self, paths: &[String]) -> StorageResult<()>;

    /// Publicly reachable URL of an object
    fn public_url(&self, path: &str) -> String;

    /// Reverse of [`ObjectStorage::public_url`] for URLs this storage issued
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Where photo bytes are read from before upload
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Read a device-local photo (`file://` URI or plain path)
    async fn read_local(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError>;

    /// Download a third-party image
    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageUploadError>;
}

/// Detected file extension and MIME type for stored photo bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoFormat {
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl PhotoFormat {
    pub const JPEG: PhotoFormat = PhotoFormat {
        extension: "jpg",
        content_type: "image/jpeg",
    };

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        let (extension, content_type) = match format {
            ImageFormat::Png => ("png", "image/png"),
            ImageFormat::Jpeg => ("jpg", "image/jpeg"),
            ImageFormat::Gif => ("gif", "image/gif"),
            ImageFormat::WebP => ("webp", "image/webp"),
            ImageFormat::Bmp => ("bmp", "image/bmp"),
            ImageFormat::Tiff => ("tiff", "image/tiff"),
            ImageFormat::Avif => ("avif", "image/avif"),
            _ => return None,
        };
        Some(Self {
            extension,
            content_type,
        })
    }

    fn from_extension(extension: &str) -> Option<Self> {
        ImageFormat::from_extension(extension).and_then(Self::from_image_format)
    }

    /// Sniff magic bytes first, then the URI's extension, then assume JPEG
    pub fn detect(bytes: &[u8], uri: &str) -> Self {
        image::guess_format(bytes)
            .ok()
            .and_then(Self::from_image_format)
            .or_else(|| uri_extension(uri).and_then(Self::from_extension))
            .unwrap_or(Self::JPEG)
    }
}

/// Extension of the last path segment, ignoring query and fragment
pub fn uri_extension(uri: &str) -> Option<&str> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let file_name = path.rsplit('/').next()?;
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}
