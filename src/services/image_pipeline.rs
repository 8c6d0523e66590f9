//! Photo upload pipeline
//!
//! Every photo of a sneaker is classified by its URI and then uploaded,
//! migrated or passed through. Photos are processed one at a time so the
//! stored order matches the order the user arranged them in.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::ImageUploadError;
use crate::models::Photo;
use crate::storage::{ImageSource, ObjectStorage, PhotoFormat};

const LOCAL_SCHEMES: [&str; 4] = ["file://", "content://", "ph://", "assets-library://"];

/// Where a photo's bytes currently live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOrigin {
    /// On the user's device; needs uploading
    Local,
    /// On a third-party host; needs migrating into our storage
    External,
    /// Already stored under this sneaker's prefix as `key`
    Backend { key: String },
    Unsupported,
}

/// Outcome of a successful [`ImagePipeline::process_images`] run
#[derive(Debug, Default)]
pub struct ProcessedImages {
    /// Final photo list, in input order, skipping photos that failed
    pub photos: Vec<Photo>,
    /// Keys written by this run (not pass-through photos)
    pub uploaded: Vec<String>,
    /// Per-photo failures that were skipped
    pub failures: Vec<ImageUploadError>,
}

#[derive(Clone)]
pub struct ImagePipeline {
    storage: Arc<dyn ObjectStorage>,
    source: Arc<dyn ImageSource>,
}

impl ImagePipeline {
    pub fn new(storage: Arc<dyn ObjectStorage>, source: Arc<dyn ImageSource>) -> Self {
        Self { storage, source }
    }

    /// `{owner}/{sneaker}`
    pub fn storage_prefix(owner_id: Uuid, sneaker_id: Uuid) -> String {
        format!("{}/{}", owner_id, sneaker_id)
    }

    /// Classify a photo for the sneaker stored under `prefix`
    ///
    /// Stored photos under any other prefix are treated as external so they
    /// get copied; the owning sneaker may delete the original at any time.
    pub fn classify(&self, photo: &Photo, prefix: &str) -> PhotoOrigin {
        let uri = photo.uri.trim();

        if let Some(key) = self.storage.key_for_url(uri) {
            let key = if photo.id.is_empty() {
                key
            } else {
                photo.id.clone()
            };
            if key.starts_with(&format!("{}/", prefix)) {
                return PhotoOrigin::Backend { key };
            }
            debug!("Photo {} belongs to another prefix; migrating", uri);
            return PhotoOrigin::External;
        }

        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PhotoOrigin::External
        } else if LOCAL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
            || (!uri.is_empty() && !uri.contains("://"))
        {
            PhotoOrigin::Local
        } else {
            PhotoOrigin::Unsupported
        }
    }

    /// Store every photo and return the final list
    ///
    /// Individual failures are logged and skipped. If nothing could be
    /// stored the first failure is returned instead. The token is checked
    /// before each photo; on cancellation the objects written so far are
    /// removed and [`ImageUploadError::Cancelled`] is returned.
    pub async fn process_images(
        &self,
        photos: &[Photo],
        owner_id: Uuid,
        sneaker_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<ProcessedImages, ImageUploadError> {
        if photos.is_empty() {
            return Err(ImageUploadError::NoImages);
        }

        let prefix = Self::storage_prefix(owner_id, sneaker_id);
        let mut processed = ProcessedImages::default();

        for (index, photo) in photos.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    "Image processing for sneaker {} cancelled after {} of {} photo(s)",
                    sneaker_id,
                    index,
                    photos.len()
                );
                self.remove_keys(&processed.uploaded).await;
                return Err(ImageUploadError::Cancelled);
            }

            match self.process_one(photo, &prefix).await {
                Ok((stored, freshly_written)) => {
                    if freshly_written {
                        processed.uploaded.push(stored.id.clone());
                    }
                    processed.photos.push(stored);
                }
                Err(e) => {
                    error!("Failed to process photo {} ({}): {}", index, photo.uri, e);
                    processed.failures.push(e);
                }
            }
        }

        if processed.photos.is_empty() {
            return Err(processed
                .failures
                .into_iter()
                .next()
                .unwrap_or(ImageUploadError::NoImages));
        }

        info!(
            "Processed {} photo(s) for sneaker {} ({} uploaded, {} failed)",
            processed.photos.len(),
            sneaker_id,
            processed.uploaded.len(),
            processed.failures.len()
        );
        Ok(processed)
    }

    async fn process_one(
        &self,
        photo: &Photo,
        prefix: &str,
    ) -> Result<(Photo, bool), ImageUploadError> {
        match self.classify(photo, prefix) {
            PhotoOrigin::Backend { key } => {
                debug!("Photo {} already stored as {}", photo.uri, key);
                Ok((
                    Photo {
                        id: key,
                        ..photo.clone()
                    },
                    false,
                ))
            }
            PhotoOrigin::Local => {
                let bytes = self.source.read_local(&photo.uri).await?;
                let format = PhotoFormat::detect(&bytes, &photo.uri);
                let key = format!("{}/{}.{}", prefix, Uuid::new_v4(), format.extension);
                self.store(photo, key, bytes, format).await
            }
            PhotoOrigin::External => {
                let bytes = self.source.download(&photo.uri).await?;
                let format = PhotoFormat::detect(&bytes, &photo.uri);
                let stem = format!("{:x}", md5::compute(photo.uri.as_bytes()));
                let key = format!("{}/{}.{}", prefix, stem, format.extension);
                self.store(photo, key, bytes, format).await
            }
            PhotoOrigin::Unsupported => Err(ImageUploadError::UnsupportedUri {
                uri: photo.uri.clone(),
            }),
        }
    }

    async fn store(
        &self,
        photo: &Photo,
        key: String,
        bytes: Vec<u8>,
        format: PhotoFormat,
    ) -> Result<(Photo, bool), ImageUploadError> {
        self.storage
            .upload(&key, bytes, format.content_type)
            .await
            .map_err(|source| ImageUploadError::Upload {
                uri: photo.uri.clone(),
                source,
            })?;

        let uri = self.storage.public_url(&key);
        debug!("Stored photo {} as {}", photo.uri, key);
        Ok((
            Photo {
                id: key,
                uri,
                alt: photo.alt.clone(),
            },
            true,
        ))
    }

    /// Best-effort removal of specific objects
    pub async fn remove_keys(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.storage.remove(keys).await {
            warn!("Failed to remove {} stored photo(s): {}", keys.len(), e);
        }
    }

    /// Best-effort removal of a sneaker's photos and anything left under its prefix
    pub async fn delete_images(&self, owner_id: Uuid, sneaker_id: Uuid, photos: &[Photo]) {
        let prefix = Self::storage_prefix(owner_id, sneaker_id);
        let mut keys: BTreeSet<String> = photos
            .iter()
            .filter(|photo| photo.is_persisted() && photo.id.starts_with(&prefix))
            .map(|photo| photo.id.clone())
            .collect();

        match self.storage.list(&prefix).await {
            Ok(listed) => keys.extend(listed),
            Err(e) => warn!("Failed to list stored photos under {}: {}", prefix, e),
        }

        let keys: Vec<String> = keys.into_iter().collect();
        debug!("Deleting {} stored photo(s) under {}", keys.len(), prefix);
        self.remove_keys(&keys).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalObjectStorage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const BASE_URL: &str = "http://localhost:8080/storage/sneakers";
    const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[derive(Default)]
    struct MapSource {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapSource {
        fn with(mut self, uri: &str, bytes: &[u8]) -> Self {
            self.files.insert(uri.to_string(), bytes.to_vec());
            self
        }

        fn lookup(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError> {
            self.files
                .get(uri)
                .cloned()
                .ok_or_else(|| ImageUploadError::Download {
                    url: uri.to_string(),
                    message: "HTTP 404 Not Found".to_string(),
                })
        }
    }

    #[async_trait]
    impl ImageSource for MapSource {
        async fn read_local(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError> {
            self.lookup(uri)
        }

        async fn download(&self, url: &str) -> Result<Vec<u8>, ImageUploadError> {
            self.lookup(url)
        }
    }

    fn pipeline(dir: &TempDir, source: MapSource) -> (ImagePipeline, Arc<LocalObjectStorage>) {
        let storage = Arc::new(LocalObjectStorage::new(dir.path(), BASE_URL));
        (ImagePipeline::new(storage.clone(), Arc::new(source)), storage)
    }

    #[test]
    fn test_classify() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir, MapSource::default());
        let classify = |uri: String| pipeline.classify(&Photo::pending(uri), "o/s");

        assert_eq!(classify("file:///dcim/1.jpg".into()), PhotoOrigin::Local);
        assert_eq!(classify("ph://ABCD".into()), PhotoOrigin::Local);
        assert_eq!(classify("/tmp/shoe.png".into()), PhotoOrigin::Local);
        assert_eq!(
            classify("https://images.example.com/a.jpg".into()),
            PhotoOrigin::External
        );
        assert_eq!(
            classify(format!("{}/o/s/a.jpg", BASE_URL)),
            PhotoOrigin::Backend {
                key: "o/s/a.jpg".to_string()
            }
        );
        assert_eq!(classify(format!("{}/o/other/a.jpg", BASE_URL)), PhotoOrigin::External);
        assert_eq!(classify(format!("{}/o/s2/a.jpg", BASE_URL)), PhotoOrigin::External);
        assert_eq!(
            classify("data:image/png;base64,AAAA".into()),
            PhotoOrigin::Unsupported
        );
    }

    #[tokio::test]
    async fn test_process_preserves_order_and_skips_failures() {
        let dir = TempDir::new().unwrap();
        let source = MapSource::default()
            .with("file:///dcim/1.jpg", &JPEG)
            .with("https://images.example.com/patta.jpg", &JPEG);
        let (pipeline, storage) = pipeline(&dir, source);
        let (owner, sneaker) = (Uuid::new_v4(), Uuid::new_v4());
        let backend_url = format!("{}/{}/{}/kept.jpg", BASE_URL, owner, sneaker);

        let photos = vec![
            Photo::pending("file:///dcim/1.jpg").with_alt("left"),
            Photo::pending("file:///dcim/missing.jpg"),
            Photo::pending("https://images.example.com/patta.jpg"),
            Photo::pending(backend_url.clone()),
        ];

        let processed = pipeline
            .process_images(&photos, owner, sneaker, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(processed.photos.len(), 3);
        assert_eq!(processed.failures.len(), 1);
        assert_eq!(processed.uploaded.len(), 2);
        assert_eq!(processed.photos[0].alt.as_deref(), Some("left"));
        assert!(processed.photos[0].id.ends_with(".jpg"));
        let md5_stem = format!("{:x}", md5::compute(b"https://images.example.com/patta.jpg"));
        assert!(processed.photos[1].id.contains(&md5_stem));
        assert_eq!(processed.photos[2].uri, backend_url);

        let listed = storage
            .list(&ImagePipeline::storage_prefix(owner, sneaker))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_photo_from_another_sneaker_is_copied() {
        let dir = TempDir::new().unwrap();
        let (owner, other, sneaker) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let foreign_key = format!("{}/{}/shared.jpg", owner, other);
        let foreign_url = format!("{}/{}", BASE_URL, foreign_key);
        let (pipeline, storage) = pipeline(&dir, MapSource::default().with(&foreign_url, &JPEG));

        let processed = pipeline
            .process_images(
                &[Photo::stored(foreign_key.clone(), foreign_url.clone())],
                owner,
                sneaker,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let prefix = ImagePipeline::storage_prefix(owner, sneaker);
        assert_eq!(processed.uploaded.len(), 1);
        assert!(processed.photos[0].id.starts_with(&format!("{}/", prefix)));
        assert_ne!(processed.photos[0].uri, foreign_url);
        assert_eq!(storage.list(&prefix).await.unwrap(), processed.uploaded);
    }

    #[tokio::test]
    async fn test_nothing_stored_returns_first_error() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir, MapSource::default());

        let result = pipeline
            .process_images(
                &[
                    Photo::pending("https://images.example.com/gone.jpg"),
                    Photo::pending("data:image/png;base64,AAAA"),
                ],
                Uuid::new_v4(),
                Uuid::new_v4(),
                &CancellationToken::new(),
            )
            .await;

        match result {
            Err(ImageUploadError::Download { url, .. }) => {
                assert_eq!(url, "https://images.example.com/gone.jpg")
            }
            other => panic!("unexpected result: {:?}", other.map(|p| p.photos)),
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir, MapSource::default());
        let result = pipeline
            .process_images(&[], Uuid::new_v4(), Uuid::new_v4(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ImageUploadError::NoImages)));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_processing() {
        let dir = TempDir::new().unwrap();
        let source = MapSource::default().with("file:///dcim/1.jpg", &JPEG);
        let (pipeline, storage) = pipeline(&dir, source);
        let token = CancellationToken::new();
        token.cancel();
        let (owner, sneaker) = (Uuid::new_v4(), Uuid::new_v4());

        let result = pipeline
            .process_images(&[Photo::pending("file:///dcim/1.jpg")], owner, sneaker, &token)
            .await;

        assert!(matches!(result, Err(ImageUploadError::Cancelled)));
        assert!(storage
            .list(&ImagePipeline::storage_prefix(owner, sneaker))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_images_clears_prefix() {
        let dir = TempDir::new().unwrap();
        let source = MapSource::default()
            .with("file:///dcim/1.jpg", &JPEG)
            .with("file:///dcim/2.jpg", &JPEG);
        let (pipeline, storage) = pipeline(&dir, source);
        let (owner, sneaker) = (Uuid::new_v4(), Uuid::new_v4());

        let processed = pipeline
            .process_images(
                &[Photo::pending("file:///dcim/1.jpg"), Photo::pending("file:///dcim/2.jpg")],
                owner,
                sneaker,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        pipeline
            .delete_images(owner, sneaker, &processed.photos[..1])
            .await;

        assert!(storage
            .list(&ImagePipeline::storage_prefix(owner, sneaker))
            .await
            .unwrap()
            .is_empty());
    }
}
