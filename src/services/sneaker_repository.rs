//! Sneaker create/update/delete orchestration
//!
//! A create is a two-step saga: the row is inserted first so its id can be
//! used as the storage prefix, then the photos are stored and attached. If
//! the second step does not produce a usable image list the row is deleted
//! again and the original error is returned.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::image_pipeline::ImagePipeline;
use super::size_conversion::SizeConversionEngine;
use super::sneaker_validation::{FormValidation, SneakerSchema};
use crate::errors::{AppError, AppResult, RepositoryError};
use crate::models::{SizePair, SneakerDraft, SneakerPatch, SneakerRecord};
use crate::repositories::{Repository, SneakerQuery, SneakerRows};

/// Write operations the wizard performs on sneakers
#[async_trait]
pub trait SneakerCommands: Send + Sync {
    async fn create(
        &self,
        owner_id: Uuid,
        draft: &SneakerDraft,
        cancel: &CancellationToken,
    ) -> AppResult<SneakerRecord>;

    async fn update(
        &self,
        actor_id: Uuid,
        sneaker_id: Uuid,
        draft: &SneakerDraft,
        cancel: &CancellationToken,
    ) -> AppResult<SneakerRecord>;

    async fn delete(&self, actor_id: Uuid, sneaker_id: Uuid) -> AppResult<()>;
}

pub struct SneakerRepository<R> {
    rows: Arc<R>,
    pipeline: ImagePipeline,
    sizes: SizeConversionEngine,
    schema: SneakerSchema,
}

impl<R: SneakerRows> SneakerRepository<R> {
    pub fn new(rows: Arc<R>, pipeline: ImagePipeline) -> Self {
        Self {
            rows,
            pipeline,
            sizes: SizeConversionEngine::new(),
            schema: SneakerSchema::new(),
        }
    }

    pub async fn find_by_id(&self, sneaker_id: Uuid) -> AppResult<Option<SneakerRecord>> {
        Ok(self.rows.find_by_id(sneaker_id).await?)
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<SneakerRecord>> {
        Ok(self.rows.find_all(SneakerQuery::new().owner(owner_id)).await?)
    }

    fn validate(&self, draft: &SneakerDraft) -> AppResult<SizePair> {
        let mut form = FormValidation::new();
        if !form.on_submit(&self.schema, draft) {
            return Err(AppError::validation(
                form.surfaced_message().unwrap_or_default(),
            ));
        }
        let size = draft.parsed_size()?;
        Ok(self.sizes.generate_both_sizes(size, draft.gender))
    }

    async fn owned_record(&self, actor_id: Uuid, sneaker_id: Uuid, action: &str) -> AppResult<SneakerRecord> {
        let record = self.rows.find_by_id(sneaker_id).await?.ok_or_else(|| {
            RepositoryError::record_not_found("sneakers", "id", sneaker_id.to_string())
        })?;

        if record.owner_id != actor_id {
            warn!("User {} may not {} sneaker {}", actor_id, action, sneaker_id);
            return Err(AppError::authorization(format!("{} sneaker", action)));
        }
        Ok(record)
    }

    /// Undo the row insert of a failed create
    async fn compensate_create(&self, sneaker_id: Uuid) {
        match self.rows.delete(sneaker_id).await {
            Ok(()) => info!("Rolled back sneaker {} after failed image upload", sneaker_id),
            Err(e) => error!(
                "Failed to roll back sneaker {} after failed image upload: {}",
                sneaker_id, e
            ),
        }
    }
}

#[async_trait]
impl<R: SneakerRows + 'static> SneakerCommands for SneakerRepository<R> {
    async fn create(
        &self,
        owner_id: Uuid,
        draft: &SneakerDraft,
        cancel: &CancellationToken,
    ) -> AppResult<SneakerRecord> {
        let sizes = self.validate(draft)?;
        let new_sneaker = draft.to_new_sneaker(owner_id, sizes)?;

        if cancel.is_cancelled() {
            return Err(AppError::cancelled("create sneaker"));
        }

        let record = self.rows.create(new_sneaker).await?;
        info!("Created sneaker row {} for {}", record.id, owner_id);

        let processed = match self
            .pipeline
            .process_images(&draft.images, owner_id, record.id, cancel)
            .await
        {
            Ok(processed) => processed,
            Err(e) => {
                error!("No images stored for sneaker {}: {}", record.id, e);
                self.compensate_create(record.id).await;
                return Err(e.into());
            }
        };

        match self
            .rows
            .update(record.id, SneakerPatch::images(processed.photos))
            .await
        {
            Ok(record) => {
                info!(
                    "Created sneaker {} ({}) with {} image(s)",
                    record.id,
                    record.title(),
                    record.images.len()
                );
                Ok(record)
            }
            Err(e) => {
                error!("Failed to attach images to sneaker {}: {}", record.id, e);
                self.pipeline.remove_keys(&processed.uploaded).await;
                self.compensate_create(record.id).await;
                Err(e.into())
            }
        }
    }

    async fn update(
        &self,
        actor_id: Uuid,
        sneaker_id: Uuid,
        draft: &SneakerDraft,
        cancel: &CancellationToken,
    ) -> AppResult<SneakerRecord> {
        let existing = self.owned_record(actor_id, sneaker_id, "update").await?;
        let sizes = self.validate(draft)?;
        let mut patch = draft.to_patch(sizes, Vec::new())?;

        let processed = self
            .pipeline
            .process_images(&draft.images, existing.owner_id, sneaker_id, cancel)
            .await?;
        patch.images = Some(processed.photos);

        let updated = match self.rows.update(sneaker_id, patch).await {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to update sneaker {}: {}", sneaker_id, e);
                self.pipeline.remove_keys(&processed.uploaded).await;
                return Err(e.into());
            }
        };

        let prefix = format!("{}/", ImagePipeline::storage_prefix(existing.owner_id, sneaker_id));
        let kept: HashSet<&str> = updated.images.iter().map(|p| p.id.as_str()).collect();
        let orphaned: Vec<String> = existing
            .images
            .iter()
            .filter(|photo| photo.is_persisted() && photo.id.starts_with(&prefix))
            .filter(|photo| !kept.contains(photo.id.as_str()))
            .map(|photo| photo.id.clone())
            .collect();
        self.pipeline.remove_keys(&orphaned).await;

        info!(
            "Updated sneaker {} ({} image(s), {} removed)",
            sneaker_id,
            updated.images.len(),
            orphaned.len()
        );
        Ok(updated)
    }

    async fn delete(&self, actor_id: Uuid, sneaker_id: Uuid) -> AppResult<()> {
        let existing = self.owned_record(actor_id, sneaker_id, "delete").await?;
        self.rows.delete(sneaker_id).await?;
        self.pipeline
            .delete_images(existing.owner_id, sneaker_id, &existing.images)
            .await;
        info!("Deleted sneaker {}", sneaker_id);
        Ok(())
    }
}
