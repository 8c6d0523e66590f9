//! Repository trait definitions
//!
//! This module defines the core traits that all repositories must implement,
//! providing a consistent interface for data access operations.

use async_trait::async_trait;

use crate::errors::RepositoryResult;

/// Core repository trait providing CRUD operations
///
/// # Type Parameters
///
/// * `T` - The entity type (e.g., SneakerRecord)
/// * `ID` - The identifier type (usually Uuid)
///
/// # Examples
///
/// ```rust,ignore
/// use sneaker_vault::repositories::Repository;
/// use uuid::Uuid;
///
/// async fn example<R: Repository<SneakerRecord, Uuid>>(repo: R) -> Result<(), RepositoryError> {
///     let sneaker = repo.find_by_id(uuid).await?;
///     let updated = repo.update(uuid, patch).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Repository<T, ID: Send + 'static>: Send + Sync {
    /// Request type for creating new entities
    type CreateRequest;
    /// Request type for updating existing entities
    type UpdateRequest;
    /// Query type for filtering and searching
    type Query;

    /// Find an entity by its ID
    ///
    /// # Returns
    ///
    /// * `Ok(Some(T))` - Entity found
    /// * `Ok(None)` - Entity not found
    /// * `Err(RepositoryError)` - Database or other error
    async fn find_by_id(&self, id: ID) -> RepositoryResult<Option<T>>;

    /// Find multiple entities based on a query
    async fn find_all(&self, query: Self::Query) -> RepositoryResult<Vec<T>>;

    /// Create a new entity with generated ID and timestamps
    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<T>;

    /// Update an existing entity
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - Updated entity
    /// * `Err(RepositoryError)` - Entity not found, validation, or database error
    async fn update(&self, id: ID, request: Self::UpdateRequest) -> RepositoryResult<T>;

    /// Delete an entity by ID
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Entity deleted successfully
    /// * `Err(RepositoryError)` - Entity not found or database error
    async fn delete(&self, id: ID) -> RepositoryResult<()>;

    /// Count entities matching a query
    async fn count(&self, query: Self::Query) -> RepositoryResult<u64>;

    /// Check if an entity exists by ID
    async fn exists(&self, id: ID) -> RepositoryResult<bool> {
        match self.find_by_id(id).await? {
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}
