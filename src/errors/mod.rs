//! Centralized error handling for the sneaker catalogue
//!
//! This module provides an error handling system that unifies error types
//! across the wizard, the services and the persistence layer.
//!
//! # Error Categories
//!
//! - **Validation Errors**: form input that fails the sneaker schema
//! - **Lookup Errors**: SKU/barcode catalogue searches
//! - **Image Upload Errors**: a photo that could not be stored
//! - **Repository Errors**: SQLite row persistence
//! - **Authorization Errors**: writes attempted without permission
//!
//! # Usage
//!
//! ```rust
//! use sneaker_vault::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("Model is required"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Lookup Results
pub type LookupResult<T> = Result<T, LookupError>;

/// Convenience type alias for Storage Results
pub type StorageResult<T> = Result<T, StorageError>;
