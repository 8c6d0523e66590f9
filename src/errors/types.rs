//! Error type definitions for the sneaker catalogue
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur while acquiring,
/// editing or deleting a sneaker. It uses `thiserror` to provide automatic
/// error trait implementations and proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Form-level validation failure (field errors live in the form state)
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Catalogue lookup errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// A photo could not be processed
    #[error("Image upload error: {0}")]
    ImageUpload(#[from] ImageUploadError),

    /// Row persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    /// Write attempted without permission
    #[error("Permission denied: {action}")]
    Authorization { action: String },

    /// Object storage errors outside of an upload
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The wizard session that started the operation was closed
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data serialization/deserialization failures
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// DateTime parsing errors
    #[error("DateTime parsing error: {0}")]
    DateTimeParse(#[from] crate::utils::datetime::DateTimeError),

    /// A stored column could not be decoded into the model
    #[error("Invalid column value: {column} = {value}")]
    InvalidColumn { column: String, value: String },

    /// Record not found
    #[error("Record not found: {table} with {field} = {value}")]
    RecordNotFound {
        table: String,
        field: String,
        value: String,
    },

    /// Migration failures
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed { version: String, message: String },
}

/// Catalogue lookup errors (SKU search and barcode scan)
#[derive(Error, Debug)]
pub enum LookupError {
    /// The catalogue returned zero results
    #[error("No sneaker found for '{query}'")]
    NotFound { query: String },

    /// The lookup function reported an error in its response envelope
    #[error("Lookup function {function} failed: {message}")]
    Backend { function: String, message: String },

    /// HTTP errors returned by the transport
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Connection-level transport failures
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response payload did not have the expected shape
    #[error("Malformed lookup response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while processing a single photo
#[derive(Error, Debug)]
pub enum ImageUploadError {
    /// Create/update attempted with an empty image list
    #[error("At least one image is required")]
    NoImages,

    /// Local device file could not be read
    #[error("Failed to read local image {uri}: {source}")]
    Read {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    /// External image could not be downloaded for migration
    #[error("Failed to download image {url}: {message}")]
    Download { url: String, message: String },

    /// Durable storage rejected the bytes
    #[error("Failed to upload image {uri}: {source}")]
    Upload {
        uri: String,
        #[source]
        source: StorageError,
    },

    /// URI has neither a local nor a remote form we understand
    #[error("Unsupported image reference: {uri}")]
    UnsupportedUri { uri: String },

    /// Processing stopped because the owning session was closed
    #[error("Image processing cancelled")]
    Cancelled,
}

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote storage rejected the request
    #[error("Storage request failed: {message}")]
    Request { message: String },

    /// Object path escapes the storage root or is empty
    #[error("Invalid storage path: {path}")]
    InvalidPath { path: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an authorization error for the given action
    pub fn authorization<S: Into<String>>(action: S) -> Self {
        Self::Authorization {
            action: action.into(),
        }
    }

    /// Create a cancellation error for the given operation
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl RepositoryError {
    /// Create a record not found error
    pub fn record_not_found<T: Into<String>, F: Into<String>, V: Into<String>>(
        table: T,
        field: F,
        value: V,
    ) -> Self {
        Self::RecordNotFound {
            table: table.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid column error
    pub fn invalid_column<C: Into<String>, V: Into<String>>(column: C, value: V) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            value: value.into(),
        }
    }
}
