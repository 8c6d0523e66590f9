//! Host-provided services the wizard talks to

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::SneakerRecord;

/// The signed-in user and their collection
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;

    fn is_anonymous(&self) -> bool {
        self.current_user().is_none()
    }

    /// The user's sneakers in display order; used to browse between records
    fn sneakers(&self) -> Vec<SneakerRecord>;

    /// Called after a create, update or delete so the host can refresh its list
    fn sneakers_changed(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Toast sink
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Message-key to display-text lookup
pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str, fallback: &str) -> String;
}

/// Localizer backed by a fixed table; unknown keys use the fallback text
#[derive(Debug, Clone, Default)]
pub struct StaticLocalizer {
    messages: HashMap<String, String>,
}

impl StaticLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, text: V) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }
}

impl Localizer for StaticLocalizer {
    fn localize(&self, key: &str, fallback: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Message keys and their default text
pub mod messages {
    pub const NOT_AUTHORIZED: (&str, &str) = (
        "wizard.error.not_authorized",
        "You don't have permission to do that",
    );
    pub const IMAGES_REQUIRED: (&str, &str) =
        ("wizard.error.images_required", "At least one image is required");
    pub const SKU_REQUIRED: (&str, &str) = ("wizard.error.sku_required", "SKU is required");
    pub const BARCODE_REQUIRED: (&str, &str) =
        ("wizard.error.barcode_required", "Barcode is required");
    pub const SAVE_FAILED: (&str, &str) = ("wizard.error.save_failed", "Could not save sneaker");
    pub const DELETE_FAILED: (&str, &str) =
        ("wizard.error.delete_failed", "Could not delete sneaker");
    pub const CREATED: (&str, &str) = ("wizard.success.created", "Sneaker added to your collection");
    pub const UPDATED: (&str, &str) = ("wizard.success.updated", "Sneaker updated");
    pub const DELETED: (&str, &str) = ("wizard.success.deleted", "Sneaker deleted");
}
