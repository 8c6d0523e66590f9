use serde::{Deserialize, Serialize};

/// A sneaker photo
///
/// `id` is empty until the image has been written to durable storage, after
/// which it holds the storage key assigned to it. Photos are owned by exactly
/// one sneaker and are never shared between records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Photo {
    /// A photo that has not been stored yet (picked from the device or
    /// referenced by an external URL)
    pub fn pending<S: Into<String>>(uri: S) -> Self {
        Self {
            id: String::new(),
            uri: uri.into(),
            alt: None,
        }
    }

    /// A photo already held by durable storage
    pub fn stored<K: Into<String>, U: Into<String>>(key: K, uri: U) -> Self {
        Self {
            id: key.into(),
            uri: uri.into(),
            alt: None,
        }
    }

    pub fn with_alt<S: Into<String>>(mut self, alt: S) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}
