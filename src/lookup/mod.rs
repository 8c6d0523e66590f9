//! Catalogue lookup for SKU search and barcode scans
//!
//! The lookup backend is reached through named remote functions. A
//! [`LookupTransport`] invokes a function with a JSON payload and returns the
//! `{ data, error }` envelope; [`ExternalLookupClient`] turns the envelope into
//! a [`crate::models::FetchedSneakerDraft`].

pub mod client;
pub mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::LookupResult;

pub use client::{ExternalLookupClient, LookupKind, LookupOutcome};
pub use transport::HttpLookupTransport;

/// Envelope returned by a function invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LookupResponse {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait LookupTransport: Send + Sync {
    async fn invoke(&self, function_name: &str, payload: Value) -> LookupResult<LookupResponse>;
}

/// One catalogue hit as returned by the lookup functions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, alias = "styleId")]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "retailPrice")]
    pub estimated_market_value: Option<f64>,
    #[serde(
        default,
        alias = "images",
        alias = "image",
        deserialize_with = "one_or_many"
    )]
    pub gallery: Vec<String>,
}

/// Accept `"url"`, `["url", ...]` or null
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_item_accepts_field_aliases() {
        let item: LookupItem = serde_json::from_value(json!({
            "name": "Nike Air Max 1 Patta",
            "brand": "Nike",
            "styleId": "DQ0299-100",
            "retailPrice": 160.0,
            "image": "https://images.example.com/patta.jpg"
        }))
        .unwrap();

        assert_eq!(item.title.as_deref(), Some("Nike Air Max 1 Patta"));
        assert_eq!(item.sku.as_deref(), Some("DQ0299-100"));
        assert_eq!(item.estimated_market_value, Some(160.0));
        assert_eq!(item.gallery, vec!["https://images.example.com/patta.jpg"]);
    }

    #[test]
    fn test_lookup_item_gallery_list_and_null() {
        let item: LookupItem = serde_json::from_value(json!({
            "title": "Samba OG",
            "estimatedMarketValue": 120.5,
            "gallery": ["https://a.test/1.jpg", "https://a.test/2.jpg"]
        }))
        .unwrap();
        assert_eq!(item.gallery.len(), 2);
        assert_eq!(item.estimated_market_value, Some(120.5));

        let item: LookupItem = serde_json::from_value(json!({ "gallery": null })).unwrap();
        assert!(item.gallery.is_empty());
    }
}
