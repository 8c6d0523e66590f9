use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{LookupItem, LookupTransport};
use crate::config::LookupConfig;
use crate::errors::{LookupError, LookupResult};
use crate::models::{Brand, FetchedSneakerDraft, Gender, Photo};

/// Which identifier the user supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Sku,
    Barcode,
}

impl LookupKind {
    fn payload_key(&self) -> &'static str {
        match self {
            LookupKind::Sku => "sku",
            LookupKind::Barcode => "barcode",
        }
    }
}

/// Result of a lookup that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Blank input; the caller flags the field as required
    MissingInput,
    Found(FetchedSneakerDraft),
}

/// Resolves SKUs and barcodes to draft sneakers
#[derive(Clone)]
pub struct ExternalLookupClient {
    transport: Arc<dyn LookupTransport>,
    sku_function: String,
    barcode_function: String,
}

impl ExternalLookupClient {
    pub fn new(transport: Arc<dyn LookupTransport>, config: &LookupConfig) -> Self {
        Self {
            transport,
            sku_function: config.sku_function.clone(),
            barcode_function: config.barcode_function.clone(),
        }
    }

    pub async fn lookup_sku(&self, sku: &str) -> LookupResult<LookupOutcome> {
        self.lookup(LookupKind::Sku, sku).await
    }

    pub async fn lookup_barcode(&self, barcode: &str) -> LookupResult<LookupOutcome> {
        self.lookup(LookupKind::Barcode, barcode).await
    }

    pub async fn lookup(&self, kind: LookupKind, query: &str) -> LookupResult<LookupOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(LookupOutcome::MissingInput);
        }

        let function = match kind {
            LookupKind::Sku => &self.sku_function,
            LookupKind::Barcode => &self.barcode_function,
        };

        let mut payload = Map::new();
        payload.insert(kind.payload_key().to_string(), Value::from(query));

        let response = self
            .transport
            .invoke(function, Value::Object(payload))
            .await?;

        if let Some(message) = response.error {
            return Err(LookupError::Backend {
                function: function.clone(),
                message,
            });
        }

        let items = extract_items(response.data.unwrap_or(Value::Null))?;
        debug!("Lookup {} for '{}' returned {} item(s)", function, query, items.len());

        // Items without a title cannot seed a model name
        let item = items
            .into_iter()
            .find(|item| item.title.as_deref().map_or(false, |t| !t.trim().is_empty()))
            .ok_or_else(|| LookupError::NotFound {
                query: query.to_string(),
            })?;

        let draft = draft_from_item(item, query, kind);
        info!("Resolved '{}' to {} {}", query, draft.brand, draft.model);
        Ok(LookupOutcome::Found(draft))
    }
}

/// Items from `[...]`, `{ "results": [...] }`, a single object, or null
fn extract_items(data: Value) -> LookupResult<Vec<LookupItem>> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(LookupError::from))
            .collect(),
        Value::Object(mut map) => match map.remove("results") {
            Some(results) => extract_items(results),
            None => Ok(vec![serde_json::from_value(Value::Object(map))?]),
        },
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

fn draft_from_item(item: LookupItem, query: &str, kind: LookupKind) -> FetchedSneakerDraft {
    let brand = item
        .brand
        .as_deref()
        .map(Brand::match_label)
        .unwrap_or(Brand::Other);
    let title = item.title.unwrap_or_default();

    let sku = item
        .sku
        .filter(|sku| !sku.trim().is_empty())
        .or_else(|| (kind == LookupKind::Sku).then(|| query.to_string()));

    FetchedSneakerDraft {
        model: strip_brand(&title, brand),
        brand,
        sku,
        description: item.description.filter(|d| !d.trim().is_empty()),
        gender: item.gender.as_deref().and_then(Gender::parse_loose),
        estimated_value: item.estimated_market_value,
        image: item.gallery.into_iter().next().map(Photo::pending),
    }
}

/// Remove the brand's label from a catalogue title
///
/// Matching is case-insensitive on word boundaries; if nothing would be left
/// the title is kept as is.
pub fn strip_brand(title: &str, brand: Brand) -> String {
    let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");

    if brand == Brand::Other {
        return collapse(title);
    }

    let pattern = format!(r"(?i)\b{}\b", regex::escape(brand.label()));
    let stripped = match Regex::new(&pattern) {
        Ok(re) => collapse(&re.replace_all(title, " ")),
        Err(_) => collapse(title),
    };

    if stripped.is_empty() {
        collapse(title)
    } else {
        stripped
    }
}
