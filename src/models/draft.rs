use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    Brand, FetchedSneakerDraft, Gender, NewSneaker, Photo, SneakerPatch, SneakerRecord,
    SneakerStatus,
};
use crate::errors::{AppError, AppResult};
use crate::services::sneaker_validation::{CONDITION_MAX, CONDITION_MIN};
use crate::utils::validation::is_integer_text;

/// Form fields that carry validation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SneakerField {
    Model,
    Brand,
    Size,
    Condition,
    Status,
    PricePaid,
    Description,
    Sku,
    Images,
}

impl SneakerField {
    pub const ALL: [SneakerField; 9] = [
        SneakerField::Model,
        SneakerField::Brand,
        SneakerField::Size,
        SneakerField::Condition,
        SneakerField::Status,
        SneakerField::PricePaid,
        SneakerField::Description,
        SneakerField::Sku,
        SneakerField::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SneakerField::Model => "model",
            SneakerField::Brand => "brand",
            SneakerField::Size => "size",
            SneakerField::Condition => "condition",
            SneakerField::Status => "status",
            SneakerField::PricePaid => "price_paid",
            SneakerField::Description => "description",
            SneakerField::Sku => "sku",
            SneakerField::Images => "images",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SneakerField::Model => "Model",
            SneakerField::Brand => "Brand",
            SneakerField::Size => "Size",
            SneakerField::Condition => "Condition",
            SneakerField::Status => "Status",
            SneakerField::PricePaid => "Price paid",
            SneakerField::Description => "Description",
            SneakerField::Sku => "SKU",
            SneakerField::Images => "Images",
        }
    }

    pub fn from_key(key: &str) -> Option<SneakerField> {
        Self::ALL.iter().copied().find(|field| field.as_str() == key)
    }
}

/// A single user edit to the form
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Brand(Brand),
    Model(String),
    Size(String),
    Condition(String),
    Status(SneakerStatus),
    PricePaid(String),
    Description(String),
    Sku(String),
    Gender(Gender),
    OgBox(bool),
    Deadstock(bool),
}

impl DraftEdit {
    /// Field whose validation state the edit affects
    pub fn field(&self) -> Option<SneakerField> {
        match self {
            DraftEdit::Brand(_) => Some(SneakerField::Brand),
            DraftEdit::Model(_) => Some(SneakerField::Model),
            DraftEdit::Size(_) => Some(SneakerField::Size),
            DraftEdit::Condition(_) | DraftEdit::Deadstock(_) => Some(SneakerField::Condition),
            DraftEdit::Status(_) => Some(SneakerField::Status),
            DraftEdit::PricePaid(_) => Some(SneakerField::PricePaid),
            DraftEdit::Description(_) => Some(SneakerField::Description),
            DraftEdit::Sku(_) => Some(SneakerField::Sku),
            DraftEdit::Gender(_) | DraftEdit::OgBox(_) => None,
        }
    }
}

/// US/EU representation of one size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizePair {
    pub size_us: f64,
    pub size_eu: f64,
}

/// In-progress form values
///
/// Numeric fields keep the raw text the user typed so that validation can
/// report on it; nothing here is persisted until it has been converted with
/// [`SneakerDraft::to_new_sneaker`] or [`SneakerDraft::to_patch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SneakerDraft {
    pub brand: Option<Brand>,
    pub model: String,
    pub size: String,
    pub condition: String,
    pub status: Option<SneakerStatus>,
    pub price_paid: String,
    pub description: String,
    pub images: Vec<Photo>,
    pub og_box: bool,
    pub ds: bool,
    pub gender: Gender,
    pub sku: String,
    pub estimated_value: Option<f64>,
}

impl Default for SneakerDraft {
    fn default() -> Self {
        Self {
            brand: None,
            model: String::new(),
            size: String::new(),
            condition: String::new(),
            status: Some(SneakerStatus::Rocking),
            price_paid: String::new(),
            description: String::new(),
            images: Vec::new(),
            og_box: false,
            ds: false,
            gender: Gender::Men,
            sku: String::new(),
            estimated_value: None,
        }
    }
}

impl SneakerDraft {
    /// Seed the edit form from a persisted record; the US size is the
    /// canonical input
    pub fn from_record(record: &SneakerRecord) -> Self {
        Self {
            brand: Some(record.brand),
            model: record.model.clone(),
            size: record.size_us.to_string(),
            condition: record.condition.to_string(),
            status: Some(record.status),
            price_paid: record
                .price_paid
                .map(|price| price.to_string())
                .unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            images: record.images.clone(),
            og_box: record.og_box,
            ds: record.ds,
            gender: record.gender,
            sku: record.sku.clone().unwrap_or_default(),
            estimated_value: Some(record.estimated_value),
        }
    }

    /// Seed the add form from a catalogue lookup result
    pub fn from_fetched(fetched: FetchedSneakerDraft) -> Self {
        Self {
            brand: Some(fetched.brand),
            model: fetched.model,
            description: fetched.description.unwrap_or_default(),
            images: fetched.image.into_iter().collect(),
            gender: fetched.gender.unwrap_or_default(),
            sku: fetched.sku.unwrap_or_default(),
            estimated_value: fetched.estimated_value,
            ..Self::default()
        }
    }

    /// Raw text of a field as seen by the validator
    pub fn value_of(&self, field: SneakerField) -> Option<String> {
        match field {
            SneakerField::Model => Some(self.model.clone()),
            SneakerField::Brand => self.brand.map(|brand| brand.as_str().to_string()),
            SneakerField::Size => Some(self.size.clone()),
            SneakerField::Condition => Some(self.condition.clone()),
            SneakerField::Status => self.status.map(|status| status.as_str().to_string()),
            SneakerField::PricePaid => Some(self.price_paid.clone()),
            SneakerField::Description => Some(self.description.clone()),
            SneakerField::Sku => Some(self.sku.clone()),
            SneakerField::Images => Some(self.images.len().to_string()),
        }
    }

    /// All field values keyed by field name
    pub fn field_values(&self) -> HashMap<String, Option<String>> {
        SneakerField::ALL
            .iter()
            .map(|field| (field.as_str().to_string(), self.value_of(*field)))
            .collect()
    }

    pub fn parsed_size(&self) -> AppResult<f64> {
        self.size
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::validation("Size must be a number"))
    }

    /// Convert a validated draft into an insert payload
    pub fn to_new_sneaker(&self, owner_id: Uuid, sizes: SizePair) -> AppResult<NewSneaker> {
        Ok(NewSneaker {
            owner_id,
            brand: self
                .brand
                .ok_or_else(|| AppError::validation("Brand is required"))?,
            model: self.model.trim().to_string(),
            size_eu: sizes.size_eu,
            size_us: sizes.size_us,
            condition: self.parsed_condition()?,
            status: self
                .status
                .ok_or_else(|| AppError::validation("Status is required"))?,
            price_paid: self.parsed_price()?,
            description: non_empty(&self.description),
            og_box: self.og_box,
            ds: self.ds,
            gender: self.gender,
            sku: non_empty(&self.sku),
            estimated_value: self.estimated_value.unwrap_or(0.0),
        })
    }

    /// Convert a validated draft into a full-row update with the final images
    pub fn to_patch(&self, sizes: SizePair, images: Vec<Photo>) -> AppResult<SneakerPatch> {
        Ok(SneakerPatch {
            brand: Some(
                self.brand
                    .ok_or_else(|| AppError::validation("Brand is required"))?,
            ),
            model: Some(self.model.trim().to_string()),
            size_eu: Some(sizes.size_eu),
            size_us: Some(sizes.size_us),
            condition: Some(self.parsed_condition()?),
            status: Some(
                self.status
                    .ok_or_else(|| AppError::validation("Status is required"))?,
            ),
            price_paid: Some(self.parsed_price()?),
            description: Some(non_empty(&self.description)),
            images: Some(images),
            og_box: Some(self.og_box),
            ds: Some(self.ds),
            gender: Some(self.gender),
            sku: Some(non_empty(&self.sku)),
            estimated_value: self.estimated_value,
        })
    }

    fn parsed_condition(&self) -> AppResult<u8> {
        let trimmed = self.condition.trim();
        if !is_integer_text(trimmed) {
            return Err(AppError::validation("Condition must be a whole number"));
        }
        trimmed
            .parse::<i64>()
            .ok()
            .and_then(|value| u8::try_from(value).ok())
            .filter(|value| (CONDITION_MIN..=CONDITION_MAX).contains(value))
            .ok_or_else(|| AppError::validation("Condition must be between 1 and 10"))
    }

    fn parsed_price(&self) -> AppResult<Option<f64>> {
        let raw = self.price_paid.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::validation("Price paid must be a number"))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
