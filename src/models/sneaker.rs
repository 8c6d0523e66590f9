use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::Photo;

/// Known sneaker brands
///
/// Lookups that return an unknown brand fall back to [`Brand::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Nike,
    Jordan,
    Adidas,
    Yeezy,
    NewBalance,
    Asics,
    Puma,
    Reebok,
    Converse,
    Vans,
    Salomon,
    Other,
}

impl Brand {
    pub const ALL: [Brand; 12] = [
        Brand::Nike,
        Brand::Jordan,
        Brand::Adidas,
        Brand::Yeezy,
        Brand::NewBalance,
        Brand::Asics,
        Brand::Puma,
        Brand::Reebok,
        Brand::Converse,
        Brand::Vans,
        Brand::Salomon,
        Brand::Other,
    ];

    /// Stored/serialized identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Nike => "nike",
            Brand::Jordan => "jordan",
            Brand::Adidas => "adidas",
            Brand::Yeezy => "yeezy",
            Brand::NewBalance => "new_balance",
            Brand::Asics => "asics",
            Brand::Puma => "puma",
            Brand::Reebok => "reebok",
            Brand::Converse => "converse",
            Brand::Vans => "vans",
            Brand::Salomon => "salomon",
            Brand::Other => "other",
        }
    }

    /// Human display label, as it appears in catalogue titles
    pub fn label(&self) -> &'static str {
        match self {
            Brand::Nike => "Nike",
            Brand::Jordan => "Jordan",
            Brand::Adidas => "Adidas",
            Brand::Yeezy => "Yeezy",
            Brand::NewBalance => "New Balance",
            Brand::Asics => "Asics",
            Brand::Puma => "Puma",
            Brand::Reebok => "Reebok",
            Brand::Converse => "Converse",
            Brand::Vans => "Vans",
            Brand::Salomon => "Salomon",
            Brand::Other => "Other",
        }
    }

    /// Case-insensitive match against labels and identifiers, falling back
    /// to `Other`
    pub fn match_label(raw: &str) -> Brand {
        let needle = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|brand| {
                brand.label().eq_ignore_ascii_case(needle)
                    || brand.as_str().eq_ignore_ascii_case(needle)
            })
            .unwrap_or(Brand::Other)
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|brand| brand.as_str() == s)
            .ok_or_else(|| format!("unknown brand '{}'", s))
    }
}

/// What the owner is doing with the pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SneakerStatus {
    Stocking,
    Selling,
    Rocking,
}

impl SneakerStatus {
    pub const ALL: [SneakerStatus; 3] = [
        SneakerStatus::Stocking,
        SneakerStatus::Selling,
        SneakerStatus::Rocking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SneakerStatus::Stocking => "stocking",
            SneakerStatus::Selling => "selling",
            SneakerStatus::Rocking => "rocking",
        }
    }
}

impl std::fmt::Display for SneakerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SneakerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

/// Sizing line of the shoe; selects the US column of the size table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }

    /// Lenient parse of catalogue gender strings ("Men's", "womens", "W")
    ///
    /// Unisex and unknown values return `None`.
    pub fn parse_loose(raw: &str) -> Option<Gender> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "men" | "mens" | "man" | "male" | "m" => Some(Gender::Men),
            "women" | "womens" | "woman" | "female" | "w" | "wmns" => Some(Gender::Women),
            _ => None,
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::parse_loose(s).ok_or_else(|| format!("unknown gender '{}'", s))
    }
}

/// A persisted sneaker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SneakerRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: Brand,
    pub model: String,
    pub size_eu: f64,
    pub size_us: f64,
    pub condition: u8,
    pub status: SneakerStatus,
    pub price_paid: Option<f64>,
    pub description: Option<String>,
    pub images: Vec<Photo>,
    pub og_box: bool,
    pub ds: bool,
    pub gender: Gender,
    pub sku: Option<String>,
    pub estimated_value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SneakerRecord {
    /// Display title, e.g. "Nike Air Max 1 Patta"
    pub fn title(&self) -> String {
        match self.brand {
            Brand::Other => self.model.clone(),
            brand => format!("{} {}", brand.label(), self.model),
        }
    }
}

/// Row payload for inserting a sneaker; images are attached afterwards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSneaker {
    pub owner_id: Uuid,
    pub brand: Brand,
    pub model: String,
    pub size_eu: f64,
    pub size_us: f64,
    pub condition: u8,
    pub status: SneakerStatus,
    pub price_paid: Option<f64>,
    pub description: Option<String>,
    pub og_box: bool,
    pub ds: bool,
    pub gender: Gender,
    pub sku: Option<String>,
    pub estimated_value: f64,
}

/// Partial update for a persisted sneaker; `None` leaves a column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SneakerPatch {
    pub brand: Option<Brand>,
    pub model: Option<String>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub condition: Option<u8>,
    pub status: Option<SneakerStatus>,
    pub price_paid: Option<Option<f64>>,
    pub description: Option<Option<String>>,
    pub images: Option<Vec<Photo>>,
    pub og_box: Option<bool>,
    pub ds: Option<bool>,
    pub gender: Option<Gender>,
    pub sku: Option<Option<String>>,
    pub estimated_value: Option<f64>,
}

impl SneakerPatch {
    /// Patch that only replaces the image list
    pub fn images(images: Vec<Photo>) -> Self {
        Self {
            images: Some(images),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, record: &mut SneakerRecord) {
        if let Some(brand) = self.brand {
            record.brand = brand;
        }
        if let Some(model) = self.model {
            record.model = model;
        }
        if let Some(size_eu) = self.size_eu {
            record.size_eu = size_eu;
        }
        if let Some(size_us) = self.size_us {
            record.size_us = size_us;
        }
        if let Some(condition) = self.condition {
            record.condition = condition;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(price_paid) = self.price_paid {
            record.price_paid = price_paid;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(images) = self.images {
            record.images = images;
        }
        if let Some(og_box) = self.og_box {
            record.og_box = og_box;
        }
        if let Some(ds) = self.ds {
            record.ds = ds;
        }
        if let Some(gender) = self.gender {
            record.gender = gender;
        }
        if let Some(sku) = self.sku {
            record.sku = sku;
        }
        if let Some(estimated_value) = self.estimated_value {
            record.estimated_value = estimated_value;
        }
    }
}

/// Transient result of a SKU or barcode lookup
///
/// Consumed once to seed a [`super::SneakerDraft`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchedSneakerDraft {
    pub model: String,
    pub brand: Brand,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub gender: Option<Gender>,
    pub estimated_value: Option<f64>,
    pub image: Option<Photo>,
}
