//! Table-driven US/EU shoe size conversion
//!
//! Conversions are exact lookups against a fixed table. Sizes that are not
//! tabulated are returned unchanged; there is no interpolation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::models::{Gender, SizePair};

/// Inclusive range of values treated as US sizes by [`SizeConversionEngine::detect_size_unit`]
pub const US_DETECTION_MIN: f64 = 3.5;
pub const US_DETECTION_MAX: f64 = 17.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Us,
    Eu,
}

impl SizeUnit {
    pub fn label(&self) -> &'static str {
        match self {
            SizeUnit::Us => "US",
            SizeUnit::Eu => "EU",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(SizeUnit::Us),
            "eu" => Ok(SizeUnit::Eu),
            other => Err(format!("unknown size unit '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRow {
    pub us_men: f64,
    pub us_women: f64,
    pub eu: f64,
}

impl SizeRow {
    const fn new(us_men: f64, us_women: f64, eu: f64) -> Self {
        Self {
            us_men,
            us_women,
            eu,
        }
    }

    fn value(&self, unit: SizeUnit, gender: Gender) -> f64 {
        match (unit, gender) {
            (SizeUnit::Eu, _) => self.eu,
            (SizeUnit::Us, Gender::Men) => self.us_men,
            (SizeUnit::Us, Gender::Women) => self.us_women,
        }
    }
}

/// US 3.5 – 15.5 in half sizes
pub const SIZE_TABLE: [SizeRow; 25] = [
    SizeRow::new(3.5, 5.0, 35.0),
    SizeRow::new(4.0, 5.5, 35.5),
    SizeRow::new(4.5, 6.0, 36.0),
    SizeRow::new(5.0, 6.5, 36.5),
    SizeRow::new(5.5, 7.0, 37.0),
    SizeRow::new(6.0, 7.5, 37.5),
    SizeRow::new(6.5, 8.0, 38.0),
    SizeRow::new(7.0, 8.5, 38.5),
    SizeRow::new(7.5, 9.0, 39.0),
    SizeRow::new(8.0, 9.5, 39.5),
    SizeRow::new(8.5, 10.0, 40.0),
    SizeRow::new(9.0, 10.5, 40.5),
    SizeRow::new(9.5, 11.0, 41.0),
    SizeRow::new(10.0, 11.5, 41.5),
    SizeRow::new(10.5, 12.0, 42.0),
    SizeRow::new(11.0, 12.5, 42.5),
    SizeRow::new(11.5, 13.0, 43.0),
    SizeRow::new(12.0, 13.5, 43.5),
    SizeRow::new(12.5, 14.0, 44.0),
    SizeRow::new(13.0, 14.5, 44.5),
    SizeRow::new(13.5, 15.0, 45.0),
    SizeRow::new(14.0, 15.5, 45.5),
    SizeRow::new(14.5, 16.0, 46.0),
    SizeRow::new(15.0, 16.5, 46.5),
    SizeRow::new(15.5, 17.0, 47.0),
];

/// Gender-aware size conversion over [`SIZE_TABLE`]
#[derive(Debug, Clone, Copy)]
pub struct SizeConversionEngine {
    table: &'static [SizeRow],
}

impl Default for SizeConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeConversionEngine {
    pub fn new() -> Self {
        Self { table: &SIZE_TABLE }
    }

    fn find_row(&self, size: f64, unit: SizeUnit, gender: Gender) -> Option<&SizeRow> {
        self.table
            .iter()
            .find(|row| (row.value(unit, gender) - size).abs() < f64::EPSILON)
    }

    /// Convert `size` between units; untabulated sizes come back unchanged
    pub fn convert_size(&self, size: f64, from: SizeUnit, to: SizeUnit, gender: Gender) -> f64 {
        if from == to {
            return size;
        }

        match self.find_row(size, from, gender) {
            Some(row) => row.value(to, gender),
            None => {
                debug!(
                    "Size {} {} not in conversion table, returning unchanged",
                    from.label(),
                    size
                );
                size
            }
        }
    }

    /// US when `3.5 <= size <= 17`, otherwise EU
    pub fn detect_size_unit(&self, size: f64) -> SizeUnit {
        if (US_DETECTION_MIN..=US_DETECTION_MAX).contains(&size) {
            SizeUnit::Us
        } else {
            SizeUnit::Eu
        }
    }

    /// Derive the US/EU pair from one canonical input
    pub fn generate_both_sizes(&self, size: f64, gender: Gender) -> SizePair {
        match self.detect_size_unit(size) {
            SizeUnit::Us => SizePair {
                size_us: size,
                size_eu: self.convert_size(size, SizeUnit::Us, SizeUnit::Eu, gender),
            },
            SizeUnit::Eu => SizePair {
                size_us: self.convert_size(size, SizeUnit::Eu, SizeUnit::Us, gender),
                size_eu: size,
            },
        }
    }

    /// "US 9", "EU 40.5"
    pub fn format_size(&self, size: f64, unit: SizeUnit) -> String {
        format!("{} {}", unit.label(), size)
    }

    pub fn is_valid_size(&self, size: f64, unit: SizeUnit, gender: Gender) -> bool {
        self.find_row(size, unit, gender).is_some()
    }

    /// Tabulated sizes for a unit, ascending
    pub fn get_available_sizes(&self, unit: SizeUnit, gender: Gender) -> Vec<f64> {
        self.table.iter().map(|row| row.value(unit, gender)).collect()
    }
}
