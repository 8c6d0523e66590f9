//! Input validation utilities
//!
//! This module provides a small declarative rule engine used to validate
//! form input. Rules are keyed by field name and evaluated against a map of
//! raw string values, the shape every form in the application reduces to.
//!
//! # Features
//!
//! - Required/length/pattern/choice rules
//! - Numeric, whole-number and range rules for text inputs
//! - Human-readable messages built from per-field labels
//! - Single-field evaluation for on-blur validation
//!
//! # Usage
//!
//! ```rust
//! use sneaker_vault::utils::validation::{Validator, ValidationRule};
//! use std::collections::HashMap;
//!
//! let validator = Validator::new()
//!     .label("condition", "Condition")
//!     .rule(ValidationRule::required("condition"))
//!     .rule(ValidationRule::range("condition", 1.0, 10.0));
//!
//! let mut data = HashMap::new();
//! data.insert("condition".to_string(), Some("11".to_string()));
//! let error = validator.validate_field("condition", &data).unwrap_err();
//! assert_eq!(error.to_string(), "Condition must be between 1 and 10");
//! ```

use std::collections::HashMap;
use thiserror::Error;

/// Validation errors that can occur during input validation
///
/// Each variant carries the field key and the human label used in the
/// message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is required but missing or empty
    #[error("{label} is required")]
    Required { field: String, label: String },

    /// Field value is too short
    #[error("{label} must be at least {min} characters")]
    TooShort {
        field: String,
        label: String,
        min: usize,
        actual: usize,
    },

    /// Field value is too long
    #[error("{label} must be at most {max} characters")]
    TooLong {
        field: String,
        label: String,
        max: usize,
        actual: usize,
    },

    /// Field value doesn't match required pattern
    #[error("{label} has an invalid format")]
    InvalidFormat { field: String, label: String },

    /// Field value is not in allowed list
    #[error("{label} must be one of: {}", .allowed.join(", "))]
    InvalidChoice {
        field: String,
        label: String,
        allowed: Vec<String>,
    },

    /// Field value is not numeric
    #[error("{label} must be a number")]
    NotANumber { field: String, label: String },

    /// Field value has a fractional part
    #[error("{label} must be a whole number")]
    NotWholeNumber { field: String, label: String },

    /// Field value is outside the inclusive range
    #[error("{label} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        label: String,
        min: f64,
        max: f64,
    },

    /// Custom validation error
    #[error("{message}")]
    Custom { field: String, message: String },
}

impl ValidationError {
    /// Key of the field that failed
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field, .. }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NotWholeNumber { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Custom { field, .. } => field,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// A validation rule that can be applied to a field
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// Field is required (not None, not blank)
    Required(String),

    /// Field must be at least min characters long
    MinLength { field: String, min: usize },

    /// Field must be at most max characters long
    MaxLength { field: String, max: usize },

    /// Field must match a regex pattern
    Regex { field: String, pattern: String },

    /// Field must be one of the allowed values
    Choice { field: String, allowed: Vec<String> },

    /// Field must parse as a number
    Number(String),

    /// Field must parse as a number without fractional part
    WholeNumber(String),

    /// Field must be a number within `min..=max`
    Range { field: String, min: f64, max: f64 },

    /// Custom validation function
    Custom {
        field: String,
        validator: fn(&str) -> Result<(), String>,
    },
}

impl ValidationRule {
    /// Create a required field rule
    pub fn required<S: Into<String>>(field: S) -> Self {
        Self::Required(field.into())
    }

    /// Create a minimum length rule
    pub fn min_length<S: Into<String>>(field: S, min: usize) -> Self {
        Self::MinLength {
            field: field.into(),
            min,
        }
    }

    /// Create a maximum length rule
    pub fn max_length<S: Into<String>>(field: S, max: usize) -> Self {
        Self::MaxLength {
            field: field.into(),
            max,
        }
    }

    /// Create a regex pattern rule
    pub fn regex<S: Into<String>>(field: S, pattern: S) -> Self {
        Self::Regex {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Create a choice validation rule
    pub fn choice<S: Into<String>>(field: S, allowed: Vec<S>) -> Self {
        Self::Choice {
            field: field.into(),
            allowed: allowed.into_iter().map(|s| s.into()).collect(),
        }
    }

    /// Create a numeric rule
    pub fn number<S: Into<String>>(field: S) -> Self {
        Self::Number(field.into())
    }

    /// Create a whole-number rule
    pub fn whole_number<S: Into<String>>(field: S) -> Self {
        Self::WholeNumber(field.into())
    }

    /// Create an inclusive numeric range rule
    pub fn range<S: Into<String>>(field: S, min: f64, max: f64) -> Self {
        Self::Range {
            field: field.into(),
            min,
            max,
        }
    }

    /// Create a custom validation rule
    pub fn custom<S: Into<String>>(field: S, validator: fn(&str) -> Result<(), String>) -> Self {
        Self::Custom {
            field: field.into(),
            validator,
        }
    }

    /// Field this rule applies to
    pub fn field(&self) -> &str {
        match self {
            ValidationRule::Required(field)
            | ValidationRule::Number(field)
            | ValidationRule::WholeNumber(field) => field,
            ValidationRule::MinLength { field, .. }
            | ValidationRule::MaxLength { field, .. }
            | ValidationRule::Regex { field, .. }
            | ValidationRule::Choice { field, .. }
            | ValidationRule::Range { field, .. }
            | ValidationRule::Custom { field, .. } => field,
        }
    }
}

/// Validator that applies multiple validation rules
#[derive(Debug)]
pub struct Validator {
    rules: Vec<ValidationRule>,
    labels: HashMap<String, String>,
}

impl Validator {
    /// Create a new empty validator
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            labels: HashMap::new(),
        }
    }

    /// Set the human label used in messages for a field
    pub fn label<F: Into<String>, L: Into<String>>(mut self, field: F, label: L) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Add a validation rule
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add multiple validation rules
    pub fn rules(mut self, rules: Vec<ValidationRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Distinct field names in rule order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !fields.contains(&rule.field()) {
                fields.push(rule.field());
            }
        }
        fields
    }

    /// Validate a map of field values, collecting every failing rule
    pub fn validate(&self, data: &HashMap<String, Option<String>>) -> ValidationResult<()> {
        let mut errors = Vec::new();

        for rule in &self.rules {
            match self.apply_rule(rule, data) {
                Ok(_) => continue,
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate one field; the first failing rule for it wins
    pub fn validate_field(
        &self,
        field: &str,
        data: &HashMap<String, Option<String>>,
    ) -> Result<(), ValidationError> {
        self.rules
            .iter()
            .filter(|rule| rule.field() == field)
            .try_for_each(|rule| self.apply_rule(rule, data))
    }

    /// First error per field, in rule order
    pub fn validate_by_field(
        &self,
        data: &HashMap<String, Option<String>>,
    ) -> Vec<(String, ValidationError)> {
        self.fields()
            .into_iter()
            .filter_map(|field| {
                self.validate_field(field, data)
                    .err()
                    .map(|error| (field.to_string(), error))
            })
            .collect()
    }

    fn label_for(&self, field: &str) -> String {
        self.labels
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }

    /// Value of a field, or None when missing or blank
    fn present<'a>(data: &'a HashMap<String, Option<String>>, field: &str) -> Option<&'a str> {
        data.get(field)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Apply a single validation rule
    fn apply_rule(
        &self,
        rule: &ValidationRule,
        data: &HashMap<String, Option<String>>,
    ) -> Result<(), ValidationError> {
        match rule {
            ValidationRule::Required(field) => match Self::present(data, field) {
                Some(_) => Ok(()),
                None => Err(ValidationError::Required {
                    field: field.clone(),
                    label: self.label_for(field),
                }),
            },

            ValidationRule::MinLength { field, min } => match Self::present(data, field) {
                Some(value) if value.chars().count() < *min => Err(ValidationError::TooShort {
                    field: field.clone(),
                    label: self.label_for(field),
                    min: *min,
                    actual: value.chars().count(),
                }),
                _ => Ok(()), // Skip validation if field is missing
            },

            ValidationRule::MaxLength { field, max } => match Self::present(data, field) {
                Some(value) if value.chars().count() > *max => Err(ValidationError::TooLong {
                    field: field.clone(),
                    label: self.label_for(field),
                    max: *max,
                    actual: value.chars().count(),
                }),
                _ => Ok(()),
            },

            ValidationRule::Regex { field, pattern } => {
                let Some(value) = Self::present(data, field) else {
                    return Ok(());
                };
                match regex::Regex::new(pattern) {
                    Ok(regex) if regex.is_match(value) => Ok(()),
                    Ok(_) => Err(ValidationError::InvalidFormat {
                        field: field.clone(),
                        label: self.label_for(field),
                    }),
                    Err(_) => Err(ValidationError::Custom {
                        field: field.clone(),
                        message: "Invalid regex pattern".to_string(),
                    }),
                }
            }

            ValidationRule::Choice { field, allowed } => match Self::present(data, field) {
                Some(value) if !allowed.iter().any(|a| a == value) => {
                    Err(ValidationError::InvalidChoice {
                        field: field.clone(),
                        label: self.label_for(field),
                        allowed: allowed.clone(),
                    })
                }
                _ => Ok(()),
            },

            ValidationRule::Number(field) => match Self::present(data, field) {
                Some(value) if parse_number(value).is_none() => Err(ValidationError::NotANumber {
                    field: field.clone(),
                    label: self.label_for(field),
                }),
                _ => Ok(()),
            },

            ValidationRule::WholeNumber(field) => {
                let Some(value) = Self::present(data, field) else {
                    return Ok(());
                };
                match parse_number(value) {
                    Some(_) if is_integer_text(value) => Ok(()),
                    Some(_) => Err(ValidationError::NotWholeNumber {
                        field: field.clone(),
                        label: self.label_for(field),
                    }),
                    None => Err(ValidationError::NotANumber {
                        field: field.clone(),
                        label: self.label_for(field),
                    }),
                }
            }

            ValidationRule::Range { field, min, max } => {
                let Some(value) = Self::present(data, field) else {
                    return Ok(());
                };
                match parse_number(value) {
                    Some(number) if number >= *min && number <= *max => Ok(()),
                    Some(_) => Err(ValidationError::OutOfRange {
                        field: field.clone(),
                        label: self.label_for(field),
                        min: *min,
                        max: *max,
                    }),
                    None => Err(ValidationError::NotANumber {
                        field: field.clone(),
                        label: self.label_for(field),
                    }),
                }
            }

            ValidationRule::Custom { field, validator } => {
                let value = data
                    .get(field)
                    .and_then(|v| v.as_deref())
                    .unwrap_or_default();
                validator(value).map_err(|message| ValidationError::Custom {
                    field: field.clone(),
                    message,
                })
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Optional sign followed by ASCII digits only; "10.0" and "1e1" are rejected
pub fn is_integer_text(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
