//! Sneaker form schema and per-field error state
//!
//! Two trigger points feed the same schema: on-blur validation of a single
//! field and on-submit validation of the whole form. The message surfaced to
//! the user is the field's own message when exactly one field is invalid and
//! a generic banner otherwise.

use std::collections::BTreeMap;

use crate::models::{Brand, DraftEdit, SneakerDraft, SneakerField, SneakerStatus};
use crate::utils::validation::{ValidationRule, Validator};

/// Banner shown when more than one field is invalid
pub const GENERIC_BANNER: &str = "Please correct the highlighted fields";

pub const CONDITION_MIN: u8 = 1;
pub const CONDITION_MAX: u8 = 10;
pub const MODEL_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;
pub const SKU_MAX_LENGTH: usize = 40;
pub const SIZE_MIN: f64 = 1.0;
pub const SIZE_MAX: f64 = 60.0;
pub const PRICE_MAX: f64 = 1_000_000.0;

const SKU_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9 /\-]*$";

fn at_least_one_image(value: &str) -> Result<(), String> {
    match value.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(()),
        _ => Err("At least one image is required".to_string()),
    }
}

/// Declarative rules for every sneaker form field
#[derive(Debug)]
pub struct SneakerSchema {
    validator: Validator,
}

impl Default for SneakerSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SneakerSchema {
    pub fn new() -> Self {
        let mut validator = Validator::new();
        for field in SneakerField::ALL {
            validator = validator.label(field.as_str(), field.label());
        }

        let brands: Vec<&str> = Brand::ALL.iter().map(|b| b.as_str()).collect();
        let statuses: Vec<&str> = SneakerStatus::ALL.iter().map(|s| s.as_str()).collect();

        let validator = validator
            .rule(ValidationRule::required("model"))
            .rule(ValidationRule::max_length("model", MODEL_MAX_LENGTH))
            .rule(ValidationRule::required("brand"))
            .rule(ValidationRule::choice("brand", brands))
            .rule(ValidationRule::required("size"))
            .rule(ValidationRule::number("size"))
            .rule(ValidationRule::range("size", SIZE_MIN, SIZE_MAX))
            .rule(ValidationRule::required("condition"))
            .rule(ValidationRule::whole_number("condition"))
            .rule(ValidationRule::range(
                "condition",
                CONDITION_MIN as f64,
                CONDITION_MAX as f64,
            ))
            .rule(ValidationRule::required("status"))
            .rule(ValidationRule::choice("status", statuses))
            .rule(ValidationRule::number("price_paid"))
            .rule(ValidationRule::range("price_paid", 0.0, PRICE_MAX))
            .rule(ValidationRule::max_length("description", DESCRIPTION_MAX_LENGTH))
            .rule(ValidationRule::max_length("sku", SKU_MAX_LENGTH))
            .rule(ValidationRule::regex("sku", SKU_PATTERN))
            .rule(ValidationRule::custom("images", at_least_one_image));

        Self { validator }
    }

    /// Message for one field, or None when it is valid
    pub fn validate_field(&self, field: SneakerField, draft: &SneakerDraft) -> Option<String> {
        self.validator
            .validate_field(field.as_str(), &draft.field_values())
            .err()
            .map(|error| error.to_string())
    }

    /// Messages for every invalid field
    pub fn validate_all(&self, draft: &SneakerDraft) -> BTreeMap<SneakerField, String> {
        self.validator
            .validate_by_field(&draft.field_values())
            .into_iter()
            .filter_map(|(key, error)| {
                SneakerField::from_key(&key).map(|field| (field, error.to_string()))
            })
            .collect()
    }
}

/// Per-field error state of the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValidation {
    errors: BTreeMap<SneakerField, String>,
}

impl FormValidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a single field and record (or clear) its error
    pub fn on_blur(
        &mut self,
        schema: &SneakerSchema,
        field: SneakerField,
        draft: &SneakerDraft,
    ) -> Option<&str> {
        match schema.validate_field(field, draft) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
        self.error_for(field)
    }

    /// Validate the whole schema, replacing all recorded errors
    pub fn on_submit(&mut self, schema: &SneakerSchema, draft: &SneakerDraft) -> bool {
        self.errors = schema.validate_all(draft);
        self.errors.is_empty()
    }

    pub fn set_error<S: Into<String>>(&mut self, field: SneakerField, message: S) {
        self.errors.insert(field, message.into());
    }

    pub fn clear(&mut self, field: SneakerField) {
        self.errors.remove(&field);
    }

    pub fn clear_all(&mut self) {
        self.errors.clear();
    }

    pub fn error_for(&self, field: SneakerField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<SneakerField, String> {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Specific message for a single invalid field, banner for several
    pub fn surfaced_message(&self) -> Option<String> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.values().next().cloned(),
            _ => Some(GENERIC_BANNER.to_string()),
        }
    }
}

/// Whether the user may change `condition` directly
pub fn is_condition_editable(draft: &SneakerDraft) -> bool {
    !draft.ds
}

/// Apply one edit to the draft, including cross-field side effects
///
/// Marking a pair as deadstock forces `condition` to the maximum, and while
/// `ds` is set condition edits are ignored. Returns the field whose error
/// state should be refreshed.
pub fn apply_edit(draft: &mut SneakerDraft, edit: DraftEdit) -> Option<SneakerField> {
    let field = edit.field();
    match edit {
        DraftEdit::Brand(brand) => draft.brand = Some(brand),
        DraftEdit::Model(model) => draft.model = model,
        DraftEdit::Size(size) => draft.size = size,
        DraftEdit::Condition(condition) => {
            if !is_condition_editable(draft) {
                return None;
            }
            draft.condition = condition;
        }
        DraftEdit::Status(status) => draft.status = Some(status),
        DraftEdit::PricePaid(price) => draft.price_paid = price,
        DraftEdit::Description(description) => draft.description = description,
        DraftEdit::Sku(sku) => draft.sku = sku,
        DraftEdit::Gender(gender) => draft.gender = gender,
        DraftEdit::OgBox(og_box) => draft.og_box = og_box,
        DraftEdit::Deadstock(ds) => {
            draft.ds = ds;
            if ds {
                draft.condition = CONDITION_MAX.to_string();
            }
        }
    }
    field
}
