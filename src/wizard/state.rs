use serde::Serialize;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use super::step::ModalStep;
use crate::models::{SneakerDraft, SneakerField, SneakerRecord};
use crate::services::FormValidation;

/// Mutable state of one wizard session
///
/// Only [`super::ModalStateMachine`] writes to it. `generation` increases
/// every time the wizard is opened or closed; results of async work started
/// under an older generation are discarded.
#[derive(Debug)]
pub struct WizardState {
    pub open: bool,
    pub step: ModalStep,
    pub current_sneaker: Option<SneakerRecord>,
    pub draft: SneakerDraft,
    pub form: FormValidation,
    pub error_msg: Option<String>,
    pub is_loading: bool,
    /// Text in the SKU field or the last scanned barcode
    pub lookup_input: String,
    pub next_sneaker: Option<SneakerRecord>,
    pub prev_sneaker: Option<SneakerRecord>,
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            open: false,
            step: ModalStep::Index,
            current_sneaker: None,
            draft: SneakerDraft::default(),
            form: FormValidation::new(),
            error_msg: None,
            is_loading: false,
            lookup_input: String::new(),
            next_sneaker: None,
            prev_sneaker: None,
            generation: 0,
            cancel: CancellationToken::new(),
        }
    }
}

impl WizardState {
    /// Cancel in-flight work and start a fresh session generation
    pub(crate) fn reset(&mut self, open: bool) {
        self.cancel.cancel();
        let generation = self.generation + 1;
        *self = Self {
            open,
            generation,
            ..Self::default()
        };
    }

    /// Begin network-bound work; returns the generation and token it runs under
    pub(crate) fn begin_loading(&mut self) -> (u64, CancellationToken) {
        self.is_loading = true;
        (self.generation, self.cancel.clone())
    }

    /// Whether a result started under `generation` still applies
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.open && self.generation == generation
    }

    pub(crate) fn set_error<S: Into<String>>(&mut self, message: S) {
        self.error_msg = Some(message.into());
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            open: self.open,
            step: self.step,
            current_sneaker: self.current_sneaker.clone(),
            draft: self.draft.clone(),
            field_errors: self.form.errors().clone(),
            error_message: self.error_msg.clone(),
            is_loading: self.is_loading,
            has_next: self.next_sneaker.is_some(),
            has_previous: self.prev_sneaker.is_some(),
        }
    }
}

/// Read-only copy of the wizard state for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSnapshot {
    pub open: bool,
    pub step: ModalStep,
    pub current_sneaker: Option<SneakerRecord>,
    pub draft: SneakerDraft,
    pub field_errors: BTreeMap<SneakerField, String>,
    pub error_message: Option<String>,
    pub is_loading: bool,
    pub has_next: bool,
    pub has_previous: bool,
}
