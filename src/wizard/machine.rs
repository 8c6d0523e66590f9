//! Wizard orchestrator
//!
//! All commands take `&self` and serialize through one state lock. The lock
//! is never held across an await: network-bound handlers mark the state as
//! loading, release the lock, do their work and then re-acquire it to apply
//! the result, provided the session that started the work is still open.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collaborators::{messages, Localizer, NotificationKind, Notifier, SessionProvider};
use super::state::{WizardSnapshot, WizardState};
use super::step::{BackAction, ModalStep, NextAction};
use crate::errors::{AppError, AppResult};
use crate::lookup::{ExternalLookupClient, LookupKind, LookupOutcome};
use crate::models::{DraftEdit, Photo, SneakerDraft, SneakerField, SneakerRecord};
use crate::services::sneaker_validation::apply_edit;
use crate::services::{SneakerCommands, SneakerSchema};

/// Everything the wizard needs from the outside
#[derive(Clone)]
pub struct WizardDeps {
    pub session: Arc<dyn SessionProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub localizer: Arc<dyn Localizer>,
    pub lookup: ExternalLookupClient,
    pub sneakers: Arc<dyn SneakerCommands>,
}

#[derive(Clone)]
pub struct ModalStateMachine {
    state: Arc<RwLock<WizardState>>,
    schema: Arc<SneakerSchema>,
    deps: WizardDeps,
}

/// Work to run after the state lock has been released
enum Pending {
    Lookup {
        kind: LookupKind,
        query: String,
    },
    Create {
        owner_id: Uuid,
        draft: SneakerDraft,
    },
    Update {
        actor_id: Uuid,
        sneaker_id: Uuid,
        draft: SneakerDraft,
    },
    Delete {
        actor_id: Uuid,
        sneaker_id: Uuid,
    },
}

enum Completed {
    Lookup(LookupKind, AppResult<LookupOutcome>),
    Saved {
        created: bool,
        result: AppResult<SneakerRecord>,
    },
    Deleted(AppResult<()>),
}

impl ModalStateMachine {
    pub fn new(deps: WizardDeps) -> Self {
        Self {
            state: Arc::new(RwLock::new(WizardState::default())),
            schema: Arc::new(SneakerSchema::new()),
            deps,
        }
    }

    fn text(&self, message: (&str, &str)) -> String {
        self.deps.localizer.localize(message.0, message.1)
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.deps.notifier.notify(kind, message);
    }

    // ---- opening and closing ----------------------------------------------

    pub async fn open_for_create(&self) {
        let mut state = self.state.write().await;
        state.reset(true);
        debug!("Wizard opened for create");
    }

    pub async fn open_on_record(&self, record: SneakerRecord) {
        let mut state = self.state.write().await;
        state.reset(true);
        self.show_record(&mut state, record);
        debug!("Wizard opened on sneaker");
    }

    /// Jump straight to a step; false when the step cannot be entered
    pub async fn open_on_step(&self, step: ModalStep) -> bool {
        let mut state = self.state.write().await;
        if state.is_loading {
            debug!("Ignoring jump to {} while work is in flight", step);
            return false;
        }
        if step.requires_record() && state.current_sneaker.is_none() {
            warn!("Cannot open wizard on {} without a sneaker", step);
            return false;
        }
        if !self.guard_entry(&state, step) {
            return false;
        }
        if !state.open {
            state.reset(true);
        }
        self.enter(&mut state, step);
        true
    }

    pub async fn close(&self) {
        let mut state = self.state.write().await;
        if state.is_loading {
            info!("Closing wizard with work in flight; it will be cancelled");
        }
        state.reset(false);
    }

    // ---- navigation --------------------------------------------------------

    /// Advance from the current step; returns the step after handling
    pub async fn next(&self) -> ModalStep {
        let (pending, generation, token) = {
            let mut state = self.state.write().await;
            if !state.open {
                return state.step;
            }
            if state.is_loading {
                debug!("Ignoring Next on {} while busy", state.step);
                return state.step;
            }

            let pending = match state.step.on_next() {
                NextAction::Goto(target) => {
                    self.transition(&mut state, target);
                    None
                }
                NextAction::LookupSku => self.prepare_lookup(&mut state, LookupKind::Sku),
                NextAction::LookupBarcode => self.prepare_lookup(&mut state, LookupKind::Barcode),
                NextAction::RequireImages(target) => {
                    self.require_images(&mut state, target);
                    None
                }
                NextAction::CreateSneaker => self.prepare_create(&mut state),
                NextAction::UpdateSneaker => self.prepare_update(&mut state),
                NextAction::BrowseNext => {
                    match state.next_sneaker.clone() {
                        Some(record) => self.show_record(&mut state, record),
                        None => state.reset(false),
                    }
                    None
                }
            };

            match pending {
                Some(pending) => {
                    let (generation, token) = state.begin_loading();
                    (pending, generation, token)
                }
                None => return state.step,
            }
        };

        let completed = self.run(pending, &token).await;
        self.complete(generation, completed).await
    }

    /// Go back from the current step; returns the step after handling
    pub async fn back(&self) -> ModalStep {
        let mut state = self.state.write().await;
        if !state.open {
            return state.step;
        }
        if state.is_loading {
            debug!("Ignoring Back on {} while busy", state.step);
            return state.step;
        }

        match state.step.on_back() {
            BackAction::Close => state.reset(false),
            BackAction::Goto(target) => self.transition(&mut state, target),
            BackAction::DiscardDraft(target) => {
                state.draft = SneakerDraft::default();
                state.form.clear_all();
                state.error_msg = None;
                state.step = target;
            }
            BackAction::BrowsePrevious => match state.prev_sneaker.clone() {
                Some(record) => self.show_record(&mut state, record),
                None => state.reset(false),
            },
        }
        state.step
    }

    /// Index → addFormImages with an empty draft
    pub async fn start_manual_entry(&self) -> ModalStep {
        let mut state = self.state.write().await;
        if state.open
            && state.step == ModalStep::Index
            && !state.is_loading
            && self.guard_entry(&state, ModalStep::AddFormImages)
        {
            state.draft = SneakerDraft::default();
            self.enter(&mut state, ModalStep::AddFormImages);
        }
        state.step
    }

    /// Index → barcode
    pub async fn start_barcode_scan(&self) -> ModalStep {
        let mut state = self.state.write().await;
        if state.open && state.step == ModalStep::Index && !state.is_loading {
            state.lookup_input.clear();
            self.enter(&mut state, ModalStep::Barcode);
        }
        state.step
    }

    /// View → editForm
    pub async fn start_edit(&self) -> ModalStep {
        let mut state = self.state.write().await;
        if state.open && state.step == ModalStep::View && !state.is_loading {
            self.transition(&mut state, ModalStep::EditForm);
        }
        state.step
    }

    /// EditForm → editFormImages
    pub async fn edit_images(&self) -> ModalStep {
        let mut state = self.state.write().await;
        if state.open && state.step == ModalStep::EditForm && !state.is_loading {
            self.transition(&mut state, ModalStep::EditFormImages);
        }
        state.step
    }

    pub async fn set_sku_input(&self, input: &str) {
        let mut state = self.state.write().await;
        if !state.open {
            return;
        }
        state.lookup_input = input.to_string();
        state.form.clear(SneakerField::Sku);
    }

    /// Type a SKU and run the lookup
    pub async fn search_sku(&self, sku: &str) -> ModalStep {
        self.submit_lookup(ModalStep::Sku, sku).await
    }

    /// Feed a scanned code and run the lookup
    pub async fn submit_barcode(&self, code: &str) -> ModalStep {
        self.submit_lookup(ModalStep::Barcode, code).await
    }

    async fn submit_lookup(&self, step: ModalStep, input: &str) -> ModalStep {
        {
            let mut state = self.state.write().await;
            if state.step != step || state.is_loading {
                return state.step;
            }
            state.lookup_input = input.to_string();
        }
        self.next().await
    }

    /// View: delete the shown sneaker, then browse to a sibling or close
    pub async fn delete_current(&self) -> ModalStep {
        let (pending, generation, token) = {
            let mut state = self.state.write().await;
            if !state.open || state.step != ModalStep::View || state.is_loading {
                return state.step;
            }
            let Some(sneaker_id) = state.current_sneaker.as_ref().map(|s| s.id) else {
                return state.step;
            };
            let Some(actor_id) = self.owner_session(&state) else {
                self.deny();
                return state.step;
            };

            let (generation, token) = state.begin_loading();
            (
                Pending::Delete {
                    actor_id,
                    sneaker_id,
                },
                generation,
                token,
            )
        };

        let completed = self.run(pending, &token).await;
        self.complete(generation, completed).await
    }

    // ---- form editing ------------------------------------------------------

    /// Apply an edit; an already-flagged field is re-validated right away
    pub async fn set_field(&self, edit: DraftEdit) {
        let mut state = self.state.write().await;
        let state = &mut *state;
        if !state.open {
            return;
        }
        if let Some(field) = apply_edit(&mut state.draft, edit) {
            if state.form.error_for(field).is_some() {
                state.form.on_blur(&self.schema, field, &state.draft);
                state.error_msg = state.form.surfaced_message();
            }
        }
    }

    pub async fn set_deadstock(&self, ds: bool) {
        self.set_field(DraftEdit::Deadstock(ds)).await;
    }

    /// Validate one field; returns its error message, if any
    pub async fn blur_field(&self, field: SneakerField) -> Option<String> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        if !state.open {
            return None;
        }
        state
            .form
            .on_blur(&self.schema, field, &state.draft)
            .map(str::to_string)
    }

    pub async fn add_photo(&self, photo: Photo) {
        let mut state = self.state.write().await;
        if !state.open {
            return;
        }
        state.draft.images.push(photo);
        if state.form.error_for(SneakerField::Images).is_some() {
            state.form.clear(SneakerField::Images);
            state.error_msg = state.form.surfaced_message();
        }
    }

    pub async fn remove_photo(&self, index: usize) -> Option<Photo> {
        let mut state = self.state.write().await;
        if !state.open {
            return None;
        }
        (index < state.draft.images.len()).then(|| state.draft.images.remove(index))
    }

    // ---- queries -------------------------------------------------------------

    pub async fn step(&self) -> ModalStep {
        self.state.read().await.step
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.open
    }

    pub async fn error_message(&self) -> Option<String> {
        self.state.read().await.error_msg.clone()
    }

    pub async fn current_sneaker(&self) -> Option<SneakerRecord> {
        self.state.read().await.current_sneaker.clone()
    }

    pub async fn draft(&self) -> SneakerDraft {
        self.state.read().await.draft.clone()
    }

    pub async fn field_errors(&self) -> std::collections::BTreeMap<SneakerField, String> {
        self.state.read().await.form.errors().clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.state.read().await.snapshot()
    }

    // ---- guards --------------------------------------------------------------

    fn signed_in_user(&self) -> Option<Uuid> {
        if self.deps.session.is_anonymous() {
            None
        } else {
            self.deps.session.current_user()
        }
    }

    /// Signed-in user who owns the current sneaker
    fn owner_session(&self, state: &WizardState) -> Option<Uuid> {
        let user = self.signed_in_user()?;
        state
            .current_sneaker
            .as_ref()
            .filter(|sneaker| sneaker.owner_id == user)
            .map(|_| user)
    }

    fn deny(&self) {
        warn!("Rejected wizard action without write access");
        self.notify(NotificationKind::Error, &self.text(messages::NOT_AUTHORIZED));
    }

    /// Check write access for entering `target`; notifies once on rejection
    fn guard_entry(&self, state: &WizardState, target: ModalStep) -> bool {
        if !target.requires_write_access() {
            return true;
        }
        let allowed = if target.requires_ownership() {
            self.owner_session(state).is_some()
        } else {
            self.signed_in_user().is_some()
        };
        if !allowed {
            self.deny();
        }
        allowed
    }

    // ---- state changes -------------------------------------------------------

    fn transition(&self, state: &mut WizardState, target: ModalStep) {
        if target.requires_record() && state.current_sneaker.is_none() {
            warn!("Cannot enter {} without a sneaker", target);
            return;
        }
        if self.guard_entry(state, target) {
            self.enter(state, target);
        }
    }

    fn enter(&self, state: &mut WizardState, target: ModalStep) {
        let leaving_view = state.step == ModalStep::View;
        match target {
            ModalStep::View => {
                if let Some(record) = state.current_sneaker.clone() {
                    state.draft = SneakerDraft::from_record(&record);
                }
                state.form.clear_all();
            }
            ModalStep::EditForm if leaving_view => {
                if let Some(record) = state.current_sneaker.as_ref() {
                    state.draft = SneakerDraft::from_record(record);
                }
                state.form.clear_all();
            }
            ModalStep::Sku | ModalStep::Barcode => state.form.clear(SneakerField::Sku),
            _ => {}
        }
        state.error_msg = None;
        state.step = target;
        debug!("Wizard step -> {}", target);
    }

    fn show_record(&self, state: &mut WizardState, record: SneakerRecord) {
        let siblings = self.deps.session.sneakers();
        let position = siblings.iter().position(|s| s.id == record.id);
        state.prev_sneaker = position
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| siblings.get(i).cloned());
        state.next_sneaker = position.and_then(|i| siblings.get(i + 1).cloned());
        state.current_sneaker = Some(record);
        self.enter(state, ModalStep::View);
    }

    fn require_images(&self, state: &mut WizardState, target: ModalStep) {
        if state.draft.images.is_empty() {
            let message = self.text(messages::IMAGES_REQUIRED);
            state.form.set_error(SneakerField::Images, message.clone());
            state.set_error(message);
            return;
        }
        state.form.clear(SneakerField::Images);
        self.transition(state, target);
    }

    fn prepare_lookup(&self, state: &mut WizardState, kind: LookupKind) -> Option<Pending> {
        if !self.guard_entry(state, ModalStep::AddFormImages) {
            return None;
        }
        Some(Pending::Lookup {
            kind,
            query: state.lookup_input.trim().to_string(),
        })
    }

    /// Validate the whole form; surfaces the message and returns false on failure
    fn validate_for_submit(&self, state: &mut WizardState) -> bool {
        let state = &mut *state;
        if state.form.on_submit(&self.schema, &state.draft) {
            state.error_msg = None;
            true
        } else {
            state.error_msg = state.form.surfaced_message();
            false
        }
    }

    fn prepare_create(&self, state: &mut WizardState) -> Option<Pending> {
        let Some(owner_id) = self.signed_in_user() else {
            self.deny();
            return None;
        };
        if !self.validate_for_submit(state) {
            return None;
        }
        Some(Pending::Create {
            owner_id,
            draft: state.draft.clone(),
        })
    }

    fn prepare_update(&self, state: &mut WizardState) -> Option<Pending> {
        let Some(actor_id) = self.owner_session(state) else {
            self.deny();
            return None;
        };
        let sneaker_id = state.current_sneaker.as_ref()?.id;
        if !self.validate_for_submit(state) {
            return None;
        }
        Some(Pending::Update {
            actor_id,
            sneaker_id,
            draft: state.draft.clone(),
        })
    }

    // ---- async work ------------------------------------------------------------

    async fn run(&self, pending: Pending, token: &CancellationToken) -> Completed {
        match pending {
            Pending::Lookup { kind, query } => {
                let result = tokio::select! {
                    _ = token.cancelled() => Err(AppError::cancelled("lookup")),
                    result = self.deps.lookup.lookup(kind, &query) => result.map_err(AppError::from),
                };
                Completed::Lookup(kind, result)
            }
            Pending::Create { owner_id, draft } => Completed::Saved {
                created: true,
                result: self.deps.sneakers.create(owner_id, &draft, token).await,
            },
            Pending::Update {
                actor_id,
                sneaker_id,
                draft,
            } => Completed::Saved {
                created: false,
                result: self
                    .deps
                    .sneakers
                    .update(actor_id, sneaker_id, &draft, token)
                    .await,
            },
            Pending::Delete {
                actor_id,
                sneaker_id,
            } => Completed::Deleted(self.deps.sneakers.delete(actor_id, sneaker_id).await),
        }
    }

    async fn complete(&self, generation: u64, completed: Completed) -> ModalStep {
        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            debug!("Dropping result for a closed wizard session");
            return state.step;
        }
        state.is_loading = false;

        match completed {
            Completed::Lookup(kind, result) => self.complete_lookup(&mut state, kind, result),
            Completed::Saved { created, result } => {
                self.complete_save(&mut state, created, result)
            }
            Completed::Deleted(result) => self.complete_delete(&mut state, result),
        }
        state.step
    }

    fn complete_lookup(
        &self,
        state: &mut WizardState,
        kind: LookupKind,
        result: AppResult<LookupOutcome>,
    ) {
        match result {
            Ok(LookupOutcome::MissingInput) => {
                let message = match kind {
                    LookupKind::Sku => self.text(messages::SKU_REQUIRED),
                    LookupKind::Barcode => self.text(messages::BARCODE_REQUIRED),
                };
                state.form.set_error(SneakerField::Sku, message.clone());
                state.set_error(message);
            }
            Ok(LookupOutcome::Found(fetched)) => {
                state.draft = SneakerDraft::from_fetched(fetched);
                state.form.clear_all();
                self.enter(state, ModalStep::AddFormImages);
            }
            Err(e) => {
                let message = user_message(&e);
                warn!("Lookup failed: {}", e);
                state.set_error(message.clone());
                self.notify(NotificationKind::Error, &message);
            }
        }
    }

    fn complete_save(
        &self,
        state: &mut WizardState,
        created: bool,
        result: AppResult<SneakerRecord>,
    ) {
        match result {
            Ok(record) => {
                self.deps.session.sneakers_changed();
                self.show_record(state, record);
                let message = if created {
                    self.text(messages::CREATED)
                } else {
                    self.text(messages::UPDATED)
                };
                self.notify(NotificationKind::Success, &message);
            }
            Err(e) => {
                warn!("Saving sneaker failed: {}", e);
                let message = match &e {
                    AppError::Validation { message } => message.clone(),
                    _ => format!("{}: {}", self.text(messages::SAVE_FAILED), user_message(&e)),
                };
                state.set_error(message.clone());
                self.notify(NotificationKind::Error, &message);
            }
        }
    }

    fn complete_delete(&self, state: &mut WizardState, result: AppResult<()>) {
        match result {
            Ok(()) => {
                self.deps.session.sneakers_changed();
                self.notify(NotificationKind::Success, &self.text(messages::DELETED));
                let sibling = state.next_sneaker.clone().or_else(|| state.prev_sneaker.clone());
                match sibling {
                    Some(record) => self.show_record(state, record),
                    None => state.reset(false),
                }
            }
            Err(e) => {
                warn!("Deleting sneaker failed: {}", e);
                let message = format!("{}: {}", self.text(messages::DELETE_FAILED), user_message(&e));
                state.set_error(message.clone());
                self.notify(NotificationKind::Error, &message);
            }
        }
    }
}

/// Inline/toast text for an error
fn user_message(error: &AppError) -> String {
    match error {
        AppError::Lookup(e) => e.to_string(),
        AppError::ImageUpload(e) => e.to_string(),
        AppError::Validation { message } => message.clone(),
        other => other.to_string(),
    }
}
