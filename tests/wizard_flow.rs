mod common;

use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

use common::*;
use sneaker_vault::models::{Brand, DraftEdit, Photo, SneakerDraft, SneakerField};
use sneaker_vault::repositories::{Repository, SneakerQuery};
use sneaker_vault::storage::ObjectStorage;
use sneaker_vault::wizard::{ModalStateMachine, ModalStep, NotificationKind};

async fn signed_in_harness() -> (Harness, Uuid) {
    let user = Uuid::new_v4();
    let h = harness(FakeSession::signed_in(user), ScriptedTransport::returning(patta_payload())).await;
    (h, user)
}

/// Index → sku → lookup → addFormImages
async fn look_up_patta(machine: &ModalStateMachine) {
    machine.open_for_create().await;
    assert_eq!(machine.next().await, ModalStep::Sku);
    assert_eq!(machine.search_sku(PATTA_SKU).await, ModalStep::AddFormImages);
}

#[tokio::test]
async fn test_next_from_index_goes_to_sku() {
    let (h, _) = signed_in_harness().await;
    h.machine.open_for_create().await;

    assert_eq!(h.machine.step().await, ModalStep::Index);
    assert_eq!(h.machine.next().await, ModalStep::Sku);
    assert_eq!(h.machine.back().await, ModalStep::Index);
    assert_eq!(h.machine.back().await, ModalStep::Index);
    assert!(!h.machine.is_open().await);
}

#[tokio::test]
async fn test_empty_sku_sets_required_error_without_lookup() {
    let (h, _) = signed_in_harness().await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    assert_eq!(h.machine.search_sku("   ").await, ModalStep::Sku);
    assert_eq!(
        h.machine.field_errors().await.get(&SneakerField::Sku).map(String::as_str),
        Some("SKU is required")
    );
    assert_eq!(h.machine.error_message().await.as_deref(), Some("SKU is required"));
    assert_eq!(h.transport.call_count(), 0);

    h.machine.set_sku_input(PATTA_SKU).await;
    assert!(h.machine.field_errors().await.is_empty());
}

#[tokio::test]
async fn test_sku_lookup_prefills_draft() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;

    let draft = h.machine.draft().await;
    assert_eq!(draft.brand, Some(Brand::Nike));
    assert_eq!(draft.model, "Air Max 1 Patta");
    assert_eq!(draft.sku, PATTA_SKU);
    assert_eq!(draft.estimated_value, Some(320.0));
    assert_eq!(draft.images, vec![Photo::pending(PATTA_IMAGE)]);
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_barcode_scan_prefills_draft() {
    let (h, _) = signed_in_harness().await;
    h.machine.open_for_create().await;

    assert_eq!(h.machine.start_barcode_scan().await, ModalStep::Barcode);
    assert_eq!(h.machine.submit_barcode("0194501234567").await, ModalStep::AddFormImages);
    assert_eq!(h.machine.draft().await.brand, Some(Brand::Nike));
}

#[tokio::test]
async fn test_images_required_before_details() {
    let (h, _) = signed_in_harness().await;
    h.machine.open_for_create().await;
    assert_eq!(h.machine.start_manual_entry().await, ModalStep::AddFormImages);

    assert_eq!(h.machine.next().await, ModalStep::AddFormImages);
    assert_eq!(
        h.machine.error_message().await.as_deref(),
        Some("At least one image is required")
    );

    h.machine.add_photo(Photo::pending("file:///dcim/patta.jpg")).await;
    assert_eq!(h.machine.error_message().await, None);
    assert_eq!(h.machine.next().await, ModalStep::AddFormDetails);
}

#[tokio::test]
async fn test_create_stores_images_and_shows_record() {
    let (h, user) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    assert_eq!(h.machine.next().await, ModalStep::AddFormDetails);

    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    assert_eq!(h.machine.next().await, ModalStep::View);

    let record = h.machine.current_sneaker().await.unwrap();
    assert_eq!(record.owner_id, user);
    assert_eq!(record.size_us, 9.0);
    assert_eq!(record.size_eu, 40.5);
    assert_eq!(record.condition, 8);
    assert_eq!(record.images.len(), 1);
    assert!(record.images[0].uri.starts_with(BASE_URL));
    assert!(record.images[0].id.starts_with(&format!("{}/{}/", user, record.id)));

    assert_eq!(h.notifier.count(NotificationKind::Success), 1);
    assert_eq!(
        h.notifier.last(),
        Some((NotificationKind::Success, "Sneaker added to your collection".to_string()))
    );
    assert_eq!(h.session.change_count(), 1);
    assert_eq!(h.store.count(SneakerQuery::new().owner(user)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_details_block_create() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;

    h.machine.set_field(DraftEdit::Condition("11".to_string())).await;
    assert!(h.machine.blur_field(SneakerField::Condition).await.is_some());
    assert_eq!(h.machine.next().await, ModalStep::AddFormDetails);

    let errors = h.machine.field_errors().await;
    assert!(errors.contains_key(&SneakerField::Size));
    assert!(errors.contains_key(&SneakerField::Condition));
    assert_eq!(
        h.machine.error_message().await.as_deref(),
        Some("Please correct the highlighted fields")
    );
    assert_eq!(h.store.count(SneakerQuery::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_decimal_condition_is_flagged_on_its_field() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;

    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("10.0".to_string())).await;
    assert_eq!(
        h.machine.blur_field(SneakerField::Condition).await.as_deref(),
        Some("Condition must be a whole number")
    );
    assert_eq!(h.machine.next().await, ModalStep::AddFormDetails);
    assert_eq!(
        h.machine.field_errors().await.get(&SneakerField::Condition).map(String::as_str),
        Some("Condition must be a whole number")
    );
    assert_eq!(h.store.count(SneakerQuery::new()).await.unwrap(), 0);

    h.machine.set_field(DraftEdit::Condition("10".to_string())).await;
    assert_eq!(h.machine.next().await, ModalStep::View);
    assert_eq!(h.machine.current_sneaker().await.unwrap().condition, 10);
}

#[tokio::test]
async fn test_anonymous_create_keeps_step_and_notifies_once() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;

    h.session.sign_out();
    assert_eq!(h.machine.next().await, ModalStep::AddFormDetails);

    assert_eq!(h.notifier.count(NotificationKind::Error), 1);
    assert_eq!(h.notifier.total(), 1);
    assert_eq!(h.store.count(SneakerQuery::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_anonymous_cannot_enter_add_flow() {
    let h = harness(FakeSession::anonymous(), ScriptedTransport::returning(patta_payload())).await;
    h.machine.open_for_create().await;

    assert_eq!(h.machine.start_manual_entry().await, ModalStep::Index);
    assert!(!h.machine.open_on_step(ModalStep::AddFormDetails).await);
    assert_eq!(h.notifier.count(NotificationKind::Error), 2);

    assert_eq!(h.machine.next().await, ModalStep::Sku);
    assert_eq!(h.machine.search_sku(PATTA_SKU).await, ModalStep::Sku);
    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(h.notifier.count(NotificationKind::Error), 3);
}

#[tokio::test]
async fn test_not_found_lookup_stays_on_sku() {
    let user = Uuid::new_v4();
    let h = harness(FakeSession::signed_in(user), ScriptedTransport::returning(json!([]))).await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    assert_eq!(h.machine.search_sku("XX0000-000").await, ModalStep::Sku);
    assert!(h.machine.error_message().await.unwrap().contains("XX0000-000"));
    assert_eq!(h.notifier.count(NotificationKind::Error), 1);
    assert!(!h.machine.is_loading().await);
}

#[tokio::test]
async fn test_untitled_lookup_result_stays_on_sku() {
    let user = Uuid::new_v4();
    let h = harness(FakeSession::signed_in(user), ScriptedTransport::returning(json!({}))).await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    assert_eq!(h.machine.search_sku(PATTA_SKU).await, ModalStep::Sku);
    assert!(h.machine.error_message().await.unwrap().contains(PATTA_SKU));
    assert_eq!(h.machine.draft().await, SneakerDraft::default());
}

#[tokio::test]
async fn test_jump_ignored_while_loading() {
    let user = Uuid::new_v4();
    let gate = Arc::new(Notify::new());
    let h = harness(
        FakeSession::signed_in(user),
        ScriptedTransport::gated(patta_payload(), gate.clone()),
    )
    .await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    let machine = h.machine.clone();
    let search = tokio::spawn(async move { machine.search_sku(PATTA_SKU).await });
    wait_until_loading(&h.machine).await;

    assert!(!h.machine.open_on_step(ModalStep::Index).await);
    assert!(!h.machine.open_on_step(ModalStep::AddFormDetails).await);
    assert_eq!(h.machine.step().await, ModalStep::Sku);

    gate.notify_one();
    assert_eq!(search.await.unwrap(), ModalStep::AddFormImages);
    assert!(h.machine.open_on_step(ModalStep::Index).await);
}

#[tokio::test]
async fn test_edits_after_close_are_ignored() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.close().await;

    h.machine.set_field(DraftEdit::Model("Air Force 1".to_string())).await;
    h.machine.set_sku_input(PATTA_SKU).await;
    h.machine.add_photo(Photo::pending("file:///dcim/patta.jpg")).await;
    assert!(h.machine.remove_photo(0).await.is_none());
    assert!(h.machine.blur_field(SneakerField::Model).await.is_none());

    let snapshot = h.machine.snapshot().await;
    assert!(!snapshot.open);
    assert_eq!(snapshot.draft, SneakerDraft::default());
    assert!(snapshot.field_errors.is_empty());
}

#[tokio::test]
async fn test_navigation_ignored_while_loading() {
    let user = Uuid::new_v4();
    let gate = Arc::new(Notify::new());
    let h = harness(
        FakeSession::signed_in(user),
        ScriptedTransport::gated(patta_payload(), gate.clone()),
    )
    .await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    let machine = h.machine.clone();
    let search = tokio::spawn(async move { machine.search_sku(PATTA_SKU).await });
    wait_until_loading(&h.machine).await;

    assert_eq!(h.machine.next().await, ModalStep::Sku);
    assert_eq!(h.machine.back().await, ModalStep::Sku);
    assert_eq!(h.machine.search_sku(PATTA_SKU).await, ModalStep::Sku);
    assert_eq!(h.transport.call_count(), 1);

    gate.notify_one();
    assert_eq!(search.await.unwrap(), ModalStep::AddFormImages);
    assert!(!h.machine.is_loading().await);
}

#[tokio::test]
async fn test_close_drops_late_lookup_result() {
    let user = Uuid::new_v4();
    let gate = Arc::new(Notify::new());
    let h = harness(
        FakeSession::signed_in(user),
        ScriptedTransport::gated(patta_payload(), gate.clone()),
    )
    .await;
    h.machine.open_for_create().await;
    h.machine.next().await;

    let machine = h.machine.clone();
    let search = tokio::spawn(async move { machine.search_sku(PATTA_SKU).await });
    wait_until_loading(&h.machine).await;

    h.machine.close().await;
    gate.notify_one();
    search.await.unwrap();

    let snapshot = h.machine.snapshot().await;
    assert!(!snapshot.open);
    assert_eq!(snapshot.step, ModalStep::Index);
    assert_eq!(snapshot.draft, SneakerDraft::default());
    assert!(!snapshot.is_loading);
    assert_eq!(h.notifier.total(), 0);
}

#[tokio::test]
async fn test_edit_then_back_discards_changes() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    h.machine.next().await;

    assert_eq!(h.machine.start_edit().await, ModalStep::EditForm);
    h.machine
        .set_field(DraftEdit::Model("Air Max 1 Patta Waves".to_string()))
        .await;
    assert_eq!(h.machine.back().await, ModalStep::View);
    assert_eq!(h.machine.draft().await.model, "Air Max 1 Patta");
}

#[tokio::test]
async fn test_update_keeps_stored_images() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    h.machine.next().await;
    let created = h.machine.current_sneaker().await.unwrap();

    h.machine.start_edit().await;
    h.machine.set_deadstock(true).await;
    assert_eq!(h.machine.next().await, ModalStep::View);

    let updated = h.machine.current_sneaker().await.unwrap();
    assert_eq!(updated.id, created.id);
    assert!(updated.ds);
    assert_eq!(updated.condition, 10);
    assert_eq!(updated.images, created.images);
    assert_eq!(h.notifier.count(NotificationKind::Success), 2);
    assert_eq!(
        h.notifier.last(),
        Some((NotificationKind::Success, "Sneaker updated".to_string()))
    );
}

#[tokio::test]
async fn test_other_user_cannot_edit() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    h.machine.next().await;

    *h.session.user.lock().unwrap() = Some(Uuid::new_v4());
    assert_eq!(h.machine.start_edit().await, ModalStep::View);
    assert_eq!(h.machine.delete_current().await, ModalStep::View);
    assert_eq!(h.notifier.count(NotificationKind::Error), 2);
}

#[tokio::test]
async fn test_delete_closes_when_no_siblings() {
    let (h, user) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    h.machine.next().await;
    let record = h.machine.current_sneaker().await.unwrap();

    h.machine.delete_current().await;

    assert!(!h.machine.is_open().await);
    assert!(h.store.find_by_id(record.id).await.unwrap().is_none());
    assert_eq!(h.store.count(SneakerQuery::new().owner(user)).await.unwrap(), 0);
    assert_eq!(
        h.notifier.last().map(|(kind, _)| kind),
        Some(NotificationKind::Success)
    );
    assert!(h
        .storage
        .list(&format!("{}/{}", user, record.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_view_browses_between_siblings() {
    let (h, _) = signed_in_harness().await;
    let mut records = Vec::new();
    for _ in 0..2 {
        look_up_patta(&h.machine).await;
        h.machine.next().await;
        h.machine.set_field(DraftEdit::Size("9".to_string())).await;
        h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
        h.machine.next().await;
        records.push(h.machine.current_sneaker().await.unwrap());
    }
    h.session.set_sneakers(records.clone());

    h.machine.open_on_record(records[0].clone()).await;
    assert!(h.machine.snapshot().await.has_next);
    assert_eq!(h.machine.next().await, ModalStep::View);
    assert_eq!(h.machine.current_sneaker().await.map(|s| s.id), Some(records[1].id));

    assert_eq!(h.machine.back().await, ModalStep::View);
    assert_eq!(h.machine.current_sneaker().await.map(|s| s.id), Some(records[0].id));

    h.machine.back().await;
    assert!(!h.machine.is_open().await);
}

#[tokio::test]
async fn test_edit_images_requires_one_photo() {
    let (h, _) = signed_in_harness().await;
    look_up_patta(&h.machine).await;
    h.machine.next().await;
    h.machine.set_field(DraftEdit::Size("9".to_string())).await;
    h.machine.set_field(DraftEdit::Condition("8".to_string())).await;
    h.machine.next().await;

    h.machine.start_edit().await;
    assert_eq!(h.machine.edit_images().await, ModalStep::EditFormImages);
    assert!(h.machine.remove_photo(0).await.is_some());
    assert!(h.machine.remove_photo(0).await.is_none());

    assert_eq!(h.machine.next().await, ModalStep::EditFormImages);
    assert!(h
        .machine
        .field_errors()
        .await
        .contains_key(&SneakerField::Images));

    h.machine.add_photo(Photo::pending("file:///dcim/patta.jpg")).await;
    assert_eq!(h.machine.next().await, ModalStep::EditForm);
    assert_eq!(h.machine.next().await, ModalStep::View);
    assert_eq!(h.machine.current_sneaker().await.unwrap().images.len(), 1);
}
