#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;
use uuid::Uuid;

use sneaker_vault::config::LookupConfig;
use sneaker_vault::database::Database;
use sneaker_vault::errors::{ImageUploadError, LookupResult, StorageError, StorageResult};
use sneaker_vault::lookup::{ExternalLookupClient, LookupResponse, LookupTransport};
use sneaker_vault::models::SneakerRecord;
use sneaker_vault::repositories::SqliteSneakerStore;
use sneaker_vault::services::{ImagePipeline, SneakerRepository};
use sneaker_vault::storage::{ImageSource, LocalObjectStorage, ObjectStorage};
use sneaker_vault::wizard::{
    ModalStateMachine, NotificationKind, Notifier, SessionProvider, StaticLocalizer, WizardDeps,
};

pub const BASE_URL: &str = "http://localhost:8080/storage/sneakers";
pub const PATTA_SKU: &str = "DQ0299-100";
pub const PATTA_IMAGE: &str = "https://img.test/patta-1.jpg";
pub const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

pub fn patta_payload() -> Value {
    json!([{
        "title": "Nike Air Max 1 Patta",
        "brand": "Nike",
        "sku": PATTA_SKU,
        "gender": "men",
        "estimatedMarketValue": 320.0,
        "gallery": [PATTA_IMAGE, "https://img.test/patta-2.jpg"]
    }])
}

// ---- session ---------------------------------------------------------------

pub struct FakeSession {
    pub user: Mutex<Option<Uuid>>,
    pub sneakers: Mutex<Vec<SneakerRecord>>,
    pub changes: AtomicUsize,
}

impl FakeSession {
    pub fn signed_in(user: Uuid) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(user)),
            sneakers: Mutex::new(Vec::new()),
            changes: AtomicUsize::new(0),
        })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(None),
            sneakers: Mutex::new(Vec::new()),
            changes: AtomicUsize::new(0),
        })
    }

    pub fn sign_out(&self) {
        *self.user.lock().unwrap() = None;
    }

    pub fn set_sneakers(&self, sneakers: Vec<SneakerRecord>) {
        *self.sneakers.lock().unwrap() = sneakers;
    }

    pub fn change_count(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }
}

impl SessionProvider for FakeSession {
    fn current_user(&self) -> Option<Uuid> {
        *self.user.lock().unwrap()
    }

    fn sneakers(&self) -> Vec<SneakerRecord> {
        self.sneakers.lock().unwrap().clone()
    }

    fn sneakers_changed(&self) {
        self.changes.fetch_add(1, Ordering::SeqCst);
    }
}

// ---- notifications ---------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn total(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(NotificationKind, String)> {
        self.events.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.events.lock().unwrap().push((kind, message.to_string()));
    }
}

// ---- lookup transport ------------------------------------------------------

/// Returns the same data for every call; optionally waits for `release`
pub struct ScriptedTransport {
    data: Value,
    gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn returning(data: Value) -> Arc<Self> {
        Arc::new(Self {
            data,
            gate: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn gated(data: Value, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            data,
            gate: Some(gate),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupTransport for ScriptedTransport {
    async fn invoke(&self, _function_name: &str, _payload: Value) -> LookupResult<LookupResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(LookupResponse::data(self.data.clone()))
    }
}

// ---- image bytes and storage -------------------------------------------------

#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with(mut self, uri: &str, bytes: &[u8]) -> Self {
        self.files.insert(uri.to_string(), bytes.to_vec());
        self
    }

    fn get(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| ImageUploadError::Download {
                url: uri.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }
}

#[async_trait]
impl ImageSource for MemorySource {
    async fn read_local(&self, uri: &str) -> Result<Vec<u8>, ImageUploadError> {
        self.get(uri)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageUploadError> {
        self.get(url)
    }
}

/// Storage that rejects every upload
pub struct FailingStorage;

#[async_trait]
impl ObjectStorage for FailingStorage {
    async fn upload(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::Request {
            message: "bucket unavailable".to_string(),
        })
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn remove(&self, _paths: &[String]) -> StorageResult<()> {
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", BASE_URL, path)
    }

    fn key_for_url(&self, _url: &str) -> Option<String> {
        None
    }
}

/// Local storage whose list and remove calls always fail
pub struct StuckStorage {
    inner: LocalObjectStorage,
}

impl StuckStorage {
    pub fn new(inner: LocalObjectStorage) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ObjectStorage for StuckStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.inner.upload(path, bytes, content_type).await
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
        Err(StorageError::Request {
            message: "list timed out".to_string(),
        })
    }

    async fn remove(&self, _paths: &[String]) -> StorageResult<()> {
        Err(StorageError::Request {
            message: "remove timed out".to_string(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        self.inner.key_for_url(url)
    }
}

pub fn default_source() -> MemorySource {
    MemorySource::default()
        .with(PATTA_IMAGE, &JPEG)
        .with("file:///dcim/patta.jpg", &JPEG)
}

// ---- wiring ----------------------------------------------------------------

pub async fn sneaker_store() -> (Database, Arc<SqliteSneakerStore>) {
    let database = Database::in_memory().await.unwrap();
    database.migrate().await.unwrap();
    let store = Arc::new(SqliteSneakerStore::new(database.pool()));
    (database, store)
}

pub struct Harness {
    pub machine: ModalStateMachine,
    pub session: Arc<FakeSession>,
    pub notifier: Arc<RecordingNotifier>,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<SqliteSneakerStore>,
    pub storage: Arc<dyn ObjectStorage>,
    _database: Database,
    _dir: TempDir,
}

pub async fn harness(session: Arc<FakeSession>, transport: Arc<ScriptedTransport>) -> Harness {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(dir.path(), BASE_URL));
    harness_with_storage(session, transport, storage, dir).await
}

pub async fn harness_with_storage(
    session: Arc<FakeSession>,
    transport: Arc<ScriptedTransport>,
    storage: Arc<dyn ObjectStorage>,
    dir: TempDir,
) -> Harness {
    let (database, store) = sneaker_store().await;
    let pipeline = ImagePipeline::new(storage.clone(), Arc::new(default_source()));
    let repository = SneakerRepository::new(store.clone(), pipeline);

    let notifier = Arc::new(RecordingNotifier::default());
    let deps = WizardDeps {
        session: session.clone(),
        notifier: notifier.clone(),
        localizer: Arc::new(StaticLocalizer::new()),
        lookup: ExternalLookupClient::new(transport.clone(), &LookupConfig::default()),
        sneakers: Arc::new(repository),
    };

    Harness {
        machine: ModalStateMachine::new(deps),
        session,
        notifier,
        transport,
        store,
        storage,
        _database: database,
        _dir: dir,
    }
}

/// Wait until the machine reports in-flight work
pub async fn wait_until_loading(machine: &ModalStateMachine) {
    for _ in 0..1000 {
        if machine.is_loading().await {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("wizard never started loading");
}
