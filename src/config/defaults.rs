/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./sneaker-vault.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Storage defaults
pub const DEFAULT_STORAGE_ROOT: &str = "./data/sneakers";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/storage/sneakers";

// Lookup defaults
pub const DEFAULT_LOOKUP_BASE_URL: &str = "http://localhost:54321";
pub const DEFAULT_SKU_FUNCTION: &str = "sku-search";
pub const DEFAULT_BARCODE_FUNCTION: &str = "barcode-search";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;

// Image defaults
pub const DEFAULT_MAX_DOWNLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "sneaker-vault/0.1";
