//! Key-value persistence backends for client-side state.
//!
//! This module provides:
//! - `StorageBackend`: the trait every backend implements
//! - `MemoryBackend`: process-lifetime storage (the tab-scoped backend)
//! - `FileBackend`: a JSON file on disk (the durable backend)
//! - `KeyringBackend`: OS keychain entries (alternative durable backend)
//!
//! Backends are shared behind `Arc<dyn StorageBackend>` and hold plain
//! strings; callers own the encoding of structured values.

pub mod file;
pub mod keychain;
pub mod memory;

use anyhow::Result;

pub use file::FileBackend;
pub use keychain::KeyringBackend;
pub use memory::MemoryBackend;

/// Key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Key holding the token expiry as RFC 3339
pub const TOKEN_EXPIRY_KEY: &str = "tokenExpiry";

/// Key holding "true" when the signed-in user has the admin role
pub const IS_ADMIN_KEY: &str = "isAdmin";

/// Key holding the JSON snapshot of the product being checked out
pub const ORDER_PRODUCT_KEY: &str = "orderProduct";

/// Key holding the quantity being checked out
pub const ORDER_QUANTITY_KEY: &str = "orderQuantity";

pub trait StorageBackend: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
