use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;

/// Trait abstraction for the host platform's key-value storage (SOLID: Dependency Inversion).
///
/// Values are JSON strings. A missing key is a normal condition: `get`
/// simply leaves it out of the returned map.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KeyValueStorage: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the values stored under `keys`. Absent keys are omitted.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, CoreError>;

    /// Store every entry, replacing existing values.
    async fn set(&self, entries: HashMap<String, String>) -> Result<(), CoreError>;

    /// Delete the given keys. Deleting an absent key is not an error.
    async fn remove(&self, keys: &[&str]) -> Result<(), CoreError>;
}
