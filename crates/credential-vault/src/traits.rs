//! Storage trait definitions.

use crate::VaultResult;

/// Trait for key/value storage backends.
pub trait VaultStorage: Send + Sync {
    /// Store a value.
    fn set(&self, key: &str, value: &str) -> VaultResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> VaultResult<Option<String>>;

    /// Delete a value. Returns true if the key existed.
    fn delete(&self, key: &str) -> VaultResult<bool>;

    /// Check if a key exists.
    fn has(&self, key: &str) -> VaultResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
