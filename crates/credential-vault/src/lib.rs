//! Persisted credential storage for the userpool client.
//!
//! This crate provides the storage abstraction behind cold-start session
//! restoration: tokens issued by the identity provider are written here
//! so a later process can recover the signed-in identity without
//! re-entering credentials.
//!
//! Backends:
//! - [`FileStorage`]: JSON file under the client's base directory
//! - [`MemoryStorage`]: in-memory map, used by tests

mod file;
mod keys;
mod memory;
mod traits;
mod vault;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::VaultStorage;
pub use vault::{CredentialVault, SessionMeta};

use thiserror::Error;

/// Error type for vault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
