//! # sealed-store
//!
//! Encrypted key/value persistence over origin-scoped string stores:
//! - [`EncryptedStore`]: values encrypted on write, decrypted on read; keys in plaintext
//! - [`RawStore`] backends: in-memory, JSON file, browser `localStorage`
//! - [`Cipher`] capability with an AES-256-GCM implementation
//! - Configuration through callbacks, JSON sections or the environment
//!
//! `len`, `keys` and `clear` act on the whole origin namespace, including keys
//! that were not written through an [`EncryptedStore`].

pub mod cancel;
pub mod crypto;
pub mod error;
pub mod settings;
pub mod storage;
mod builder;
mod encrypted_store;

pub use builder::StoreBuilder;
pub use cancel::CancellationToken;
pub use crypto::{AesGcmCipher, Cipher, EncryptionKey};
pub use encrypted_store::EncryptedStore;
pub use error::{Result, StoreError};
pub use settings::{SerializeOptions, StoreOptions};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use storage::LocalStorage;
pub use storage::{MemoryStore, RawStore};
