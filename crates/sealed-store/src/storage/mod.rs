//! Raw store backends
//!
//! This module provides three backends behind [`RawStore`]:
//! 1. In-memory (tests and ephemeral use)
//! 2. JSON file (native hosts)
//! 3. Browser `localStorage` (feature `web`, wasm32 only)

mod entries;
#[cfg(not(target_arch = "wasm32"))]
mod file;
mod memory;
mod traits;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::RawStore;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::LocalStorage;
