//! Durable storage for the Pantry recipe collection.
//!
//! Storage is split in two layers:
//!
//! - [`BlobStore`]: an async key-value store of opaque byte blobs. Backends
//!   never interpret what they hold.
//!   - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!   - [`FileBlobStore`] -- one JSON file per key under a data directory
//! - [`RecipeStorage`]: the persistence adapter. It owns the wire encoding of
//!   the whole recipe collection under a single key and implements the
//!   load/save/clear contract on top of any [`BlobStore`].
//!
//! # Design Rules
//!
//! 1. The collection is always written whole, as a single blob.
//! 2. An unreadable or undecodable record loads as "absent"; the failure is
//!    logged and never reaches the caller.
//! 3. Save failures are returned to the caller.
//! 4. Clear is best-effort; failures are logged and swallowed.

pub mod adapter;
pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use adapter::{RecipeStorage, DEFAULT_STORAGE_KEY};
pub use codec::{decode_collection, encode_collection, CURRENT_SCHEMA_VERSION};
pub use error::{StorageError, StorageResult};
pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
