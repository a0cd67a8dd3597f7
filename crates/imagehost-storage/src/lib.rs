//! Imagehost storage library
//!
//! Content-addressed persistence for uploaded images: the `ContentStore`
//! trait, local-filesystem and S3 backends, and the deduplicating write
//! layer that makes the existence-check-then-write pair race-safe.
//!
//! # Key format
//!
//! Object keys are `{ripemd160(bytes)}.{extension}` — a pure function of
//! content and declared format, never of the uploading identity, so
//! byte-identical uploads from any account collapse to one stored object.

pub mod dedup;
pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use dedup::{DedupStore, StoredObject};
pub use factory::create_store;
pub use keys::{content_hash, object_key};
pub use local::LocalStore;
pub use s3::S3Store;
pub use traits::{ContentStore, StorageError, StorageResult};
