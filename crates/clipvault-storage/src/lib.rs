//! Clipvault Storage Library
//!
//! Storage abstraction and its S3 and local filesystem implementations.
//!
//! # Object key format
//!
//! Uploaded videos live under `<category>/<token>.<ext>`, where `category` is
//! the orientation bucket (`wide`, `tall`, `other`) and `token` is 32 random
//! bytes encoded as URL-safe base64 without padding. Keys never contain `..`
//! or a leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipvault_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use factory::create_local_storage;
pub use factory::create_storage;
pub use keys::{ObjectKey, RandomToken};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
