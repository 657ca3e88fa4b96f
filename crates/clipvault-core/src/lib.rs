//! Clipvault Core Library
//!
//! This crate provides the domain model, error types and configuration shared
//! by every Clipvault component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LocationMode, StorageConfig, VideoConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
