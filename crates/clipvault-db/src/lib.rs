//! Clipvault Database Library
//!
//! Video metadata persistence: the `VideoRepository` seam, its PostgreSQL
//! implementation and an in-memory implementation for development and tests.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};
