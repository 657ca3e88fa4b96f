//! Data models shared across the application

mod video;

pub use video::*;
