// src/models/mod.rs

//! Domain models for the post pipeline.

mod config;
mod post;

// Re-export all public types
pub use config::{CacheConfig, Config, LastResort, LoggingConfig, SourceConfig};
pub use post::{DEFAULT_FEATURED_IMAGE, DEFAULT_READ_TIME, Post};
