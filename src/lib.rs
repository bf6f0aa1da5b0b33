// src/lib.rs

//! Postsheet Library
//!
//! Loads blog posts from a published spreadsheet CSV, falls back to a bundled
//! CSV file and then to sample posts, and serves the result to subscribers.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{Config, Post};
pub use pipeline::BlogPipeline;
