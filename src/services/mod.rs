//! Service layer for the post pipeline.
//!
//! This module contains the building blocks for:
//! - Source fetching (`HttpFetcher`, `PostSource`)
//! - Row decoding and normalization (`parser`)
//! - The bundled last-resort posts (`sample_posts`)

mod fetcher;
pub mod parser;
mod sample;

pub use fetcher::{HttpFetcher, PostSource};
pub use parser::{Flag, PostRow, coerce_bool, filter_loadable, parse_batch, parse_row};
pub use sample::sample_posts;
