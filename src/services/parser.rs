// src/services/parser.rs

//! CSV row parsing and normalization.
//!
//! Rows are decoded against a typed schema (`PostRow`) and normalized into
//! `Post`s. Decoding is fallible per row, but `parse_row` collapses any
//! failure into the sentinel error post so one bad row never aborts a batch.

use std::fmt;

use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder, Trim};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::error::{AppError, ParseError, Result};
use crate::models::{DEFAULT_FEATURED_IMAGE, DEFAULT_READ_TIME, Post};
use crate::utils::today;

/// Columns understood by the row schema.
pub const KNOWN_COLUMNS: &[&str] = &[
    "id",
    "title",
    "slug",
    "excerpt",
    "content",
    "author",
    "date",
    "readTime",
    "categories",
    "featuredImage",
    "featured",
    "load",
];

/// A boolean-like cell: a native boolean or any text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::Bool(value)
    }
}

impl From<&str> for Flag {
    fn from(value: &str) -> Self {
        Flag::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FlagVisitor;

        impl Visitor<'_> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Flag, E> {
                Ok(Flag::Bool(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Flag, E> {
                Ok(Flag::Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// Allow-list coercion shared by the `load` and `featured` columns.
///
/// Only `"TRUE"`, `"true"` and a native `true` are truthy.
pub fn coerce_bool(flag: &Flag) -> bool {
    match flag {
        Flag::Bool(b) => *b,
        Flag::Text(s) => s == "TRUE" || s == "true",
    }
}

/// One spreadsheet row as exported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "readTime")]
    pub read_time: Option<String>,
    /// Comma-separated list
    pub categories: Option<String>,
    #[serde(rename = "featuredImage")]
    pub featured_image: Option<String>,
    pub featured: Option<Flag>,
    pub load: Option<Flag>,
}

impl PostRow {
    /// Normalize into a post, filling defaults for missing cells.
    pub fn into_post(self, today: NaiveDate) -> Post {
        Post {
            load: self.load.as_ref().is_some_and(coerce_bool),
            featured: self.featured.as_ref().is_some_and(coerce_bool),
            id: text_or(self.id, "0"),
            title: text_or(self.title, "Untitled Post"),
            slug: text_or(self.slug, "untitled-post"),
            excerpt: text_or(self.excerpt, ""),
            content: text_or(self.content, ""),
            author: text_or(self.author, "Anonymous"),
            date: present(self.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            read_time: text_or(self.read_time, DEFAULT_READ_TIME),
            categories: split_categories(self.categories.as_deref().unwrap_or("")),
            featured_image: text_or(self.featured_image, DEFAULT_FEATURED_IMAGE),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn text_or(value: Option<String>, default: &str) -> String {
    present(value).unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated category cell, keeping source casing.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Decode one CSV record into a post.
pub fn decode_record(
    headers: &ByteRecord,
    record: csv::Result<ByteRecord>,
    row: u64,
    today: NaiveDate,
) -> std::result::Result<Post, ParseError> {
    let record = record.map_err(|e| ParseError::malformed(row, e))?;

    if record
        .iter()
        .all(|cell| cell.iter().all(u8::is_ascii_whitespace))
    {
        return Err(ParseError::Blank(row));
    }

    // Project onto the known columns so short rows, extra columns and
    // repeated headers all decode; a missing cell reads as empty.
    let columns = known_positions(headers);
    let names: ByteRecord = columns.iter().map(|(name, _)| name.as_bytes()).collect();
    let cells: ByteRecord = columns
        .iter()
        .map(|(_, i)| record.get(*i).unwrap_or_default())
        .collect();

    let raw: PostRow = cells
        .deserialize(Some(&names))
        .map_err(|e| ParseError::malformed(row, e))?;
    Ok(raw.into_post(today))
}

/// Position of each known column in `headers`; the first occurrence wins.
fn known_positions(headers: &ByteRecord) -> Vec<(&'static str, usize)> {
    KNOWN_COLUMNS
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .position(|h| h == name.as_bytes())
                .map(|i| (*name, i))
        })
        .collect()
}

/// Decode one CSV record, substituting the error post on failure.
pub fn parse_row(
    headers: &ByteRecord,
    record: csv::Result<ByteRecord>,
    row: u64,
    today: NaiveDate,
) -> Post {
    decode_record(headers, record, row, today).unwrap_or_else(|e| {
        log::warn!("Error parsing blog post data: {}", e);
        Post::error_post(today)
    })
}

/// Parse a whole CSV document into posts, one per data row.
///
/// `source` only labels errors. Fails when the header row has none of the
/// known columns or there are no data rows.
pub fn parse_batch(text: &str, source: &str) -> Result<Vec<Post>> {
    parse_batch_on(text, source, today())
}

/// Like [`parse_batch`] with an explicit date for defaulted rows.
pub fn parse_batch_on(text: &str, source: &str, today: NaiveDate) -> Result<Vec<Post>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.byte_headers()?.clone();
    if known_positions(&headers).is_empty() {
        log::warn!("CSV from {} has no recognized columns", source);
        return Err(AppError::NoRows(source.to_string()));
    }

    let posts: Vec<Post> = reader
        .byte_records()
        .zip(1u64..)
        .map(|(record, row)| parse_row(&headers, record, row, today))
        .collect();

    if posts.is_empty() {
        return Err(AppError::NoRows(source.to_string()));
    }
    Ok(posts)
}

/// Keep only posts cleared for publication.
pub fn filter_loadable(posts: Vec<Post>) -> Vec<Post> {
    posts.into_iter().filter(|p| p.load).collect()
}
