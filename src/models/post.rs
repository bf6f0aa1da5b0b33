//! Post data structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder image for posts without a featured image.
pub const DEFAULT_FEATURED_IMAGE: &str = "/images/default-post.jpg";

/// Placeholder read time for posts without one.
pub const DEFAULT_READ_TIME: &str = "5 min read";

/// A blog post derived from one spreadsheet row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Opaque identifier (not guaranteed unique by the source)
    pub id: String,

    /// Post title
    pub title: String,

    /// URL slug, matched case-sensitively
    pub slug: String,

    /// Author display name
    pub author: String,

    /// Publication date, usually `YYYY-MM-DD`
    pub date: String,

    /// Short summary for listings
    pub excerpt: String,

    /// Markdown body
    pub content: String,

    /// Categories with their source casing
    #[serde(default)]
    pub categories: Vec<String>,

    /// Featured image URL or path
    #[serde(default = "default_featured_image")]
    pub featured_image: String,

    /// Human-readable read time
    pub read_time: String,

    /// Highlight on the home page
    #[serde(default)]
    pub featured: bool,

    /// Publish gate; `false` rows are drafts
    #[serde(default)]
    pub load: bool,
}

fn default_featured_image() -> String {
    DEFAULT_FEATURED_IMAGE.to_string()
}

impl Post {
    /// Placeholder substituted for a row that failed to decode.
    pub fn error_post(today: NaiveDate) -> Self {
        Self {
            id: "0".to_string(),
            title: "Error Post".to_string(),
            slug: "error-post".to_string(),
            author: "System".to_string(),
            date: today.format("%Y-%m-%d").to_string(),
            excerpt: "There was an error loading this post".to_string(),
            content: "There was an error loading this post content".to_string(),
            categories: vec!["error".to_string()],
            featured_image: "/images/error-post.jpg".to_string(),
            read_time: "0 min read".to_string(),
            featured: false,
            load: false,
        }
    }

    /// Whether this is the placeholder for a failed row.
    pub fn is_error_post(&self) -> bool {
        !self.load && self.slug == "error-post" && self.categories == ["error"]
    }

    /// Case-insensitive category membership.
    pub fn has_category(&self, category: &str) -> bool {
        let wanted = category.trim().to_lowercase();
        self.categories
            .iter()
            .any(|c| c.trim().to_lowercase() == wanted)
    }

    /// Parsed publication date, if the date string is recognizable.
    ///
    /// Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn published_on(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
    }

    /// Format post for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{slug}`, `{author}`, `{date}`
    /// - `{read_time}`, `{categories}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{title}", &self.title)
            .replace("{slug}", &self.slug)
            .replace("{author}", &self.author)
            .replace("{date}", &self.date)
            .replace("{read_time}", &self.read_time)
            .replace("{categories}", &self.categories.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: "7".to_string(),
            title: "Test Title".to_string(),
            slug: "test-title".to_string(),
            author: "Jane".to_string(),
            date: "2024-01-01".to_string(),
            excerpt: String::new(),
            content: String::new(),
            categories: vec!["Rust".to_string(), " Web ".to_string()],
            featured_image: DEFAULT_FEATURED_IMAGE.to_string(),
            read_time: DEFAULT_READ_TIME.to_string(),
            featured: false,
            load: true,
        }
    }

    #[test]
    fn test_format() {
        let post = sample_post();
        let result = post.format("[{date}] {title} by {author}");
        assert_eq!(result, "[2024-01-01] Test Title by Jane");
    }

    #[test]
    fn test_has_category_ignores_case_and_whitespace() {
        let post = sample_post();
        assert!(post.has_category("rust"));
        assert!(post.has_category("WEB"));
        assert!(!post.has_category("go"));
    }

    #[test]
    fn test_published_on() {
        let mut post = sample_post();
        assert_eq!(post.published_on(), NaiveDate::from_ymd_opt(2024, 1, 1));

        post.date = "2024-03-05T10:00:00Z".to_string();
        assert_eq!(post.published_on(), NaiveDate::from_ymd_opt(2024, 3, 5));

        post.date = "soon".to_string();
        assert_eq!(post.published_on(), None);
    }

    #[test]
    fn test_serializes_with_source_field_names() {
        let json = serde_json::to_value(sample_post()).unwrap();
        assert_eq!(json["readTime"], "5 min read");
        assert_eq!(json["featuredImage"], DEFAULT_FEATURED_IMAGE);
    }

    #[test]
    fn test_error_post_is_hidden() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let post = Post::error_post(today);
        assert!(!post.load);
        assert!(post.is_error_post());
        assert_eq!(post.categories, vec!["error"]);
        assert_eq!(post.date, "2026-02-01");
    }
}
