// src/pipeline/view.rs

//! Read-only derivations over a published post set.
//!
//! These back the blog index and home page: date ordering, featured picks,
//! category filters with their counts, and free-text browsing.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Post;
use crate::pipeline::index::SearchIndex;

/// Name of the catch-all category selection.
pub const ALL: &str = "all";

/// Newest first. Posts with unrecognizable dates go last, in input order.
pub fn sort_by_date_desc(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| match (a.published_on(), b.published_on()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    posts
}

/// Featured posts, newest first, at most `limit`.
pub fn featured_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let featured = posts.iter().filter(|p| p.featured).cloned().collect();
    let mut featured = sort_by_date_desc(featured);
    featured.truncate(limit);
    featured
}

/// Lower-cased category name and post count, most used first.
pub fn category_counts(posts: &[Post]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for post in posts {
        for category in &post.categories {
            *counts.entry(category.to_lowercase()).or_default() += 1;
        }
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));
    counts
}

/// Category filter state of the blog index.
///
/// Either the single entry `all`, or a non-empty set of categories that a
/// post must all carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    selected: Vec<String>,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self {
            selected: vec![ALL.to_string()],
        }
    }
}

impl CategorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit list; an empty list means `all`.
    pub fn of<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::default();
        for category in categories {
            let category = category.as_ref();
            if !selection.contains(category) {
                selection.toggle(category);
            }
        }
        selection
    }

    /// Toggle a category the way the index page buttons do.
    ///
    /// `all` resets the selection; any other name is added or removed, and
    /// removing the last one falls back to `all`.
    pub fn toggle(&mut self, category: &str) {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return;
        }
        if category == ALL {
            *self = Self::default();
            return;
        }

        if let Some(pos) = self.selected.iter().position(|c| *c == category) {
            self.selected.remove(pos);
        } else {
            self.selected.retain(|c| c != ALL);
            self.selected.push(category);
        }

        if self.selected.is_empty() {
            *self = Self::default();
        }
    }

    pub fn is_all(&self) -> bool {
        self.selected.iter().any(|c| c == ALL)
    }

    pub fn contains(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        self.selected.iter().any(|c| *c == category)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Whether a post carries every selected category.
    pub fn matches(&self, post: &Post) -> bool {
        self.is_all() || self.selected.iter().all(|c| post.has_category(c))
    }
}

/// The blog index listing: search when `query` is non-blank, otherwise the
/// category filter; newest first either way.
pub fn browse(posts: &[Post], query: &str, selection: &CategorySelection) -> Vec<Post> {
    let found: Vec<Post> = if query.trim().is_empty() {
        posts.iter().filter(|p| selection.matches(p)).cloned().collect()
    } else {
        SearchIndex::build(posts)
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    };
    sort_by_date_desc(found)
}
