//! Inverted index for post search.
//!
//! Maps normalized keywords to the posts that contain them, so the blog index
//! can filter by free text without a search backend. Query tokens match
//! indexed tokens by prefix, which keeps type-ahead searches useful.

use std::collections::{BTreeSet, HashMap};

use unicode_segmentation::UnicodeSegmentation;

use crate::models::Post;

/// Configuration for index generation.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Minimum token length to include (default: 2)
    pub min_token_length: usize,
    /// Include categories and author alongside title and excerpt
    pub index_metadata: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_token_length: 2,
            index_metadata: true,
        }
    }
}

/// Searchable view over a set of posts.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    posts: Vec<Post>,
    /// keyword -> positions in `posts`
    index: HashMap<String, BTreeSet<usize>>,
    config: IndexConfig,
}

impl SearchIndex {
    /// Index posts with default configuration.
    pub fn build(posts: &[Post]) -> Self {
        Self::build_with(posts, IndexConfig::default())
    }

    /// Index posts with custom configuration.
    pub fn build_with(posts: &[Post], config: IndexConfig) -> Self {
        let mut index: HashMap<String, BTreeSet<usize>> = HashMap::new();

        for (position, post) in posts.iter().enumerate() {
            let mut tokens = tokenize(&post.title, &config);
            tokens.extend(tokenize(&post.excerpt, &config));
            if config.index_metadata {
                for category in &post.categories {
                    tokens.extend(tokenize(category, &config));
                }
                tokens.extend(tokenize(&post.author, &config));
            }

            for token in tokens {
                index.entry(token).or_default().insert(position);
            }
        }

        Self {
            posts: posts.to_vec(),
            index,
            config,
        }
    }

    /// Number of distinct indexed tokens.
    pub fn token_count(&self) -> usize {
        self.index.len()
    }

    /// Posts matching every token of `query`, in indexed order.
    ///
    /// A query with no usable tokens matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Post> {
        let terms = tokenize(query, &self.config);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut matched: Option<BTreeSet<usize>> = None;
        for term in &terms {
            let hits: BTreeSet<usize> = self
                .index
                .iter()
                .filter(|(token, _)| token.starts_with(term.as_str()))
                .flat_map(|(_, positions)| positions.iter().copied())
                .collect();

            matched = Some(match matched {
                Some(prev) => prev.intersection(&hits).copied().collect(),
                None => hits,
            });
        }

        matched
            .unwrap_or_default()
            .into_iter()
            .map(|i| &self.posts[i])
            .collect()
    }
}

/// Tokenize a string into normalized keywords.
fn tokenize(text: &str, config: &IndexConfig) -> Vec<String> {
    text.to_lowercase()
        .unicode_words()
        .filter(|word| word.chars().count() >= config.min_token_length)
        .filter(|word| !is_stopword(word))
        .map(String::from)
        .collect()
}

/// Check if a word is a common English stopword.
fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "the", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "must",
        "shall", "of", "to", "in", "for", "on", "with", "at", "by", "from", "as", "or", "and",
        "but", "if", "then", "so", "than",
    ];
    STOPWORDS.contains(&word)
}
