// src/pipeline/load.rs

//! Post loading pipeline.
//!
//! fetch (primary, then fallback once) → parse → filter loadable → publish.
//! The public entry points never fail: total source exhaustion yields the
//! configured last-resort set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::{AppError, Result};
use crate::models::{Config, LastResort, Post, SourceConfig};
use crate::pipeline::events::{PostEvents, Subscription};
use crate::services::{HttpFetcher, PostSource, filter_loadable, parse_batch, sample_posts};
use crate::storage::{LocalStorage, PostCache};

type FetchOutcome = std::result::Result<String, Arc<AppError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// The content ingestion pipeline.
pub struct BlogPipeline {
    source: Arc<dyn PostSource>,
    primary_url: String,
    fallback_url: String,
    last_resort: LastResort,
    events: PostEvents,
    cache: Option<PostCache>,
    in_flight: Mutex<HashMap<String, SharedFetch>>,
}

impl BlogPipeline {
    /// Build a pipeline with an HTTP fetcher and a file-backed cache.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.sources)?;
        let store = Arc::new(LocalStorage::new(&config.cache.dir));

        Ok(Self::with_source(Arc::new(fetcher), &config.sources)
            .with_cache(PostCache::from_config(store, &config.cache)))
    }

    /// Build a pipeline over any source, without a cache.
    pub fn with_source(source: Arc<dyn PostSource>, sources: &SourceConfig) -> Self {
        Self {
            source,
            primary_url: sources.primary_url.clone(),
            fallback_url: sources.fallback_url.clone(),
            last_resort: sources.last_resort,
            events: PostEvents::new(),
            cache: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a snapshot cache.
    pub fn with_cache(mut self, cache: PostCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use an existing event bus instead of a private one.
    pub fn with_events(mut self, events: PostEvents) -> Self {
        self.events = events;
        self
    }

    /// The event bus this pipeline publishes to.
    pub fn events(&self) -> &PostEvents {
        &self.events
    }

    /// The attached cache, if any.
    pub fn cache(&self) -> Option<&PostCache> {
        self.cache.as_ref()
    }

    /// Register for every successfully parsed post set.
    pub fn subscribe_to_post_updates<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[Post]) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Load the published posts from the sources.
    pub async fn load_blog_posts(&self) -> Vec<Post> {
        match self.load_from_sources().await {
            Some(posts) => posts,
            None => self.last_resort_posts(),
        }
    }

    /// Find a published post by exact, case-sensitive slug.
    pub async fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        self.load_blog_posts()
            .await
            .into_iter()
            .find(|p| p.slug == slug)
    }

    /// Serve a fresh cached snapshot, or load and cache.
    ///
    /// Last-resort results are returned but never cached.
    pub async fn load_cached(&self) -> Vec<Post> {
        if let Some(posts) = self.cached().await {
            log::debug!("Serving {} posts from cache", posts.len());
            return posts;
        }
        self.refresh().await
    }

    /// Load from the sources, bypassing and then rewriting the cache.
    pub async fn refresh(&self) -> Vec<Post> {
        match self.load_from_sources().await {
            Some(posts) => {
                if let Some(cache) = &self.cache {
                    if !posts.is_empty() {
                        cache.set(&posts).await;
                    }
                }
                posts
            }
            None => self.last_resort_posts(),
        }
    }

    async fn cached(&self) -> Option<Vec<Post>> {
        match &self.cache {
            Some(cache) => cache.get().await,
            None => None,
        }
    }

    /// Primary, then fallback once. `None` when both fail.
    async fn load_from_sources(&self) -> Option<Vec<Post>> {
        match self.load_source(&self.primary_url).await {
            Ok(posts) => return Some(posts),
            Err(e) if e.is_transport() => log::warn!("Primary source unreachable: {}", e),
            Err(e) => log::error!("Error loading posts from primary source: {}", e),
        }

        match self.load_source(&self.fallback_url).await {
            Ok(posts) => Some(posts),
            Err(e) => {
                log::error!(
                    "All data sources failed, returning {:?} last-resort posts: {}",
                    self.last_resort,
                    e
                );
                None
            }
        }
    }

    async fn load_source(&self, location: &str) -> std::result::Result<Vec<Post>, Arc<AppError>> {
        let text = self.fetch_coalesced(location).await?;
        let all = parse_batch(&text, location).map_err(Arc::new)?;

        let total = all.len();
        let errors = all.iter().filter(|p| p.is_error_post()).count();
        let posts = filter_loadable(all);
        log::info!(
            "Loaded {} of {} posts from {} ({} malformed rows)",
            posts.len(),
            total,
            location,
            errors
        );

        self.events.publish(&posts);
        Ok(posts)
    }

    /// Fetch `location`, joining an identical fetch already in flight.
    async fn fetch_coalesced(&self, location: &str) -> FetchOutcome {
        let fetch = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(location) {
                Some(fetch) => {
                    log::debug!("Joining in-flight fetch of {}", location);
                    fetch.clone()
                }
                None => {
                    let source = Arc::clone(&self.source);
                    let owned = location.to_string();
                    let fetch = async move { source.fetch_source(&owned).await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    in_flight.insert(location.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let outcome = fetch.clone().await;

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(location).is_some_and(|f| f.ptr_eq(&fetch)) {
            in_flight.remove(location);
        }
        outcome
    }

    fn last_resort_posts(&self) -> Vec<Post> {
        match self.last_resort {
            LastResort::Sample => filter_loadable(sample_posts()),
            LastResort::Empty => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStorage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PRIMARY: &str = "https://sheets.example.com/posts.csv";
    const FALLBACK: &str = "data/fallbackPosts.csv";

    /// In-memory source keyed by location; missing keys fail.
    #[derive(Default)]
    struct StubSource {
        bodies: HashMap<String, String>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl StubSource {
        fn with(mut self, location: &str, body: &str) -> Self {
            self.bodies.insert(location.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl PostSource for StubSource {
        async fn fetch_source(&self, location: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.bodies
                .get(location)
                .cloned()
                .ok_or_else(|| AppError::status(location, 503))
        }
    }

    fn sources(last_resort: LastResort) -> SourceConfig {
        SourceConfig {
            primary_url: PRIMARY.to_string(),
            fallback_url: FALLBACK.to_string(),
            last_resort,
            ..SourceConfig::default()
        }
    }

    fn stub_pipeline(source: StubSource) -> (Arc<StubSource>, BlogPipeline) {
        let source = Arc::new(source);
        let pipeline = BlogPipeline::with_source(source.clone(), &sources(LastResort::Sample));
        (source, pipeline)
    }

    const FIVE_ROWS: &str = "id,slug,title,load\n\
        1,one,One,TRUE\n\
        2,two,Two,false\n\
        3,three,Three,true\n\
        4,four,Four,\n\
        5,five,Five,no\n";

    #[tokio::test]
    async fn test_only_loadable_posts_are_returned() {
        let (_, pipeline) = stub_pipeline(StubSource::default().with(PRIMARY, FIVE_ROWS));

        let posts = pipeline.load_blog_posts().await;

        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.load));
    }

    #[tokio::test]
    async fn test_falls_back_once() {
        let (source, pipeline) = stub_pipeline(StubSource::default().with(FALLBACK, FIVE_ROWS));

        let posts = pipeline.load_blog_posts().await;

        assert_eq!(posts.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_header_only_primary_falls_back() {
        let (_, pipeline) = stub_pipeline(
            StubSource::default()
                .with(PRIMARY, "id,slug,load\n")
                .with(FALLBACK, FIVE_ROWS),
        );

        assert_eq!(pipeline.load_blog_posts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_total_failure_returns_samples() {
        let (source, pipeline) = stub_pipeline(StubSource::default());

        let posts = pipeline.load_blog_posts().await;

        assert_eq!(posts, sample_posts());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_total_failure_with_empty_policy() {
        let pipeline =
            BlogPipeline::with_source(Arc::new(StubSource::default()), &sources(LastResort::Empty));

        assert!(pipeline.load_blog_posts().await.is_empty());
        assert!(pipeline.get_post_by_slug("building-a-blog-with-nextjs").await.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_notified_once_per_load() {
        let (_, pipeline) = stub_pipeline(StubSource::default().with(PRIMARY, FIVE_ROWS));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let sub = pipeline.subscribe_to_post_updates(move |posts| {
            sink.lock().unwrap().push(posts.len());
        });

        pipeline.load_blog_posts().await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        sub.unsubscribe();
        pipeline.load_blog_posts().await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_injected_events_are_shared_across_pipelines() {
        let events = PostEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        events.subscribe(move |posts| sink.lock().unwrap().push(posts.len()));

        let (_, first) = stub_pipeline(StubSource::default().with(PRIMARY, FIVE_ROWS));
        let (_, second) =
            stub_pipeline(StubSource::default().with(FALLBACK, "slug,load\nonly,TRUE\n"));
        let first = first.with_events(events.clone());
        let second = second.with_events(events.clone());

        first.load_blog_posts().await;
        second.load_blog_posts().await;

        assert_eq!(*seen.lock().unwrap(), vec![2, 1]);
        assert_eq!(first.events().subscriber_count(), 1);
        assert_eq!(second.events().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_last_resort_is_not_published() {
        let (_, pipeline) = stub_pipeline(StubSource::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        pipeline.subscribe_to_post_updates(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        pipeline.load_blog_posts().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_post_by_slug_is_exact() {
        let (_, pipeline) = stub_pipeline(StubSource::default().with(PRIMARY, FIVE_ROWS));

        assert_eq!(
            pipeline.get_post_by_slug("three").await.map(|p| p.id),
            Some("3".to_string())
        );
        assert!(pipeline.get_post_by_slug("Three").await.is_none());
        assert!(pipeline.get_post_by_slug("two").await.is_none());
        assert!(pipeline.get_post_by_slug("x").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let source = StubSource {
            delay: Some(Duration::from_millis(50)),
            ..StubSource::default()
        }
        .with(PRIMARY, FIVE_ROWS);
        let (source, pipeline) = stub_pipeline(source);

        let (a, b) = tokio::join!(pipeline.load_blog_posts(), pipeline.load_blog_posts());

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        pipeline.load_blog_posts().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_cached_uses_snapshot() {
        let (source, pipeline) = stub_pipeline(StubSource::default().with(PRIMARY, FIVE_ROWS));
        let cache = PostCache::new(
            Arc::new(MemoryStorage::new()),
            "templates",
            Duration::from_secs(300),
        );
        let pipeline = pipeline.with_cache(cache);

        assert_eq!(pipeline.load_cached().await.len(), 2);
        assert_eq!(pipeline.load_cached().await.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        pipeline.refresh().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_last_resort_is_not_cached() {
        let (source, pipeline) = stub_pipeline(StubSource::default());
        let store = MemoryStorage::new();
        let pipeline = pipeline.with_cache(PostCache::new(
            Arc::new(store.clone()),
            "templates",
            Duration::from_secs(300),
        ));

        assert_eq!(pipeline.load_cached().await.len(), 5);
        pipeline.load_cached().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert!(store.read("templates").await.unwrap().is_none());
    }
}
