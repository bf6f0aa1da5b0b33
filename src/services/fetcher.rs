// src/services/fetcher.rs

//! Source fetcher.
//!
//! Retrieves raw CSV text from a remote spreadsheet export or a local file,
//! bounded by a timeout. Each failure kind maps to its own `AppError` variant
//! so callers can tell a timeout from a bad status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http::create_async_client;
use crate::utils::local_path;

/// Something that can produce raw CSV text for a location.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the raw text at `location`.
    ///
    /// Blank bodies are reported as `AppError::EmptyBody`.
    async fn fetch_source(&self, location: &str) -> Result<String>;
}

/// HTTP and filesystem backed source.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher from source settings.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            timeout: config.timeout(),
        })
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(url, status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn fetch_remote(&self, url: &str) -> Result<String> {
        // Dropping the request future aborts the connection.
        match tokio::time::timeout(self.timeout, self.get_text(url)).await {
            Ok(Err(AppError::Http(e))) if e.is_timeout() => {
                Err(AppError::timeout(url, self.timeout_ms()))
            }
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(url, self.timeout_ms())),
        }
    }

    async fn fetch_local(&self, location: &str) -> Result<String> {
        let path = local_path(location)
            .ok_or_else(|| AppError::config(format!("Not a local source: {location}")))?;

        match tokio::time::timeout(self.timeout, tokio::fs::read_to_string(&path)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::timeout(location, self.timeout_ms())),
        }
    }
}

#[async_trait]
impl PostSource for HttpFetcher {
    async fn fetch_source(&self, location: &str) -> Result<String> {
        let text = if local_path(location).is_some() {
            log::debug!("Reading local source {}", location);
            self.fetch_local(location).await?
        } else {
            log::debug!("Fetching remote source {}", location);
            self.fetch_remote(location).await?
        };

        if text.trim().is_empty() {
            return Err(AppError::EmptyBody(location.to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fetcher(timeout_ms: u64) -> HttpFetcher {
        let config = SourceConfig {
            timeout_ms,
            ..SourceConfig::default()
        };
        HttpFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_remote_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/posts.csv");
                then.status(200).body("id,title\n1,Hello\n");
            })
            .await;

        let text = fetcher(3000)
            .fetch_source(&server.url("/posts.csv"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, "id,title\n1,Hello\n");
    }

    #[tokio::test]
    async fn test_fetch_sends_no_cache_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/posts.csv")
                    .header("cache-control", "no-cache")
                    .header("pragma", "no-cache");
                then.status(200).body("id\n1\n");
            })
            .await;

        fetcher(3000)
            .fetch_source(&server.url("/posts.csv"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts.csv");
                then.status(404);
            })
            .await;

        let err = fetcher(3000)
            .fetch_source(&server.url("/posts.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts.csv");
                then.status(200).body("  \n");
            })
            .await;

        let err = fetcher(3000)
            .fetch_source(&server.url("/posts.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyBody(_)));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow.csv");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body("id\n1\n");
            })
            .await;

        let err = fetcher(50)
            .fetch_source(&server.url("/slow.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout { timeout_ms: 50, .. }));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"id,title\n2,Local\n").unwrap();

        let text = fetcher(3000)
            .fetch_source(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert!(text.contains("Local"));
    }

    #[tokio::test]
    async fn test_fetch_missing_local_file() {
        let err = fetcher(3000)
            .fetch_source("definitely/not/here.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Io(_)));
    }
}
