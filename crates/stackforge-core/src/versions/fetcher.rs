//! Registry access for latest-version lookups

use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: Url, status: u16 },
    #[error("{url} did not answer within {timeout:?}")]
    Timeout { url: Url, timeout: Duration },
    #[error("{url} returned a body that is not JSON: {message}")]
    Decode { url: Url, message: String },
    #[error("cannot build a registry URL from {0}")]
    InvalidUrl(String),
}

/// Fetches JSON documents over the network
///
/// Implementations must be safe to call many times concurrently.
pub trait JsonFetcher: Send + Sync {
    fn fetch_json(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &Url, timeout: Duration) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    FetchError::Timeout {
                        url: url.clone(),
                        timeout,
                    }
                } else {
                    FetchError::Http {
                        url: url.clone(),
                        source,
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })
    }
}

/// Build `<base>/<name>/latest`, percent-encoding the package name as one segment
///
/// Scoped names like `@types/node` stay a single segment (`@types%2Fnode`).
/// Query parameters on the base URL are preserved.
pub fn registry_url(base: &Url, package: &str) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(package)
        .push("latest");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_url_plain_name() {
        let base = Url::parse("https://registry.npmjs.org").unwrap();
        let url = registry_url(&base, "express").unwrap();
        assert_eq!(url.as_str(), "https://registry.npmjs.org/express/latest");
    }

    #[test]
    fn test_registry_url_scoped_name() {
        let base = Url::parse("https://registry.npmjs.org/").unwrap();
        let url = registry_url(&base, "@types/node").unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry.npmjs.org/@types%2Fnode/latest"
        );
    }

    #[test]
    fn test_registry_url_keeps_base_path_and_query() {
        let base = Url::parse("https://mirror.example.com/npm/?token=abc").unwrap();
        let url = registry_url(&base, "zod").unwrap();
        assert_eq!(
            url.as_str(),
            "https://mirror.example.com/npm/zod/latest?token=abc"
        );
    }

    #[test]
    fn test_registry_url_rejects_opaque_base() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            registry_url(&base, "zod"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
