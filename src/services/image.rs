//! Best-effort representative image lookup (Pexels search API).
//!
//! Lookups never fail the caller: any problem is logged and yields `None`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";
/// Search term used when the caller has nothing better.
pub const FALLBACK_TERM: &str = "startup";

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn find_image(&self, term: &str) -> Option<String>;
}

/// Image for a new starthub: first category, then the generic fallback.
pub async fn resolve_image(search: &dyn ImageSearch, categories: &[String]) -> Option<String> {
    if let Some(first) = categories.first() {
        if let Some(url) = search.find_image(first).await {
            return Some(url);
        }
    }
    search.find_image(FALLBACK_TERM).await
}

pub fn search_term(raw: &str) -> String {
    let term = raw.trim().to_lowercase();
    if term.is_empty() {
        FALLBACK_TERM.to_string()
    } else {
        term
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    medium: String,
}

fn first_medium(body: SearchResponse) -> Option<String> {
    body.photos.into_iter().next().map(|p| p.src.medium)
}

/// Pexels client. Without an API key every lookup is `None`.
#[derive(Clone)]
pub struct PexelsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl PexelsClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: PEXELS_SEARCH_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ImageSearch for PexelsClient {
    async fn find_image(&self, term: &str) -> Option<String> {
        let api_key = self.api_key.as_deref()?;
        let term = search_term(term);

        let res = match self
            .http
            .get(&self.base_url)
            .query(&[("query", term.as_str()), ("per_page", "1")])
            .header(reqwest::header::AUTHORIZATION, api_key)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, term = %term, "image lookup request failed");
                return None;
            }
        };

        if !res.status().is_success() {
            warn!(status = %res.status(), term = %term, "image lookup rejected");
            return None;
        }

        let body = match res.json::<SearchResponse>().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, term = %term, "image lookup returned unreadable body");
                return None;
            }
        };

        let url = first_medium(body);
        match &url {
            Some(url) => debug!(term = %term, url = %url, "image found"),
            None => debug!(term = %term, "no image for term"),
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ImageSearch for Fixed {
        async fn find_image(&self, term: &str) -> Option<String> {
            self.0.get(term).map(|s| s.to_string())
        }
    }

    #[test]
    fn search_term_normalizes() {
        assert_eq!(search_term("  FinTech "), "fintech");
        assert_eq!(search_term("   "), FALLBACK_TERM);
    }

    #[test]
    fn parses_first_medium_photo() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"page":1,"photos":[{"id":1,"src":{"medium":"https://img/1.jpg","large":"x"}},{"id":2,"src":{"medium":"https://img/2.jpg"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_medium(body).as_deref(), Some("https://img/1.jpg"));

        let empty: SearchResponse = serde_json::from_str(r#"{"photos":[]}"#).unwrap();
        assert_eq!(first_medium(empty), None);
    }

    #[tokio::test]
    async fn resolve_prefers_first_category_then_fallback() {
        let search = Fixed(HashMap::from([
            ("tech", "https://img/tech.jpg"),
            (FALLBACK_TERM, "https://img/startup.jpg"),
        ]));
        let cats = vec!["tech".to_string(), "food".to_string()];
        assert_eq!(
            resolve_image(&search, &cats).await.as_deref(),
            Some("https://img/tech.jpg")
        );

        let cats = vec!["food".to_string()];
        assert_eq!(
            resolve_image(&search, &cats).await.as_deref(),
            Some("https://img/startup.jpg")
        );
        assert_eq!(
            resolve_image(&search, &[]).await.as_deref(),
            Some("https://img/startup.jpg")
        );
    }

    #[tokio::test]
    async fn client_without_key_is_disabled() {
        let client = PexelsClient::new(Some("  ".into()), Duration::from_secs(1)).unwrap();
        assert!(!client.is_enabled());
        assert_eq!(client.find_image("tech").await, None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_none() {
        let client = PexelsClient::new(Some("key".into()), Duration::from_millis(500))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v1/search");
        assert_eq!(client.find_image("tech").await, None);
    }
}
