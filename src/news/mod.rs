mod wire;

use crate::config::Config;
use crate::error::{AlertError, Result};
use tracing::{debug, warn};

/// Articles requested per run.
pub const PAGE_SIZE: usize = 3;

/// A news headline about the tracked company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

/// Client for the news-search provider's `everything` endpoint.
pub struct NewsFetcher {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl NewsFetcher {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.news_endpoint.clone(),
            api_key: config.news_api_key.clone(),
            client,
        }
    }

    /// Fetches up to three English articles mentioning `company_name`, newest first.
    ///
    /// Never fails: any transport, status or payload problem is logged and
    /// yields an empty list.
    pub async fn fetch_recent_articles(&self, company_name: &str) -> Vec<Article> {
        match self.try_fetch(company_name).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("Failed to fetch news: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, company_name: &str) -> Result<Vec<Article>> {
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("q", company_name),
                ("searchIn", "title,content,description"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AlertError::status(response.status(), response.url()));
        }

        let envelope: wire::EverythingEnvelope = response.json().await?;

        if envelope.status.as_deref() == Some("error") {
            return Err(AlertError::Provider(
                envelope.message.unwrap_or_else(|| "unknown news error".to_string()),
            ));
        }

        let raw = envelope
            .articles
            .ok_or_else(|| AlertError::Data("articles field missing".to_string()))?;

        let articles: Vec<Article> = raw
            .into_iter()
            .take(PAGE_SIZE)
            .map(|a| Article {
                title: a.title.unwrap_or_default(),
                description: a.description.unwrap_or_default(),
                published_at: a.published_at,
                url: a.url,
            })
            .collect();

        debug!(count = articles.len(), "fetched articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn fetcher(server: &MockServer) -> NewsFetcher {
        let config = test_config(&server.base_url());
        NewsFetcher::new(&config, config.http_client().unwrap())
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("apiKey", "news-key")
                .query_param("q", "Tesla Inc")
                .query_param("searchIn", "title,content,description")
                .query_param("language", "en")
                .query_param("pageSize", "3")
                .query_param("sortBy", "publishedAt");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "status": "ok",
                        "totalResults": 2,
                        "articles": [
                            { "title": "Tesla rallies", "description": "Shares jump.", "publishedAt": "2024-03-07T21:00:00Z", "url": "https://news.example/1" },
                            { "title": "Deliveries beat", "description": null, "publishedAt": "2024-03-07T18:00:00Z" }
                        ]
                    })
                    .to_string(),
                );
        });

        let articles = fetcher(&server).fetch_recent_articles("Tesla Inc").await;

        mock.assert();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Tesla rallies");
        assert_eq!(articles[0].url.as_deref(), Some("https://news.example/1"));
        assert_eq!(articles[1].description, "");
        assert_eq!(articles[1].published_at.as_deref(), Some("2024-03-07T18:00:00Z"));
    }

    #[tokio::test]
    async fn test_truncates_to_page_size() {
        let server = MockServer::start();
        let many: Vec<_> = (0..5)
            .map(|i| json!({ "title": format!("t{}", i), "description": "d" }))
            .collect();
        server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(200)
                .header("content-type", "application/json")
                .body(json!({ "status": "ok", "articles": many }).to_string());
        });

        let articles = fetcher(&server).fetch_recent_articles("Tesla Inc").await;
        assert_eq!(articles.len(), PAGE_SIZE);
        assert_eq!(articles[0].title, "t0");
    }

    #[tokio::test]
    async fn test_server_error_yields_empty() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(500).body("boom");
        });

        let articles = fetcher(&server).fetch_recent_articles("Tesla Inc").await;

        mock.assert();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_missing_articles_field_yields_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(200)
                .header("content-type", "application/json")
                .body(json!({ "status": "ok" }).to_string());
        });

        assert!(fetcher(&server).fetch_recent_articles("Tesla Inc").await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_body_yields_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(200)
                .header("content-type", "application/json")
                .body(json!({ "status": "error", "code": "apiKeyInvalid", "message": "bad key" }).to_string());
        });

        assert!(fetcher(&server).fetch_recent_articles("Tesla Inc").await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_yields_empty() {
        // Nothing listens on the discard port.
        let mut config = test_config("http://127.0.0.1:9");
        config.http_timeout = std::time::Duration::from_secs(1);
        let fetcher = NewsFetcher::new(&config, config.http_client().unwrap());

        assert!(fetcher.fetch_recent_articles("Tesla Inc").await.is_empty());
    }
}
