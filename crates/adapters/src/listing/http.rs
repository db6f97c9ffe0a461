//! Plain HTTP listing source

use async_trait::async_trait;
use careers_watch_domain::{FetchError, ListingSource, Snapshot};
use reqwest::Client;
use std::time::Duration;

use super::{ListingParser, listing_url};

const USER_AGENT: &str = concat!("careers-watch/", env!("CARGO_PKG_VERSION"));

/// Fetches the results page over HTTP and parses the returned markup
///
/// Works when the results are rendered server-side; use
/// [`CommandListingSource`](super::CommandListingSource) to go through a
/// headless browser otherwise.
pub struct HttpListingSource {
    client: Client,
    parser: ListingParser,
    timeout: Duration,
}

impl HttpListingSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            parser: ListingParser::new(base_url),
            timeout,
        })
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, query: &str) -> Result<Snapshot, FetchError> {
        let url = listing_url(self.parser.base_url(), query)?;
        tracing::info!(url = %url, "Getting page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let page = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        self.parser.parse(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careers_watch_domain::Entry;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
<a class="gc-card" aria-label="Rust Engineer" href="/jobs/results/1-rust/?src=search"></a>
</body></html>"#;

    #[tokio::test]
    async fn test_fetch_parses_results_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/jobs/results/"))
            .and(query_param("q", "rust engineer"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let source = HttpListingSource::new(mock_server.uri(), Duration::from_secs(5)).unwrap();

        let entries = source.fetch("rust engineer").await.unwrap();

        assert_eq!(
            entries,
            vec![Entry::new(
                "Rust Engineer",
                format!("{}/jobs/results/1-rust/?src=search", mock_server.uri())
            )]
        );
    }

    #[tokio::test]
    async fn test_fetch_maps_http_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let source = HttpListingSource::new(mock_server.uri(), Duration::from_secs(5)).unwrap();

        let result = source.fetch("rust").await;

        assert!(matches!(
            result,
            Err(FetchError::Http { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let source =
            HttpListingSource::new(mock_server.uri(), Duration::from_millis(100)).unwrap();

        let result = source.fetch("rust").await;

        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fetch_without_cards_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let source = HttpListingSource::new(mock_server.uri(), Duration::from_secs(5)).unwrap();

        assert!(matches!(
            source.fetch("rust").await,
            Err(FetchError::Structure(_))
        ));
    }
}
