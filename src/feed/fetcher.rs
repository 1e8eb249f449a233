use crate::feed::paper::{Page, Paper};
use crate::feed::parser::{parse_papers, ParseResult};
use futures::StreamExt;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching one page of results.
///
/// The UI collapses every variant into a single "failed to load" state; the
/// distinction only shows up in logs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Received fewer bytes than Content-Length announced
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Body could not be read as an Atom document
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Query parameters that stay fixed for a session.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub base_url: Url,
    pub search_query: String,
    pub page_size: usize,
}

/// Client for the arXiv list endpoint.
///
/// Cheap to clone: `reqwest::Client` is reference counted and the query is
/// shared behind an `Arc`, so spawned fetch tasks take their own copy.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    http: reqwest::Client,
    query: Arc<FeedQuery>,
    timeout: Duration,
}

/// Redirect policy for the API host: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

impl ArxivClient {
    pub fn new(query: FeedQuery, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .user_agent(concat!("paperstream/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            query: Arc::new(query),
            timeout,
        })
    }

    pub fn page_size(&self) -> usize {
        self.query.page_size
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Builds the request URL for a page.
    ///
    /// `start` is `page_index * page_size`; results are sorted by submission
    /// date, newest first.
    pub fn page_url(&self, page_index: usize) -> Url {
        let q = &self.query;
        let mut url = q.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("search_query", &q.search_query)
            .append_pair("start", &page_index.saturating_mul(q.page_size).to_string())
            .append_pair("max_results", &q.page_size.to_string())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending");
        url
    }

    /// Fetches and parses one page.
    ///
    /// Papers come back in upstream order; shuffling is the loader's job.
    /// Malformed entries are dropped and counted in the page's `raw_len`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] - transport failure
    /// - [`FetchError::HttpStatus`] - non-2xx response
    /// - [`FetchError::ResponseTooLarge`] / [`FetchError::IncompleteResponse`] - body problems
    /// - [`FetchError::Parse`] - body is not a readable feed document
    pub async fn fetch_page(&self, page_index: usize) -> Result<Page, FetchError> {
        let url = self.page_url(page_index);
        tracing::debug!(page = page_index, url = %url, "Fetching page");

        let response = tokio::time::timeout(self.timeout, self.http.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = tokio::time::timeout(self.timeout, read_limited_bytes(response, MAX_FEED_SIZE))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let ParseResult {
            papers,
            raw_len,
            skipped,
        } = parse_papers(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        if skipped > 0 {
            tracing::warn!(
                page = page_index,
                skipped = skipped,
                "Entries without id or title dropped"
            );
        }

        Ok(Page {
            index: page_index,
            papers: papers.into_iter().map(Arc::<Paper>::new).collect(),
            raw_len,
        })
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ONE_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/x</id>
  <title>q</title>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>Only paper</title>
    <summary>Abstract</summary>
    <published>2024-01-01T00:00:00Z</published>
  </entry>
</feed>"#;

    fn client_for(server: &MockServer, page_size: usize) -> ArxivClient {
        let query = FeedQuery {
            base_url: Url::parse(&format!("{}/api/query", server.uri())).unwrap(),
            search_query: "cat:cs.AI OR cat:cs.CL".to_string(),
            page_size,
        };
        ArxivClient::new(query, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_page_url_parameters() {
        let server = MockServer::start().await;
        let client = client_for(&server, 10);

        let url = client.page_url(3);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("search_query".to_string(), "cat:cs.AI OR cat:cs.CL".to_string()),
                ("start".to_string(), "30".to_string()),
                ("max_results".to_string(), "10".to_string()),
                ("sortBy".to_string(), "submittedDate".to_string()),
                ("sortOrder".to_string(), "descending".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("start", "10"))
            .and(query_param("max_results", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_ENTRY)
                    .insert_header("Content-Type", "application/atom+xml"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 10);
        let page = client.fetch_page(1).await.unwrap();

        assert_eq!(page.index, 1);
        assert_eq!(page.raw_len, 1);
        assert_eq!(page.papers[0].title, "Only paper");
    }

    #[tokio::test]
    async fn test_fetch_page_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1) // No retries
            .mount(&server)
            .await;

        let client = client_for(&server, 10);
        match client.fetch_page(0).await {
            Err(FetchError::HttpStatus(503)) => {}
            other => panic!("Expected HttpStatus(503), got {:?}", other.map(|p| p.raw_len)),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&server)
            .await;

        let client = client_for(&server, 10);
        let result = client.fetch_page(0).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_ENTRY)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let query = FeedQuery {
            base_url: Url::parse(&format!("{}/api/query", server.uri())).unwrap(),
            search_query: "cat:cs.AI".to_string(),
            page_size: 10,
        };
        let client = ArxivClient::new(query, Duration::from_millis(50)).unwrap();

        let result = client.fetch_page(0).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }
}
