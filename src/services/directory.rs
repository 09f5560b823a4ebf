use crate::models::{CandidateMatch, DirectorySearchResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when searching the customer directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: missing or expired token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Search reported failure: {0}")]
    Unsuccessful(String),
}

/// Remote customer directory searched while a new customer is being typed
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Free-text search returning at most `limit` customers in directory order
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateMatch>, DirectoryError>;
}

/// HTTP client for the dashboard's customer directory
///
/// Issues `GET {base_url}/customers?search=..&limit=..` with an optional bearer token.
pub struct HttpDirectoryClient {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpDirectoryClient {
    pub fn new(base_url: String, auth_token: Option<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/customers?search={}&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            limit
        )
    }
}

#[async_trait]
impl DirectorySearch for HttpDirectoryClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateMatch>, DirectoryError> {
        let url = self.search_url(query, limit);

        tracing::debug!("Searching directory: {}", url);

        let mut request = self.client.get(&url).header("Content-Type", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DirectoryError::Unauthorized);
        }
        if !status.is_success() {
            return Err(DirectoryError::ApiError(format!("Failed to search customers: {}", status)));
        }

        let body = response.text().await?;
        let parsed: DirectorySearchResponse = serde_json::from_str(&body)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse search response: {}", e)))?;

        if !parsed.success {
            return Err(DirectoryError::Unsuccessful(
                parsed.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let customers = parsed.into_customers();
        tracing::debug!("Directory returned {} customers for {:?}", customers.len(), query);

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, token: Option<&str>) -> HttpDirectoryClient {
        HttpDirectoryClient::new(base_url.to_string(), token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let c = client("https://dashboard.test/api/", None);
        assert_eq!(
            c.search_url("Ali Khan & Sons", 50),
            "https://dashboard.test/api/customers?search=Ali%20Khan%20%26%20Sons&limit=50"
        );
    }

    #[test]
    fn test_empty_token_ignored() {
        let c = client("https://dashboard.test/api", Some(""));
        assert!(c.auth_token.is_none());
    }

    #[tokio::test]
    async fn test_search_parses_customers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customers")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("search".into(), "Ahmed".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"data":{"customers":[
                    {"id":1,"name":"Ahmed Ali","phone":"+923001112222","type":"Permanent","currentBalance":0},
                    {"id":2,"name":"Ahmed Raza"}
                ]}}"#,
            )
            .create_async()
            .await;

        let c = client(&server.url(), Some("secret"));
        let customers = c.search("Ahmed", 50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Ahmed Ali");
        assert_eq!(customers[1].phone, None);
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customers")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"message":"search index offline"}"#)
            .create_async()
            .await;

        let err = client(&server.url(), None).search("Ali", 50).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unsuccessful(ref m) if m == "search index offline"));
    }

    #[tokio::test]
    async fn test_status_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customers")
            .match_query(mockito::Matcher::UrlEncoded("search".into(), "locked".into()))
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("GET", "/customers")
            .match_query(mockito::Matcher::UrlEncoded("search".into(), "broken".into()))
            .with_status(500)
            .create_async()
            .await;

        let c = client(&server.url(), None);
        assert!(matches!(c.search("locked", 50).await, Err(DirectoryError::Unauthorized)));
        assert!(matches!(c.search("broken", 50).await, Err(DirectoryError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customers")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = client(&server.url(), None).search("Ali", 50).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidResponse(_)));
    }
}
