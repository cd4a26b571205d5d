// src/github/fetch.rs
// =============================================================================
// This module downloads things from GitHub.
//
// Two kinds of request:
// - The README itself, through the REST API:
//     GET {api_base}/repos/{owner}/{name}/readme
//   with `Accept: application/vnd.github.v3.raw`, which makes GitHub send
//   the file's text instead of a JSON envelope with base64 content.
// - Binary files (images) for the asset materializer.
//
// Each request is tried exactly once. A non-2xx status or a network failure
// becomes an ImportError and the caller decides what to do with it.
//
// Rust concepts:
// - async functions: For network I/O
// - Result: For error handling
// - map_err: Turning a library error into our own error type
// =============================================================================

use crate::config::ImporterConfig;
use crate::error::ImportError;
use crate::github::RepositoryReference;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

/// Media type that asks the contents API for the file's raw bytes.
pub const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// HTTP client for the repository host
///
/// Cheap to clone: reqwest::Client is a reference-counted handle, so clones
/// share one connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
}

impl GitHubClient {
    // Builds a client from config
    //
    // Sets the timeout, a User-Agent (the GitHub API refuses requests
    // without one) and, when configured, a bearer token.
    pub fn new(config: &ImporterConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    // Fetches the README of a repository as raw text
    //
    // GitHub picks the README file itself (README.md, readme.rst, ...), so
    // we don't have to guess names or branches.
    //
    // Returns: the README text, or an ImportError when the reference is
    // incomplete, the server says no, or the network fails.
    pub async fn fetch_readme(&self, reference: &RepositoryReference) -> Result<String, ImportError> {
        if !reference.is_well_formed() {
            return Err(ImportError::MalformedReference(reference.to_string()));
        }

        let url = format!(
            "{}/repos/{}/{}/readme",
            self.api_base, reference.owner, reference.name
        );
        tracing::debug!(%url, "fetching README");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .send()
            .await
            .map_err(|source| ImportError::Transport { url: url.clone(), source })?;

        let response = check_status(&url, response)?;
        response
            .text()
            .await
            .map_err(|source| ImportError::Transport { url, source })
    }

    // Fetches a binary file (an image, usually)
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImportError> {
        tracing::debug!(url, "fetching asset");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ImportError::Transport { url: url.to_string(), source })?;

        let response = check_status(url, response)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ImportError::Transport { url: url.to_string(), source })?;
        Ok(bytes.to_vec())
    }
}

// Anything outside 2xx is a failure, redirects included
// (reqwest already followed those for us).
fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, ImportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ImportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return ImportError instead of anyhow::Error here?
//    - The orchestrator wants to log which stage failed
//    - A typed enum lets it ask (err.stage()) instead of parsing messages
//    - Constructing the client still uses anyhow: that's setup, not pipeline
//
// 2. What does map_err do?
//    - Converts the error inside a Result, leaves Ok values alone
//    - Here it wraps reqwest::Error together with the URL that failed
//
// 3. Why is the Accept header so important?
//    - Without it GitHub returns JSON with the file base64-encoded inside
//    - With application/vnd.github.v3.raw we get the plain file body
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::parse_repository_reference;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        let config = ImporterConfig {
            api_base: server.uri(),
            ..ImporterConfig::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_readme_raw() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/readme"))
            .and(header("accept", RAW_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Widgets\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let reference = parse_repository_reference("https://github.com/acme/widgets");
        let readme = client.fetch_readme(&reference).await.unwrap();
        assert_eq!(readme, "# Widgets\n");
    }

    #[tokio::test]
    async fn test_fetch_readme_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/nobody/nothing/readme"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let reference = parse_repository_reference("nobody/nothing");
        let err = client.fetch_readme(&reference).await.unwrap_err();
        assert!(matches!(err, ImportError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_reference_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let reference = parse_repository_reference("widgets");
        let err = client.fetch_readme(&reference).await.unwrap_err();
        assert!(matches!(err, ImportError::MalformedReference(_)));
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/private/readme"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("secret readme"))
            .mount(&mock_server)
            .await;

        let config = ImporterConfig {
            api_base: mock_server.uri(),
            token: Some("s3cret".to_string()),
            ..ImporterConfig::default()
        };
        let client = GitHubClient::new(&config).unwrap();
        let reference = parse_repository_reference("acme/private");
        assert_eq!(client.fetch_readme(&reference).await.unwrap(), "secret readme");
    }

    #[tokio::test]
    async fn test_fetch_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let bytes = client
            .fetch_bytes(&format!("{}/img/logo.png", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_fetch_bytes_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client
            .fetch_bytes(&format!("{}/img/logo.png", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "fetch");
    }
}
