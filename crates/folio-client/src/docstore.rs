use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use folio_core::config::{HttpConfig, SourceConfig};
use folio_core::error::AppError;
use folio_core::models::{ProjectRecord, RawPayload};
use folio_core::path::build_doc_store_url;
use folio_core::source::{ProjectSource, SourceKind, SourceOutcome};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use tracing::debug;

/// Per-request options for a document-store read.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Database path; defaults to the configured `default_path`.
    pub path: Option<String>,
    /// Overrides the configured auth token.
    pub auth_token: Option<String>,
    /// Appends a timestamp parameter so intermediaries cannot serve a stale body.
    pub cache_bust: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            path: None,
            auth_token: None,
            cache_bust: true,
        }
    }
}

/// HTTP client for the document store's REST interface.
///
/// Every path in the database tree is readable as JSON by appending `.json` to it.
///
/// # Examples
///
/// ```no_run
/// use folio_client::DocStoreClient;
/// use folio_client::docstore::FetchOptions;
/// use folio_core::config::{HttpConfig, SourceConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SourceConfig {
///     project_id: Some("kstudio-83ca5".to_string()),
///     ..SourceConfig::default()
/// };
/// let client = DocStoreClient::new(config, &HttpConfig::default())?;
/// let projects = client.fetch_projects_as_array(&FetchOptions::default()).await?;
/// println!("Found {} projects", projects.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DocStoreClient {
    client: Client,
    config: SourceConfig,
    timeout_secs: u64,
}

impl DocStoreClient {
    /// Creates a client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NetworkError` if the HTTP client cannot be built.
    pub fn new(config: SourceConfig, http: &HttpConfig) -> Result<Self, AppError> {
        Ok(Self::with_client(build_client(http)?, config, http.timeout_secs))
    }

    /// Creates a client that shares an existing HTTP client.
    pub fn with_client(client: Client, config: SourceConfig, timeout_secs: u64) -> Self {
        Self {
            client,
            config,
            timeout_secs,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The URL a read with `opts` would hit.
    pub fn request_url(&self, opts: &FetchOptions) -> Result<Url, AppError> {
        let path = opts.path.as_deref().unwrap_or(&self.config.default_path);
        let token = opts
            .auth_token
            .as_deref()
            .or(self.config.auth_token.as_deref());
        build_doc_store_url(&self.config, path, token, opts.cache_bust)
    }

    /// Reads a path and decodes the body as a [`RawPayload`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` when neither a project id nor a database URL is set.
    /// Returns `AppError::RemoteError` with the response body on a non-success status.
    /// Returns `AppError::ShapeError` when the body is a JSON scalar.
    pub async fn fetch_raw(&self, opts: &FetchOptions) -> Result<RawPayload, AppError> {
        let url = self.request_url(opts)?;
        debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "document store GET");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let response = ensure_success(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        RawPayload::from_slice(&body)
    }

    /// Reads a path and returns it as an ordered list of projects.
    pub async fn fetch_projects_as_array(
        &self,
        opts: &FetchOptions,
    ) -> Result<Vec<ProjectRecord>, AppError> {
        self.fetch_raw(opts).await?.into_records()
    }
}

#[async_trait]
impl ProjectSource for DocStoreClient {
    fn kind(&self) -> SourceKind {
        SourceKind::DocStore
    }

    async fn attempt(&self) -> Result<SourceOutcome, AppError> {
        let projects = self.fetch_projects_as_array(&FetchOptions::default()).await?;
        Ok(SourceOutcome::Resolved(projects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    async fn start_mock_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> DocStoreClient {
        let config = SourceConfig {
            database_base_url: Some(format!("{}/", base_url)),
            auth_token: Some("cfg-token".to_string()),
            ..SourceConfig::default()
        };
        DocStoreClient::new(config, &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_request_url_uses_config_token_and_default_path() {
        let client = client_for("https://db.example.com");
        let opts = FetchOptions {
            cache_bust: false,
            ..FetchOptions::default()
        };
        let url = client.request_url(&opts).unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/projects.json?auth=cfg-token"
        );

        let opts = FetchOptions {
            path: Some("projects/p 1".to_string()),
            auth_token: Some("override".to_string()),
            cache_bust: false,
        };
        let url = client.request_url(&opts).unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/projects/p%201.json?auth=override"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_config_error() {
        let client = DocStoreClient::new(SourceConfig::default(), &HttpConfig::default()).unwrap();
        let err = client.fetch_raw(&FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_keyed_map_is_normalized() {
        let seen = Arc::new(Mutex::new(HashMap::new()));
        let seen_in_handler = seen.clone();
        let app = Router::new().route(
            "/projects.json",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let seen = seen_in_handler.clone();
                async move {
                    *seen.lock().unwrap() = params;
                    r#"{"p2": {"title": "Second"}, "p1": {"title": "First", "year": 2021}}"#
                }
            }),
        );
        let base = start_mock_server(app).await;

        let projects = client_for(&base)
            .fetch_projects_as_array(&FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, "p2");
        assert_eq!(projects[1].year.as_deref(), Some("2021"));

        let params = seen.lock().unwrap().clone();
        assert_eq!(params.get("auth").map(String::as_str), Some("cfg-token"));
        assert!(params.contains_key("_"));
    }

    #[tokio::test]
    async fn test_null_path_is_empty_list() {
        let app = Router::new().route("/projects.json", get(|| async { "null" }));
        let base = start_mock_server(app).await;
        let projects = client_for(&base)
            .fetch_projects_as_array(&FetchOptions::default())
            .await
            .unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let app = Router::new().route(
            "/projects.json",
            get(|| async { (StatusCode::UNAUTHORIZED, r#"{"error": "Permission denied"}"#) }),
        );
        let base = start_mock_server(app).await;

        let err = client_for(&base)
            .fetch_raw(&FetchOptions::default())
            .await
            .unwrap_err();

        match err {
            AppError::RemoteError {
                status,
                status_text,
                body,
            } => {
                assert_eq!(status, 401);
                assert_eq!(status_text, "Unauthorized");
                assert!(body.contains("Permission denied"));
            }
            other => panic!("expected RemoteError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scalar_body_is_shape_error() {
        let app = Router::new().route("/projects.json", get(|| async { "42" }));
        let base = start_mock_server(app).await;
        let err = client_for(&base)
            .fetch_raw(&FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShapeError(_)));
    }
}
