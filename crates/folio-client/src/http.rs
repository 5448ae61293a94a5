use folio_core::config::HttpConfig;
use folio_core::error::AppError;
use reqwest::{Client, Response};

/// Builds the shared HTTP client used by every source.
pub fn build_client(config: &HttpConfig) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .build()
        .map_err(|e| AppError::NetworkError(format!("failed to build HTTP client: {}", e)))
}

/// Maps a transport failure onto the error kinds the resolver understands.
pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {}", e))
    } else {
        AppError::NetworkError(e.to_string())
    }
}

/// Turns a non-success response into [`AppError::RemoteError`], reading the body for diagnostics.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::RemoteError {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}
