use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use folio_core::config::{HttpConfig, StaticLocation};
use folio_core::error::AppError;
use folio_core::models::{ProjectRecord, RawPayload};
use folio_core::source::{ProjectSource, SourceKind, SourceOutcome};
use reqwest::Client;
use tracing::debug;

/// The bundled `projects.json`, served by the site or read from disk.
///
/// This is the last source in the chain; it has no fallback of its own.
#[derive(Clone)]
pub struct StaticFileSource {
    client: Client,
    location: StaticLocation,
    timeout_secs: u64,
}

impl StaticFileSource {
    pub fn new(location: StaticLocation, http: &HttpConfig) -> Result<Self, AppError> {
        Ok(Self::with_client(build_client(http)?, location, http.timeout_secs))
    }

    pub fn with_client(client: Client, location: StaticLocation, timeout_secs: u64) -> Self {
        Self {
            client,
            location,
            timeout_secs,
        }
    }

    pub fn location(&self) -> &StaticLocation {
        &self.location
    }

    /// Loads and decodes the document.
    pub async fn load(&self) -> Result<Vec<ProjectRecord>, AppError> {
        let body = match &self.location {
            StaticLocation::Url(url) => {
                debug!(url = %url, "fetching static project list");
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| transport_error(e, self.timeout_secs))?;
                let response = ensure_success(response).await?;
                response
                    .bytes()
                    .await
                    .map_err(|e| transport_error(e, self.timeout_secs))?
                    .to_vec()
            }
            StaticLocation::Path(path) => {
                debug!(path = %path.display(), "reading static project list");
                tokio::fs::read(path).await?
            }
        };

        RawPayload::from_slice(&body)?.into_records()
    }
}

#[async_trait]
impl ProjectSource for StaticFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::StaticFile
    }

    async fn attempt(&self) -> Result<SourceOutcome, AppError> {
        Ok(SourceOutcome::Resolved(self.load().await?))
    }
}
