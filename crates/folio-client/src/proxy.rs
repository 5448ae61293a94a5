use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use folio_core::config::{HttpConfig, DEFAULT_PROXY_PATH};
use folio_core::error::AppError;
use folio_core::models::{ProjectRecord, RawPayload};
use folio_core::path::build_proxy_url;
use folio_core::source::{ProjectSource, SourceKind, SourceOutcome};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use tracing::debug;

/// Answer from the edge proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyResponse {
    Projects(Vec<ProjectRecord>),
    /// No usable proxy on this deployment; the reason is diagnostic only.
    NotAvailable(String),
}

/// Client for the same-origin edge proxy that forwards to the document store.
///
/// The proxy is optional. Before the real request a HEAD probe checks that the path
/// is mounted at all, so static deployments without the forwarder fail fast and
/// quietly. This client never returns an error; every failure becomes
/// [`ProxyResponse::NotAvailable`].
#[derive(Clone)]
pub struct EdgeProxyClient {
    client: Client,
    site_url: Url,
    base_path: String,
    timeout_secs: u64,
}

impl EdgeProxyClient {
    pub fn new(site_url: Url, http: &HttpConfig) -> Result<Self, AppError> {
        Ok(Self::with_client(
            build_client(http)?,
            site_url,
            DEFAULT_PROXY_PATH,
            http.timeout_secs,
        ))
    }

    pub fn with_client(client: Client, site_url: Url, base_path: &str, timeout_secs: u64) -> Self {
        Self {
            client,
            site_url,
            base_path: base_path.to_string(),
            timeout_secs,
        }
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.to_string();
        self
    }

    /// URL of the project list, or of one project when `id` is given.
    pub fn endpoint(&self, id: Option<&str>) -> Result<Url, AppError> {
        build_proxy_url(&self.site_url, &self.base_path, id)
    }

    /// Probes the proxy and, if it is mounted, fetches the project list.
    pub async fn try_proxy(&self) -> ProxyResponse {
        match self.probe_then_fetch().await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "proxy request failed");
                ProxyResponse::NotAvailable(err.to_string())
            }
        }
    }

    async fn probe_then_fetch(&self) -> Result<ProxyResponse, AppError> {
        let url = self.endpoint(None)?;

        let probe = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        if !probe.status().is_success() {
            debug!(status = probe.status().as_u16(), url = %url, "proxy probe failed");
            return Ok(ProxyResponse::NotAvailable(format!(
                "probe returned HTTP {}",
                probe.status().as_u16()
            )));
        }

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

        let projects = RawPayload::from_slice(&body)?.into_records()?;
        Ok(ProxyResponse::Projects(projects))
    }
}

#[async_trait]
impl ProjectSource for EdgeProxyClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Proxy
    }

    async fn attempt(&self) -> Result<SourceOutcome, AppError> {
        Ok(match self.try_proxy().await {
            ProxyResponse::Projects(projects) => SourceOutcome::Resolved(projects),
            ProxyResponse::NotAvailable(reason) => SourceOutcome::NotAvailable(reason),
        })
    }
}
