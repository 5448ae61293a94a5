//! Wires the standard proxy → document store → static file chain from configuration.

use crate::docstore::DocStoreClient;
use crate::http::build_client;
use crate::proxy::EdgeProxyClient;
use crate::static_file::StaticFileSource;
use folio_core::config::FolioConfig;
use folio_core::error::AppError;
use folio_core::policy::ProxyPolicy;
use folio_core::resolver::{Resolver, ResolverPolicy};
use folio_core::source::ProjectSource;
use reqwest::Client;
use tracing::debug;

/// Runtime opt-out signals that do not live in the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptOut {
    /// The page carries the skip-proxy meta marker.
    pub page_marker: bool,
}

/// Eligibility inputs for the proxy, derived from the site URL.
pub fn proxy_policy(config: &FolioConfig, opt_out: OptOut) -> ProxyPolicy {
    ProxyPolicy {
        skip_flag: config.proxy.skip,
        page_marker: opt_out.page_marker,
        host: config
            .proxy
            .site_url
            .as_ref()
            .and_then(|url| url.host_str())
            .map(str::to_string),
        static_host_suffixes: config.proxy.static_host_suffixes.clone(),
    }
}

/// Builds the standard resolver with a fresh HTTP client.
pub fn build_resolver(config: &FolioConfig, opt_out: OptOut) -> Result<Resolver, AppError> {
    build_resolver_with_client(build_client(&config.http)?, config, opt_out)
}

/// Builds the standard resolver around an existing HTTP client.
pub fn build_resolver_with_client(
    client: Client,
    config: &FolioConfig,
    opt_out: OptOut,
) -> Result<Resolver, AppError> {
    let timeout_secs = config.http.timeout_secs;
    let mut sources: Vec<Box<dyn ProjectSource>> = Vec::with_capacity(3);

    if let Some(site_url) = &config.proxy.site_url {
        sources.push(Box::new(EdgeProxyClient::with_client(
            client.clone(),
            site_url.clone(),
            &config.proxy.base_path,
            timeout_secs,
        )));
    }

    sources.push(Box::new(DocStoreClient::with_client(
        client.clone(),
        config.source.clone(),
        timeout_secs,
    )));

    let location = config
        .static_file
        .resolve(config.proxy.site_url.as_ref())?;
    sources.push(Box::new(StaticFileSource::with_client(
        client,
        location,
        timeout_secs,
    )));

    let policy = ResolverPolicy {
        proxy_allowed: proxy_policy(config, opt_out).allows_proxy(),
        doc_store_configured: config.source.is_doc_store_configured(),
    };
    debug!(?policy, "built resolver");

    Ok(Resolver::new(sources, policy, config.http.timeout()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::source::SourceKind;
    use url::Url;

    #[test]
    fn test_chain_without_site_url_has_no_proxy() {
        let resolver = build_resolver(&FolioConfig::default(), OptOut::default()).unwrap();
        assert_eq!(
            resolver.source_kinds(),
            vec![SourceKind::DocStore, SourceKind::StaticFile]
        );
        assert!(!resolver.policy().proxy_allowed);
        assert!(!resolver.policy().doc_store_configured);
    }

    #[test]
    fn test_custom_deployment_enables_proxy() {
        let mut config = FolioConfig::default();
        config.proxy.site_url = Some(Url::parse("https://studio.example.com").unwrap());
        config.source.project_id = Some("kstudio".to_string());

        let resolver = build_resolver(&config, OptOut::default()).unwrap();
        assert_eq!(
            resolver.source_kinds(),
            vec![SourceKind::Proxy, SourceKind::DocStore, SourceKind::StaticFile]
        );
        assert!(resolver.policy().proxy_allowed);
        assert!(resolver.policy().doc_store_configured);

        let resolver = build_resolver(&config, OptOut { page_marker: true }).unwrap();
        assert!(!resolver.policy().proxy_allowed);
    }

    #[test]
    fn test_static_hosting_disables_proxy() {
        let mut config = FolioConfig::default();
        config.proxy.site_url = Some(Url::parse("https://kstudio.pages.dev").unwrap());
        let policy = proxy_policy(&config, OptOut::default());
        assert_eq!(policy.host.as_deref(), Some("kstudio.pages.dev"));
        assert!(!policy.allows_proxy());
    }
}
