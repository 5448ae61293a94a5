//! Decides whether the edge proxy should be tried for a deployment.
//!
//! The proxy only exists on custom deployments. Static hosting platforms and local
//! development servers never mount it, so calling it there just produces noise.

use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Page-level opt-out marker: `<meta name="ks-skip-proxy" content="1">`.
pub const SKIP_PROXY_META_NAME: &str = "ks-skip-proxy";

pub fn is_loopback_host(host: &str) -> bool {
    let host = host.trim().trim_start_matches('[').trim_end_matches(']');
    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost")
    {
        return true;
    }
    host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

/// Suffix match on a label boundary, so `pages.dev` matches `site.pages.dev` but not `mypages.dev`.
pub fn is_static_hosting_host(host: &str, suffixes: &[String]) -> bool {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    suffixes.iter().any(|suffix| {
        let suffix = suffix.trim().trim_start_matches('.').to_ascii_lowercase();
        !suffix.is_empty() && (host == suffix || host.ends_with(&format!(".{}", suffix)))
    })
}

fn meta_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("static regex"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("static regex")
    })
}

/// Whether an HTML page carries the skip-proxy meta marker.
///
/// # Examples
///
/// ```
/// use folio_core::policy::has_skip_proxy_marker;
///
/// assert!(has_skip_proxy_marker(r#"<head><meta content="1" name='ks-skip-proxy'></head>"#));
/// assert!(!has_skip_proxy_marker(r#"<meta name="ks-skip-proxy" content="0">"#));
/// ```
pub fn has_skip_proxy_marker(html: &str) -> bool {
    meta_tag_regex().find_iter(html).any(|tag| {
        let mut name = None;
        let mut content = None;
        for caps in attr_regex().captures_iter(tag.as_str()) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().trim());
            match caps[1].to_ascii_lowercase().as_str() {
                "name" => name = value,
                "content" => content = value,
                _ => {}
            }
        }
        name.is_some_and(|n| n.eq_ignore_ascii_case(SKIP_PROXY_META_NAME)) && content == Some("1")
    })
}

/// Inputs to the proxy eligibility check.
#[derive(Debug, Clone, Default)]
pub struct ProxyPolicy {
    pub skip_flag: bool,
    pub page_marker: bool,
    pub host: Option<String>,
    pub static_host_suffixes: Vec<String>,
}

impl ProxyPolicy {
    /// True only on a custom deployment that has not opted out.
    pub fn allows_proxy(&self) -> bool {
        if self.skip_flag || self.page_marker {
            return false;
        }
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => {
                !is_loopback_host(host) && !is_static_hosting_host(host, &self.static_host_suffixes)
            }
            _ => false,
        }
    }
}
