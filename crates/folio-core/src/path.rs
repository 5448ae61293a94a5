//! Path encoding and URL construction for the document store and the edge proxy.

use crate::config::SourceConfig;
use crate::error::AppError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters `encodeURIComponent` leaves alone, so ids round-trip with the web pages.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a single path segment or query value.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Encodes a database path segment by segment.
///
/// Leading and trailing slashes are stripped; an empty result is the database root.
/// Slashes inside the path stay as separators.
///
/// # Examples
///
/// ```
/// use folio_core::path::encode_path;
///
/// assert_eq!(encode_path("projects/p 1"), "projects/p%201");
/// assert_eq!(encode_path("/projects/"), "projects");
/// assert_eq!(encode_path("/"), "");
/// ```
pub fn encode_path(raw_path: &str) -> String {
    let trimmed = raw_path.trim_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed
        .split('/')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Builds the REST URL for `path` in the configured document store.
///
/// The base is `database_base_url` when set, otherwise the default host derived from
/// `project_id`. `auth` is appended when a token is given, `_=<epoch millis>` when
/// `cache_bust` is set.
pub fn build_doc_store_url(
    config: &SourceConfig,
    path: &str,
    auth_token: Option<&str>,
    cache_bust: bool,
) -> Result<Url, AppError> {
    build_doc_store_url_at(
        config,
        path,
        auth_token,
        cache_bust.then(|| chrono::Utc::now().timestamp_millis()),
    )
}

/// Same as [`build_doc_store_url`] with an explicit cache-bust stamp.
pub fn build_doc_store_url_at(
    config: &SourceConfig,
    path: &str,
    auth_token: Option<&str>,
    cache_bust_millis: Option<i64>,
) -> Result<Url, AppError> {
    let base = doc_store_base(config)?;

    let mut url = format!("{}/{}.json", base, encode_path(path));

    let mut params = Vec::new();
    if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
        params.push(format!("auth={}", encode_component(token)));
    }
    if let Some(millis) = cache_bust_millis {
        params.push(format!("_={}", millis));
    }
    if !params.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&params.join("&"));
    }

    Url::parse(&url).map_err(|e| AppError::InvalidUrl(format!("{}: {}", url, e)))
}

fn doc_store_base(config: &SourceConfig) -> Result<String, AppError> {
    if let Some(base) = config
        .database_base_url
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        return Ok(base.trim_end_matches('/').to_string());
    }
    match config.effective_project_id() {
        Some(project_id) => Ok(format!("https://{}.firebaseio.com", project_id)),
        None => Err(AppError::ConfigError(
            "projectId or databaseBaseUrl is required".to_string(),
        )),
    }
}

/// Builds the same-origin proxy URL, optionally for a single project id.
///
/// # Examples
///
/// ```
/// use folio_core::path::build_proxy_url;
/// use url::Url;
///
/// let site = Url::parse("https://studio.example.com/portfolio/").unwrap();
/// let url = build_proxy_url(&site, "/api/projects", Some("lamp v2")).unwrap();
/// assert_eq!(url.as_str(), "https://studio.example.com/api/projects/lamp%20v2");
/// ```
pub fn build_proxy_url(
    site_url: &Url,
    base_path: &str,
    suffix: Option<&str>,
) -> Result<Url, AppError> {
    let mut path = format!("/{}", encode_path(base_path));
    if let Some(id) = suffix.filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(&encode_component(id));
    }
    site_url
        .join(&path)
        .map_err(|e| AppError::InvalidUrl(format!("{}: {}", path, e)))
}

/// Link to a project's detail page, relative to the site root.
pub fn project_detail_href(id: &str) -> String {
    format!("project.html?id={}", encode_component(id))
}
