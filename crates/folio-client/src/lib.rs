//! Folio Client - HTTP data sources for the portfolio project list
//!
//! This crate provides the concrete sources of the fallback chain:
//!
//! - [`proxy`] - the optional same-origin edge proxy
//! - [`docstore`] - the document store's REST endpoint
//! - [`static_file`] - the bundled `projects.json`
//!
//! [`chain`] assembles them, in that order, into a [`folio_core::Resolver`].

pub mod chain;
pub mod docstore;
pub mod http;
pub mod proxy;
pub mod static_file;

// Re-export main client types
pub use chain::{build_resolver, build_resolver_with_client, OptOut};
pub use docstore::{DocStoreClient, FetchOptions};
pub use proxy::{EdgeProxyClient, ProxyResponse};
pub use static_file::StaticFileSource;
