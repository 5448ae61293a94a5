//! Folio Core - Domain types, configuration, and source resolution.
//!
//! The project list behind the portfolio site can come from three places: an edge
//! proxy, a document store's REST endpoint, or a bundled static file. This crate
//! holds everything about that choice that does not touch the network: the data
//! model, path encoding, eligibility rules, and the [`Resolver`] state machine.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod path;
pub mod policy;
pub mod resolver;
pub mod source;

pub use catalog::{find_project, highlights, section_body, ProjectSection};
pub use config::{
    default_config_path, load_config, FolioConfig, HttpConfig, ProxyConfig, SourceConfig,
    StaticConfig, StaticLocation,
};
pub use error::AppError;
pub use models::{
    decode_records, normalize_to_array, FirmwareVersion, ProjectContent, ProjectRecord, RawPayload,
};
pub use policy::ProxyPolicy;
pub use resolver::{
    AttemptRecord, AttemptStatus, Resolution, ResolutionReport, ResolutionState, Resolver,
    ResolverPolicy,
};
pub use source::{ProjectSource, SourceKind, SourceOutcome};
