//! The seam between the resolver and concrete data sources.

use crate::error::AppError;
use crate::models::ProjectRecord;
use async_trait::async_trait;
use std::fmt;

/// The three places a project list can come from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Proxy,
    DocStore,
    StaticFile,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Proxy => "proxy",
            SourceKind::DocStore => "doc-store",
            SourceKind::StaticFile => "static-file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a source attempt produced when it did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// The source answered authoritatively, possibly with zero projects.
    Resolved(Vec<ProjectRecord>),
    /// The source is optional and not present on this deployment.
    NotAvailable(String),
}

/// A single data source in the fallback chain.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Performs one attempt. No retries; the resolver decides what happens next.
    async fn attempt(&self) -> Result<SourceOutcome, AppError>;
}
