//! Source resolution: walks the fallback chain until one source answers.
//!
//! The chain is an ordered list of [`ProjectSource`]s. Every source but the last is
//! optional: its failures are logged and turned into a transition to the next source.
//! The last source is terminal and its failure is the one reported to the caller.

use crate::error::AppError;
use crate::models::ProjectRecord;
use crate::source::{ProjectSource, SourceKind, SourceOutcome};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// States of a single resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    NotStarted,
    TryingProxy,
    TryingDocStore,
    TryingStatic,
    Resolved,
    ExhaustedFailure,
}

impl ResolutionState {
    pub fn trying(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Proxy => ResolutionState::TryingProxy,
            SourceKind::DocStore => ResolutionState::TryingDocStore,
            SourceKind::StaticFile => ResolutionState::TryingStatic,
        }
    }
}

/// How a single source fared during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    /// Not attempted because the policy ruled it out.
    Skipped(String),
    NotAvailable(String),
    Failed(String),
    /// Answered with this many projects.
    Resolved(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub source: SourceKind,
    pub status: AttemptStatus,
}

impl AttemptRecord {
    pub fn was_attempted(&self) -> bool {
        !matches!(self.status, AttemptStatus::Skipped(_))
    }
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub projects: Vec<ProjectRecord>,
    pub source: SourceKind,
    pub trace: Vec<AttemptRecord>,
}

impl Resolution {
    /// The states the machine passed through, skipped sources excluded.
    pub fn states(&self) -> Vec<ResolutionState> {
        states_for(&self.trace, ResolutionState::Resolved)
    }
}

/// Outcome of a run together with its diagnostic trace.
#[derive(Debug)]
pub struct ResolutionReport {
    pub trace: Vec<AttemptRecord>,
    pub result: Result<(SourceKind, Vec<ProjectRecord>), AppError>,
}

impl ResolutionReport {
    pub fn states(&self) -> Vec<ResolutionState> {
        let last = if self.result.is_ok() {
            ResolutionState::Resolved
        } else {
            ResolutionState::ExhaustedFailure
        };
        states_for(&self.trace, last)
    }

    pub fn attempted(&self, kind: SourceKind) -> bool {
        self.trace
            .iter()
            .any(|record| record.source == kind && record.was_attempted())
    }
}

fn states_for(trace: &[AttemptRecord], last: ResolutionState) -> Vec<ResolutionState> {
    let mut states = vec![ResolutionState::NotStarted];
    states.extend(
        trace
            .iter()
            .filter(|record| record.was_attempted())
            .map(|record| ResolutionState::trying(record.source)),
    );
    states.push(last);
    states
}

/// Which optional sources the current environment permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    pub proxy_allowed: bool,
    pub doc_store_configured: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            proxy_allowed: true,
            doc_store_configured: true,
        }
    }
}

impl ResolverPolicy {
    fn skip_reason(&self, kind: SourceKind) -> Option<&'static str> {
        match kind {
            SourceKind::Proxy if !self.proxy_allowed => {
                Some("proxy disabled for this host or opted out")
            }
            SourceKind::DocStore if !self.doc_store_configured => {
                Some("document store not configured")
            }
            _ => None,
        }
    }
}

/// Drives the fallback chain.
///
/// # Examples
///
/// ```no_run
/// use folio_core::resolver::{Resolver, ResolverPolicy};
/// use std::time::Duration;
///
/// # async fn example(sources: Vec<Box<dyn folio_core::ProjectSource>>) -> Result<(), folio_core::AppError> {
/// let resolver = Resolver::new(sources, ResolverPolicy::default(), Duration::from_secs(8));
/// let resolution = resolver.resolve().await?;
/// println!("{} projects from {}", resolution.projects.len(), resolution.source);
/// # Ok(())
/// # }
/// ```
pub struct Resolver {
    sources: Vec<Box<dyn ProjectSource>>,
    policy: ResolverPolicy,
    attempt_timeout: Duration,
}

impl Resolver {
    pub fn new(
        sources: Vec<Box<dyn ProjectSource>>,
        policy: ResolverPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            policy,
            attempt_timeout,
        }
    }

    pub fn policy(&self) -> ResolverPolicy {
        self.policy
    }

    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Resolves the project list, failing only when the terminal source fails.
    pub async fn resolve(&self) -> Result<Resolution, AppError> {
        let report = self.run().await;
        let (source, projects) = report.result?;
        Ok(Resolution {
            projects,
            source,
            trace: report.trace,
        })
    }

    /// Runs the chain once and returns the full trace regardless of outcome.
    pub async fn run(&self) -> ResolutionReport {
        let mut trace = Vec::with_capacity(self.sources.len());
        let last_index = self.sources.len().saturating_sub(1);

        for (index, source) in self.sources.iter().enumerate() {
            let kind = source.kind();
            let terminal = index == last_index;

            if !terminal {
                if let Some(reason) = self.policy.skip_reason(kind) {
                    debug!(source = %kind, reason, "skipping source");
                    trace.push(AttemptRecord {
                        source: kind,
                        status: AttemptStatus::Skipped(reason.to_string()),
                    });
                    continue;
                }
            }

            debug!(source = %kind, state = ?ResolutionState::trying(kind), "attempting source");
            let outcome = self.attempt_with_deadline(source.as_ref()).await;

            match outcome {
                Ok(SourceOutcome::Resolved(projects)) => {
                    info!(source = %kind, count = projects.len(), "resolved projects");
                    trace.push(AttemptRecord {
                        source: kind,
                        status: AttemptStatus::Resolved(projects.len()),
                    });
                    return ResolutionReport {
                        trace,
                        result: Ok((kind, projects)),
                    };
                }
                Ok(SourceOutcome::NotAvailable(reason)) => {
                    trace.push(AttemptRecord {
                        source: kind,
                        status: AttemptStatus::NotAvailable(reason.clone()),
                    });
                    if terminal {
                        let err = AppError::NoSourceAvailable(format!(
                            "{} not available: {}",
                            kind, reason
                        ));
                        return self.exhausted(kind, err, trace);
                    }
                    warn!(source = %kind, reason = %reason, "source not available, falling back");
                }
                Err(err) => {
                    trace.push(AttemptRecord {
                        source: kind,
                        status: AttemptStatus::Failed(err.to_string()),
                    });
                    if terminal {
                        return self.exhausted(kind, err, trace);
                    }
                    if err.is_fallback_trigger() {
                        warn!(source = %kind, error = %err, "source failed, falling back");
                    } else {
                        error!(source = %kind, error = %err, "unexpected source error, falling back");
                    }
                }
            }
        }

        let err = AppError::NoSourceAvailable("no data source could be attempted".to_string());
        error!(error = %err, "resolution failed");
        ResolutionReport {
            trace,
            result: Err(err),
        }
    }

    async fn attempt_with_deadline(
        &self,
        source: &dyn ProjectSource,
    ) -> Result<SourceOutcome, AppError> {
        match tokio::time::timeout(self.attempt_timeout, source.attempt()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(self.attempt_timeout.as_secs())),
        }
    }

    fn exhausted(
        &self,
        kind: SourceKind,
        err: AppError,
        trace: Vec<AttemptRecord>,
    ) -> ResolutionReport {
        error!(source = %kind, error = %err, "terminal source failed");
        let err = match kind {
            SourceKind::StaticFile => AppError::StaticFileFailed(Box::new(err)),
            _ => err,
        };
        ResolutionReport {
            trace,
            result: Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behavior {
        Projects(Vec<&'static str>),
        NotAvailable,
        Fail,
        Hang,
    }

    struct FakeSource {
        kind: SourceKind,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn boxed(kind: SourceKind, behavior: Behavior) -> (Box<dyn ProjectSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = FakeSource {
                kind,
                behavior,
                calls: calls.clone(),
            };
            (Box::new(source), calls)
        }
    }

    fn record(id: &str) -> ProjectRecord {
        serde_json::from_value(serde_json::json!({ "id": id })).unwrap()
    }

    #[async_trait]
    impl ProjectSource for FakeSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn attempt(&self) -> Result<SourceOutcome, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Projects(ids) => Ok(SourceOutcome::Resolved(
                    ids.iter().map(|id| record(id)).collect(),
                )),
                Behavior::NotAvailable => Ok(SourceOutcome::NotAvailable("probe 404".to_string())),
                Behavior::Fail => Err(AppError::RemoteError {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                    body: String::new(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(SourceOutcome::Resolved(Vec::new()))
                }
            }
        }
    }

    fn chain(
        proxy: Behavior,
        doc_store: Behavior,
        static_file: Behavior,
        policy: ResolverPolicy,
    ) -> (Resolver, [Arc<AtomicUsize>; 3]) {
        let (p, p_calls) = FakeSource::boxed(SourceKind::Proxy, proxy);
        let (d, d_calls) = FakeSource::boxed(SourceKind::DocStore, doc_store);
        let (s, s_calls) = FakeSource::boxed(SourceKind::StaticFile, static_file);
        let resolver = Resolver::new(vec![p, d, s], policy, Duration::from_millis(200));
        (resolver, [p_calls, d_calls, s_calls])
    }

    #[tokio::test]
    async fn test_proxy_success_short_circuits() {
        let (resolver, calls) = chain(
            Behavior::Projects(vec!["p1"]),
            Behavior::Fail,
            Behavior::Fail,
            ResolverPolicy::default(),
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::Proxy);
        assert_eq!(resolution.projects[0].id, "p1");
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
        assert_eq!(
            resolution.states(),
            vec![
                ResolutionState::NotStarted,
                ResolutionState::TryingProxy,
                ResolutionState::Resolved
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_proxy_answer_is_resolved() {
        let (resolver, calls) = chain(
            Behavior::Projects(vec![]),
            Behavior::Projects(vec!["d1"]),
            Behavior::Projects(vec!["s1"]),
            ResolverPolicy::default(),
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::Proxy);
        assert!(resolution.projects.is_empty());
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_doc_store_answer_is_resolved() {
        let (resolver, calls) = chain(
            Behavior::NotAvailable,
            Behavior::Projects(vec![]),
            Behavior::Projects(vec!["s1"]),
            ResolverPolicy::default(),
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::DocStore);
        assert!(resolution.projects.is_empty());
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_policy_skips_proxy_and_doc_store() {
        let policy = ResolverPolicy {
            proxy_allowed: false,
            doc_store_configured: false,
        };
        let (resolver, calls) = chain(
            Behavior::Projects(vec!["p1"]),
            Behavior::Projects(vec!["d1"]),
            Behavior::Projects(vec!["s1"]),
            policy,
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::StaticFile);
        assert_eq!(calls[0].load(Ordering::SeqCst), 0);
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
        assert_eq!(
            resolution.states(),
            vec![
                ResolutionState::NotStarted,
                ResolutionState::TryingStatic,
                ResolutionState::Resolved
            ]
        );
        assert!(matches!(resolution.trace[0].status, AttemptStatus::Skipped(_)));
    }

    #[tokio::test]
    async fn test_failures_fall_through_to_static() {
        let (resolver, calls) = chain(
            Behavior::NotAvailable,
            Behavior::Fail,
            Behavior::Projects(vec!["s1", "s2"]),
            ResolverPolicy::default(),
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::StaticFile);
        assert_eq!(resolution.projects.len(), 2);
        for counter in &calls {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
        assert!(matches!(resolution.trace[1].status, AttemptStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let (resolver, _) = chain(
            Behavior::NotAvailable,
            Behavior::Fail,
            Behavior::Fail,
            ResolverPolicy::default(),
        );
        let report = resolver.run().await;
        let err = report.result.as_ref().unwrap_err();
        assert!(matches!(err, AppError::StaticFileFailed(_)));
        assert!(err.to_string().contains("Failed to load projects.json"));
        assert_eq!(
            report.states().last(),
            Some(&ResolutionState::ExhaustedFailure)
        );
        assert!(report.attempted(SourceKind::DocStore));
    }

    #[tokio::test]
    async fn test_hanging_source_times_out_and_falls_back() {
        let (resolver, _) = chain(
            Behavior::Hang,
            Behavior::Projects(vec!["d1"]),
            Behavior::Fail,
            ResolverPolicy::default(),
        );
        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.source, SourceKind::DocStore);
        match &resolution.trace[0].status {
            AttemptStatus::Failed(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_error() {
        let resolver = Resolver::new(Vec::new(), ResolverPolicy::default(), Duration::from_secs(1));
        assert!(matches!(
            resolver.resolve().await,
            Err(AppError::NoSourceAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_terminal_not_available_is_static_failure() {
        let (resolver, _) = chain(
            Behavior::NotAvailable,
            Behavior::Fail,
            Behavior::NotAvailable,
            ResolverPolicy::default(),
        );
        match resolver.resolve().await {
            Err(AppError::StaticFileFailed(inner)) => {
                assert!(matches!(*inner, AppError::NoSourceAvailable(_)));
                assert!(inner.to_string().contains("probe 404"));
            }
            other => panic!("expected static failure, got {:?}", other.map(|r| r.source)),
        }
    }
}
