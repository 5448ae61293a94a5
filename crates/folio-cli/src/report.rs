use folio_core::AppError;

/// Short error returned to `main` once the failure notice has been printed.
pub const ALL_SOURCES_FAILED: &str = "all data sources failed";

/// The notice shown when the project list cannot be loaded.
pub fn failure_notice(e: &AppError) -> String {
    format!("Failed to load projects data.\n   {}", e.user_message())
}

/// Prints the notice to stderr and returns the error `main` exits with.
///
/// The returned error does not repeat the cause, which the notice already shows.
pub fn report_failure(e: &AppError) -> anyhow::Error {
    eprintln!("{}", failure_notice(e));
    anyhow::anyhow!(ALL_SOURCES_FAILED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_404() -> AppError {
        AppError::StaticFileFailed(Box::new(AppError::RemoteError {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "no such file".to_string(),
        }))
    }

    #[test]
    fn test_notice_explains_cause() {
        let notice = failure_notice(&static_404());
        assert!(notice.starts_with("Failed to load projects data."));
        assert!(notice.contains("Failed to load projects.json"));
        assert!(notice.contains("not found"));
    }

    #[test]
    fn test_returned_error_does_not_repeat_cause() {
        let err = report_failure(&static_404());
        let rendered = format!("{:?}", err);
        assert_eq!(err.to_string(), ALL_SOURCES_FAILED);
        assert!(!rendered.contains("projects.json"));
    }
}
