/// Every way a turn or a finalization can fail.
///
/// None of these are recovered from locally; the HTTP layer maps each variant
/// to a status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Completion service failed: {0}")]
    UpstreamCompletion(String),
    #[error("Email delivery failed: {0}")]
    UpstreamEmail(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}
