use thiserror::Error;

/// One source that could not be fetched during a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no sources selected for comparison")]
    NoSources,

    #[error("all sources failed: {}", describe_failures(.failures))]
    AllSourcesFailed { failures: Vec<SourceFailure> },
}

fn describe_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.source, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
