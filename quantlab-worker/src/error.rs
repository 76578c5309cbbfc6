//! Worker errors.

use thiserror::Error;

/// Terminal failure of a worker job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    /// The job panicked; the payload is the panic message.
    #[error("worker job panicked: {0}")]
    JobPanicked(String),
    /// The job returned an engine error.
    #[error("worker job failed: {0}")]
    JobFailed(String),
    /// The worker was torn down before delivering a result.
    #[error("worker dropped before completing")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = WorkerError::JobPanicked("index out of bounds".into());
        assert_eq!(
            err.to_string(),
            "worker job panicked: index out of bounds"
        );
    }
}
