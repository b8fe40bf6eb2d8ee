//! Optimization error types.
//!
//! Recoverable failures (`NotFound`, `DownloadFailure`) never leave the
//! resource that produced them: they become the resource's ignore reason.
//! Everything else aborts the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to download {url}: {message}")]
    DownloadFailure { url: String, message: String },

    #[error("integrity check failed for {target}:\n\tdeclared: {declared}\n\tactual: {actual}")]
    IntegrityMismatch {
        target: String,
        declared: String,
        actual: String,
    },

    #[error("failed to minify {}:\n{message}", file.display())]
    Minify { file: PathBuf, message: String },

    #[error("failed to read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to write `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),

    #[error("invalid SRI token: {0}")]
    InvalidSri(String),

    #[error("source map {}: {message}", file.display())]
    SourceMap { file: PathBuf, message: String },

    #[error("failed to parse html `{}`: {message}", file.display())]
    Parse { file: PathBuf, message: String },
}

impl OptimizeError {
    /// Failures that only disable optimization of one resource.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::DownloadFailure { .. })
    }

    pub fn download(url: impl Into<String>, message: impl ToString) -> Self {
        Self::DownloadFailure {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = OptimizeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_recoverable_classification() {
        assert!(OptimizeError::NotFound(PathBuf::from("a.js")).is_recoverable());
        assert!(OptimizeError::download("https://x/a.js", "timeout").is_recoverable());

        let fatal = OptimizeError::Write(
            PathBuf::from("a.js"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!fatal.is_recoverable());
        assert!(
            !OptimizeError::Minify {
                file: PathBuf::from("a.js"),
                message: "unexpected token".into(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_integrity_display() {
        let err = OptimizeError::IntegrityMismatch {
            target: "https://cdn.example/lib.js".into(),
            declared: "sha384-AAA".into(),
            actual: "sha384-BBB".into(),
        };
        let display = err.to_string();
        assert!(display.contains("lib.js"));
        assert!(display.contains("sha384-AAA"));
        assert!(display.contains("sha384-BBB"));
    }
}
