//! Client error taxonomy

use fono_common::api::{RecordIssue, ServerFailure};
use thiserror::Error;

/// Per-record sub-errors shown before the remainder is summarised
pub const MAX_RECORD_ISSUES: usize = 5;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can stop an admin action
#[derive(Debug, Error)]
pub enum ClientError {
    /// Blocked before any network call
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// `success: false` or a non-2xx status
    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        details: Vec<String>,
        records: Vec<RecordIssue>,
    },

    /// The action's trigger is disabled while a request is outstanding
    #[error("Another request is already in progress")]
    Busy,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    UnsupportedFile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn server(status: u16, failure: ServerFailure) -> Self {
        ClientError::Server {
            status,
            message: failure.message,
            details: failure.details,
            records: failure.records,
        }
    }

    /// Lines shown to the operator
    ///
    /// Server failures list their details, then at most
    /// [`MAX_RECORD_ISSUES`] rejected records and a count of the rest.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            ClientError::Validation(problems) => problems.clone(),
            ClientError::Server {
                message,
                details,
                records,
                ..
            } => {
                let mut lines = vec![message.clone()];
                lines.extend(details.iter().map(|d| format!("  {}", d)));
                for record in records.iter().take(MAX_RECORD_ISSUES) {
                    lines.push(format!(
                        "  {} - {}: {}",
                        record.isrc,
                        record.titulo,
                        record.erros.join(", ")
                    ));
                }
                if records.len() > MAX_RECORD_ISSUES {
                    lines.push(format!(
                        "  ... e mais {} fonograma(s) com erro",
                        records.len() - MAX_RECORD_ISSUES
                    ));
                }
                lines
            }
            other => vec![other.to_string()],
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<fono_common::Error> for ClientError {
    fn from(e: fono_common::Error) -> Self {
        match e {
            fono_common::Error::Validation(problems) => ClientError::Validation(problems),
            fono_common::Error::InvalidInput(msg) => ClientError::Validation(vec![msg]),
            fono_common::Error::Io(e) => ClientError::Io(e),
            fono_common::Error::Json(e) => ClientError::Decode(e.to_string()),
            fono_common::Error::Config(msg) => ClientError::Config(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(n: usize) -> RecordIssue {
        RecordIssue {
            isrc: format!("BRUM7120{:04}", n),
            titulo: format!("Faixa {}", n),
            erros: vec!["Autores ausentes".to_string()],
        }
    }

    #[test]
    fn test_report_caps_record_issues() {
        let err = ClientError::server(
            400,
            ServerFailure {
                message: "Fonogramas com pendências".to_string(),
                details: vec![],
                records: (0..8).map(issue).collect(),
            },
        );

        let lines = err.report_lines();
        assert_eq!(lines[0], "Fonogramas com pendências");
        assert_eq!(lines.len(), 1 + 5 + 1);
        assert_eq!(lines[6], "  ... e mais 3 fonograma(s) com erro");
    }

    #[test]
    fn test_report_without_overflow_line() {
        let err = ClientError::server(
            400,
            ServerFailure {
                message: "x".to_string(),
                details: vec![],
                records: (0..5).map(issue).collect(),
            },
        );
        assert!(!err.report_lines().iter().any(|l| l.contains("e mais")));
    }

    #[test]
    fn test_common_validation_maps_through() {
        let err: ClientError = fono_common::Error::Validation(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.report_lines(), vec!["a".to_string(), "b".to_string()]);
    }
}
