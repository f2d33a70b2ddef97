//! Error types for the NLU crate.

use std::fmt;

/// Errors from talking to an NLU service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NluError {
    /// The remote service refused or failed the request.
    ///
    /// `status` is the HTTP status when a response came back at all.
    RemoteService { status: Option<u16>, message: String },
    /// No response within the configured timeout.
    Timeout,
    /// The response body was not a detect-intent result.
    ResponseParseFailed { reason: String },
    /// The client could not be built from its configuration.
    InvalidConfig { reason: String },
}

impl NluError {
    /// HTTP status reported by the remote service, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteService { status, .. } => *status,
            _ => None,
        }
    }
}

impl fmt::Display for NluError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteService {
                status: Some(status),
                message,
            } => write!(f, "NLU service returned {status}: {message}"),
            Self::RemoteService {
                status: None,
                message,
            } => write!(f, "NLU service unreachable: {message}"),
            Self::Timeout => write!(f, "NLU request timed out"),
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse NLU response: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid NLU configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for NluError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_service_display_includes_status() {
        let err = NluError::RemoteService {
            status: Some(429),
            message: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn transport_failure_has_no_status() {
        let err = NluError::RemoteService {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(err.status(), None);
        assert_eq!(NluError::Timeout.status(), None);
    }
}
