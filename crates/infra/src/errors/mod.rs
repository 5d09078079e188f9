//! Conversions from external infrastructure errors into domain errors.

use issuearc_domain::IssueArcError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub IssueArcError);

impl From<InfraError> for IssueArcError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<IssueArcError> for InfraError {
    fn from(value: IssueArcError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → IssueArcError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return InfraError(IssueArcError::Network("HTTP request timed out".into()));
        }

        if value.is_connect() {
            return InfraError(IssueArcError::Network("HTTP connection failure".into()));
        }

        if let Some(status) = value.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return InfraError(match code {
                401 | 403 => IssueArcError::Auth(message),
                400..=499 => IssueArcError::InvalidInput(message),
                _ => IssueArcError::Network(message),
            });
        }

        InfraError(IssueArcError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → IssueArcError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(IssueArcError::Storage(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → IssueArcError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(IssueArcError::InvalidInput(format!("invalid JSON: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* csv::Error → IssueArcError */
/* -------------------------------------------------------------------------- */

impl From<csv::Error> for InfraError {
    fn from(value: csv::Error) -> Self {
        InfraError(IssueArcError::Storage(format!("checkpoint file error: {value}")))
    }
}
