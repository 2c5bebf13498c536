// HTTP wire types shared by the worker's API and the client transport
//
// Errors travel as {error, code, status?, expression?}; `code` is the stable
// EngineError kind and the optional fields carry the variant's structured data.

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, ExecutionStatus};

/// Header carrying the namespace on every `/v1` request
pub const NAMESPACE_HEADER: &str = "temporal-namespace";

/// Body of `POST /v1/workflows/:id/signals/:name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Body of `POST /v1/workflows/:id/cancel` and `/terminate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /v1/schedules/:id/pause` and `/unpause`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// Response of `GET /v1/workflows/:id/result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: serde_json::Value,
}

/// Query of `GET /v1/schedules`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSchedulesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default)]
    pub page_size: usize,
}

/// Standard error response for API endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
    /// Stable error kind, see [`EngineError::code`]
    pub code: String,
    /// Terminal status, for `terminal_state`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    /// Rejected expression, for `invalid_cron`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl ErrorResponse {
    /// Rebuild the engine error this response was made from
    pub fn into_error(self) -> EngineError {
        match (self.code.as_str(), self.status) {
            ("connection", _) => EngineError::Connection(self.error),
            ("not_found", _) => EngineError::NotFound(self.error),
            ("already_exists", _) => EngineError::AlreadyExists(self.error),
            ("invalid_cron", _) => EngineError::InvalidCron {
                expression: self.expression.unwrap_or_default(),
                reason: self.error,
            },
            ("terminal_state", Some(status)) => EngineError::TerminalState {
                status,
                cause: self.error,
            },
            ("invalid_argument", _) => EngineError::InvalidArgument(self.error),
            ("unauthorized", _) => EngineError::Unauthorized(self.error),
            _ => EngineError::Internal(self.error),
        }
    }
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        let (error, status, expression) = match err {
            EngineError::Connection(m)
            | EngineError::NotFound(m)
            | EngineError::AlreadyExists(m)
            | EngineError::InvalidArgument(m)
            | EngineError::Unauthorized(m)
            | EngineError::Internal(m) => (m.clone(), None, None),
            EngineError::InvalidCron { expression, reason } => {
                (reason.clone(), None, Some(expression.clone()))
            }
            EngineError::TerminalState { status, cause } => (cause.clone(), Some(*status), None),
        };
        Self {
            error,
            code: err.code().to_string(),
            status,
            expression,
        }
    }
}

impl EngineError {
    /// HTTP status code the API answers with for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyExists(_) => 409,
            Self::InvalidCron { .. } | Self::InvalidArgument(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::TerminalState { .. } => 422,
            Self::Connection(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}
