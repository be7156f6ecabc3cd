use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{sandbox::SandboxInfo, PreviewboxError};

//--------------------------------------------------------------------------------------------------
// Types: Requests
//--------------------------------------------------------------------------------------------------

/// Request body for running a command in a sandbox
#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    /// Raw command line, split on whitespace
    pub command: String,
}

//--------------------------------------------------------------------------------------------------
// Types: Responses
//--------------------------------------------------------------------------------------------------

/// Response body for a spawned sandbox
#[derive(Debug, Serialize, Deserialize)]
pub struct SpawnResponse {
    /// Sandbox id
    pub id: String,

    /// Hostname the sandbox is routed under
    pub hostname: String,

    /// Preview address of the sandbox
    pub preview: String,
}

/// Response body for a stopped sandbox
#[derive(Debug, Serialize, Deserialize)]
pub struct StopResponse {
    /// Human-readable acknowledgement naming the sandbox
    pub message: String,
}

/// Response body for an executed command
#[derive(Debug, Serialize, Deserialize)]
pub struct ExecResponse {
    /// Combined stdout and stderr
    pub output: String,
}

/// Response body for listing sandboxes
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    /// Registered sandboxes, oldest first
    pub sandboxes: Vec<SandboxInfo>,
}

//--------------------------------------------------------------------------------------------------
// Types: Error Response
//--------------------------------------------------------------------------------------------------

/// Standard error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub code: u16,

    /// Error message
    pub message: String,

    /// Error type for categorizing errors
    pub error_type: ErrorType,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Invalid request parameters or body
    ValidationError,

    /// Sandbox not registered
    NotFound,

    /// Program not on the allow-list
    CommandRejected,

    /// Sandbox could not be created or started
    ProvisionError,

    /// Command could not be run in the sandbox
    ExecError,

    /// Internal server errors
    InternalError,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SpawnResponse {
    /// Describes a freshly spawned sandbox
    pub fn new(sandbox: &SandboxInfo) -> Self {
        Self {
            id: sandbox.get_id().clone(),
            hostname: sandbox.get_hostname().clone(),
            preview: sandbox.preview_url(),
        }
    }
}

impl StopResponse {
    /// Acknowledges the teardown of sandbox `id`
    pub fn stopped(id: &str) -> Self {
        Self {
            message: format!("Sandbox {id} stopped and removed successfully"),
        }
    }
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: u16, message: String, error_type: ErrorType) -> Self {
        Self {
            code,
            message,
            error_type,
            details: None,
        }
    }

    /// Add details to the error response, ignoring details for 500-level errors
    pub fn with_details(mut self, details: String) -> Self {
        if self.code < 500 {
            self.details = Some(details);
        }
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<PreviewboxError> for ErrorResponse {
    fn from(error: PreviewboxError) -> Self {
        let (code, message, error_type) = match &error {
            PreviewboxError::NotFound(_) => (404, "Sandbox not found", ErrorType::NotFound),
            PreviewboxError::CommandRejected(_) => {
                (403, "Command not allowed", ErrorType::CommandRejected)
            }
            PreviewboxError::Provision(_) => {
                (500, "Failed to start sandbox", ErrorType::ProvisionError)
            }
            PreviewboxError::Exec { .. } => {
                (500, "Failed to execute command", ErrorType::ExecError)
            }
            _ => (500, "Internal server error", ErrorType::InternalError),
        };

        ErrorResponse::new(code, message.to_string(), error_type).with_details(error.to_string())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_carry_details() {
        let response = ErrorResponse::from(PreviewboxError::CommandRejected("rm".into()));
        assert_eq!(response.code, 403);
        assert_eq!(response.error_type, ErrorType::CommandRejected);
        assert_eq!(
            response.details.as_deref(),
            Some("command not allowed: \"rm\"")
        );

        let response = ErrorResponse::from(PreviewboxError::NotFound("abc".into()));
        assert_eq!(response.code, 404);
        assert_eq!(response.details.as_deref(), Some("sandbox not found: abc"));
    }

    #[test]
    fn test_server_errors_hide_internals() {
        let cause = PreviewboxError::custom(anyhow::anyhow!("/var/run/docker.sock: denied"));

        let response = ErrorResponse::from(PreviewboxError::provision(cause));
        assert_eq!(response.code, 500);
        assert_eq!(response.error_type, ErrorType::ProvisionError);
        assert_eq!(response.message, "Failed to start sandbox");
        assert!(response.details.is_none());

        let cause = PreviewboxError::custom(anyhow::anyhow!("exec setup failed"));
        let response = ErrorResponse::from(PreviewboxError::exec("abc", cause));
        assert_eq!(response.code, 500);
        assert_eq!(response.error_type, ErrorType::ExecError);
        assert!(response.details.is_none());
    }
}
