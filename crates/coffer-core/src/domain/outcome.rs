//! Service response: the structured result returned to callers.
//!
//! Callers branch on `status`; nothing else crosses the service boundary.
//! `http_status` is the HTTP-equivalent classification the API layer forwards.

use serde::{Deserialize, Serialize};

use super::ids::ArtifactId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpStatus {
    Ok,
    BadRequest,
    PayloadTooLarge,
    ServiceUnavailable,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::BadRequest => 400,
            HttpStatus::PayloadTooLarge => 413,
            HttpStatus::ServiceUnavailable => 503,
        }
    }
}

/// Result of one `execute` call.
///
/// - `success` with artifacts: records were created
/// - `success` without artifacts: idempotent replay, nothing changed
/// - `error`: nothing was persisted; `message` says why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub status: Status,
    pub http_status: HttpStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactId>,
}

impl ServiceResponse {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            http_status: HttpStatus::Ok,
            message: None,
            artifacts: Vec::new(),
        }
    }

    pub fn error(http_status: HttpStatus, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            http_status,
            message: Some(message.into()),
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactId>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
