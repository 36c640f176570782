use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Step of the claim pipeline that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClaimStage {
    Draft,
    Sign,
    Submit,
}

impl fmt::Display for ClaimStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimStage::Draft => "DraftError",
            ClaimStage::Sign => "SignError",
            ClaimStage::Submit => "SubmitError",
        };
        f.write_str(name)
    }
}

/// A claim that failed at one of its three steps
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage}: {message}")]
pub struct ClaimError {
    pub stage: ClaimStage,
    pub message: String,
}

impl ClaimError {
    pub fn draft(message: impl fmt::Display) -> Self {
        Self { stage: ClaimStage::Draft, message: message.to_string() }
    }

    pub fn sign(message: impl fmt::Display) -> Self {
        Self { stage: ClaimStage::Sign, message: message.to_string() }
    }

    pub fn submit(message: impl fmt::Display) -> Self {
        Self { stage: ClaimStage::Submit, message: message.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{message}")]
    Transport {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Claim(#[from] ClaimError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation { message: message.into(), details: None }
    }

    pub fn invalid_field(message: impl Into<String>, details: impl fmt::Display) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn transport(message: impl Into<String>, details: impl fmt::Display) -> Self {
        ApiError::Transport {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Validation { details, .. } | ApiError::Transport { details, .. } => {
                details.clone()
            }
            ApiError::Claim(e) => Some(e.message.clone()),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation { message, .. } | ApiError::Transport { message, .. } => {
                message.clone()
            }
            ApiError::Configuration(_) => "Server configuration error".to_string(),
            ApiError::Claim(e) => format!("Claim failed at {}", e.stage),
            other => other.to_string(),
        }
    }
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            // A missing pool is reported as a server error by the pool-by-mint route.
            ApiError::NotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Configuration(_) | ApiError::Transport { .. } | ApiError::Claim(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ApiError::Configuration(missing) => Some(missing.clone()),
            other => other.details(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.message(),
            details,
        })
    }
}
