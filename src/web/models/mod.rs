use serde::Serialize;
use utoipa::ToSchema;

pub mod subscription_models;

pub use subscription_models::*;

pub const SUCCESS_MESSAGE: &str = "success";

/// Uniform response envelope: `{status, message, data?}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Envelope without a payload, as sent by delete and by every error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: bool,
    #[schema(example = "subscription not found")]
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: true,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload, as returned by delete.
    pub fn ok() -> Self {
        Self {
            status: true,
            message: SUCCESS_MESSAGE.to_string(),
            data: None,
        }
    }
}
