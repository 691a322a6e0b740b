use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use push_errors::PushError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("推送错误: {0}")]
    Push(#[from] PushError),

    #[error("未找到资源: {0}")]
    NotFound(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Push(err) if err.is_not_found() => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Push(PushError::InvalidConfig { .. } | PushError::InvalidParams { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::Push(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::NotFound(message) | ApiError::BadRequest(message) => message.clone(),
            ApiError::Push(PushError::BusinessTypeNotFound { code }) => {
                format!("business type not found: {code}")
            }
            ApiError::Push(err) => err.user_message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        if status.is_server_error() {
            error!("请求处理失败: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.client_message(),
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
