use axum::{extract::State, response::IntoResponse, Json};
use push_domain::DispatchRequest;
use tracing::info;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

fn check_business_code(request: &DispatchRequest) -> ApiResult<()> {
    if request.business_code.trim().is_empty() {
        return Err(crate::error::ApiError::BadRequest(
            "businessCode is required".to_string(),
        ));
    }
    Ok(())
}

/// 预览推送请求
pub async fn preview_push(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> ApiResult<impl IntoResponse> {
    check_business_code(&request)?;
    let preview = state.orchestrator.preview(&request).await?;
    Ok(ApiResponse::success(preview))
}

/// 执行推送，整体结论总是以200返回
pub async fn execute_push(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> ApiResult<impl IntoResponse> {
    check_business_code(&request)?;
    info!(
        "收到推送请求: 业务={}, 群组={:?}, 业务键={:?}",
        request.business_code, request.group_id, request.business_key
    );
    let result = state.orchestrator.execute(&request).await;
    Ok(ApiResponse::verdict(result.success, result.message))
}
