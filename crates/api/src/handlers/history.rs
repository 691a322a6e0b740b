use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    response::{ApiResponse, PaginatedResponse},
    routes::AppState,
};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// 推送历史查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryQueryParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl HistoryQueryParams {
    /// 返回 (页码, 每页条数)，每页条数限制在 1..=100
    pub fn normalized(&self) -> (u32, u32) {
        let size = self
            .size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (self.page.unwrap_or(0), size)
    }
}

/// 分页查询推送历史，按创建时间倒序
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let (page, size) = params.normalized();
    let (records, total) = state.audit_store.list(page, size).await?;
    Ok(ApiResponse::success(PaginatedResponse::new(
        records,
        total,
        i64::from(page),
        i64::from(size),
    )))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .audit_store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("push history {id} not found")))?;
    Ok(ApiResponse::success(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_and_cap() {
        let params = HistoryQueryParams {
            page: None,
            size: None,
        };
        assert_eq!(params.normalized(), (0, 20));

        let params = HistoryQueryParams {
            page: Some(3),
            size: Some(1000),
        };
        assert_eq!(params.normalized(), (3, 100));

        let params = HistoryQueryParams {
            page: Some(1),
            size: Some(0),
        };
        assert_eq!(params.normalized(), (1, 1));
    }
}
