//! # Push API
//!
//! 推送调度的HTTP接口层，只做请求解析与响应转换，业务逻辑全部在 `push-dispatcher` 中。
//!
//! ## API 端点
//!
//! - `POST /api/push/preview` - 预览各平台将要发送的请求
//! - `POST /api/push/execute` - 执行推送
//! - `GET /api/push/history` - 分页查询推送历史，`page` 从0开始
//! - `GET /api/push/history/{id}` - 查询单条推送历史
//! - `GET /health` - 健康检查
//!
//! ## 响应格式
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { "businessCode": "ORDER_CREATED", "platforms": [] },
//!   "message": null,
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use push_config::ApiConfig;
use push_dispatcher::DispatchOrchestrator;
use push_domain::AuditStore;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(
    orchestrator: Arc<DispatchOrchestrator>,
    audit_store: Arc<dyn AuditStore>,
    api_config: &ApiConfig,
) -> Router {
    let state = AppState {
        orchestrator,
        audit_store,
    };

    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(
                api_config.request_timeout_seconds,
            )))
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        router.layer(cors_layer(&api_config.cors_origins))
    } else {
        router
    }
}
