use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use push_dispatcher::DispatchOrchestrator;
use push_domain::AuditStore;

use crate::handlers::{
    health::health_check,
    history::{get_history, list_history},
    push::{execute_push, preview_push},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DispatchOrchestrator>,
    pub audit_store: Arc<dyn AuditStore>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/push/preview", post(preview_push))
        .route("/api/push/execute", post(execute_push))
        .route("/api/push/history", get(list_history))
        .route("/api/push/history/{id}", get(get_history))
        .with_state(state)
}
