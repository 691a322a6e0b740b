use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use push_api::create_app;
use push_config::AppConfig;
use push_dispatcher::{default_strategies, DispatchOptions, DispatchOrchestrator, StrategyRegistry};
use push_infrastructure::DatabaseManager;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

/// 推送调度服务：持有数据库、调度器与HTTP路由
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    orchestrator: Arc<DispatchOrchestrator>,
    metrics: Option<PrometheusHandle>,
}

impl Application {
    /// 创建新的应用实例，建表并注册全部推送策略
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let database = DatabaseManager::new(&config.database)
            .await
            .context("创建数据库连接池失败")?;
        database.migrate().await.context("初始化数据库表结构失败")?;

        let strategies =
            default_strategies(&config.dispatcher).context("创建推送策略失败")?;
        let registry = Arc::new(StrategyRegistry::new(strategies));
        info!("已注册推送平台: {:?}", registry.platform_codes());

        let orchestrator = Arc::new(DispatchOrchestrator::new(
            database.config_store(),
            database.audit_store(),
            registry,
            DispatchOptions::from(&config.dispatcher),
        ));

        let metrics = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("安装Prometheus指标记录器失败")?;
            Some(handle)
        } else {
            None
        };

        Ok(Self {
            config,
            database,
            orchestrator,
            metrics,
        })
    }

    /// 组装HTTP路由，启用指标时额外暴露Prometheus端点
    pub fn router(&self) -> Router {
        let app = create_app(
            Arc::clone(&self.orchestrator),
            self.database.audit_store(),
            &self.config.api,
        );

        match &self.metrics {
            Some(handle) => {
                let handle = handle.clone();
                app.route(
                    &self.config.observability.metrics_endpoint,
                    get(move || std::future::ready(handle.render())),
                )
            }
            None => app,
        }
    }

    /// 运行HTTP服务直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .api
            .bind_address
            .parse()
            .with_context(|| format!("无效的监听地址: {}", self.config.api.bind_address))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("绑定地址失败: {addr}"))?;
        info!("API服务器监听地址: {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }

    /// 释放数据库连接
    pub async fn close(&self) {
        self.database.close().await;
    }
}
