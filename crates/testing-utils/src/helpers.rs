//! 常用业务场景夹具

use std::sync::Arc;
use std::time::Duration;

use push_dispatcher::{
    DeliveryStrategy, DispatchOptions, DispatchOrchestrator, StrategyRegistry,
};
use push_domain::Recipient;
use serde_json::json;

use crate::mocks::{MockAuditStore, MockConfigStore};

pub const ORDER_CREATED: &str = "ORDER_CREATED";

/// 订单创建场景的预置数据
pub struct OrderCreatedFixture {
    pub config_store: MockConfigStore,
    pub audit_store: MockAuditStore,
    pub business_type_id: i64,
    pub group_id: i64,
}

impl OrderCreatedFixture {
    /// `ORDER_CREATED` 配置 W3_TODO 与 WELINK_APP 两个平台，WELINK_APP 在平台级别停用；
    /// 目标群组有两名成员
    pub fn new() -> Self {
        let config_store = MockConfigStore::new();
        config_store.add_platform("W3_TODO", "W3待办", true);
        config_store.add_platform("WELINK_APP", "WeLink应用号", false);

        let business_type_id = config_store.add_business_type(ORDER_CREATED, "订单创建");
        config_store.add_config(
            business_type_id,
            "W3_TODO",
            true,
            json!({"appName": "OrderSystem", "appURL": "https://w3.example.com", "type": "todo"}),
        );
        config_store.add_config(
            business_type_id,
            "WELINK_APP",
            true,
            json!({"app_id": "order-app", "templateNo": "T100"}),
        );

        let group_id = config_store.add_group(vec![
            Recipient::new("z00512371", "张三"),
            Recipient::new("dwx477491", "李四"),
        ]);

        Self {
            config_store,
            audit_store: MockAuditStore::new(),
            business_type_id,
            group_id,
        }
    }

    pub fn orchestrator(&self, strategies: Vec<Arc<dyn DeliveryStrategy>>) -> DispatchOrchestrator {
        orchestrator_with(
            &self.config_store,
            &self.audit_store,
            strategies,
            DispatchOptions::default(),
        )
    }
}

impl Default for OrderCreatedFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn orchestrator_with(
    config_store: &MockConfigStore,
    audit_store: &MockAuditStore,
    strategies: Vec<Arc<dyn DeliveryStrategy>>,
    options: DispatchOptions,
) -> DispatchOrchestrator {
    DispatchOrchestrator::new(
        Arc::new(config_store.clone()),
        Arc::new(audit_store.clone()),
        Arc::new(StrategyRegistry::new(strategies)),
        options,
    )
}

/// 并发与超时测试使用的调度选项
pub fn options(max_concurrent_platforms: usize, platform_timeout: Duration) -> DispatchOptions {
    DispatchOptions {
        max_concurrent_platforms,
        platform_timeout,
    }
}
