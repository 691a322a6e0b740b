use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use push_config::DispatcherConfig;
use push_domain::PushResult;
use tracing::{info, warn};

use crate::strategies::{DeliveryStrategy, W3TodoStrategy, WeLinkAppStrategy, WebhookStrategy};

/// 平台编码到策略实现的映射，启动时构建后只读
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn DeliveryStrategy>>,
    duplicates: Vec<String>,
}

impl StrategyRegistry {
    /// 编码重复时保留先注册的实现
    pub fn new(strategies: Vec<Arc<dyn DeliveryStrategy>>) -> Self {
        let mut map: HashMap<String, Arc<dyn DeliveryStrategy>> = HashMap::new();
        let mut duplicates = Vec::new();

        for strategy in strategies {
            let code = strategy.platform_code().to_string();
            if map.contains_key(&code) {
                warn!("平台编码重复注册，忽略后者: {}", code);
                duplicates.push(code);
                continue;
            }
            info!("注册推送策略: {}", code);
            map.insert(code, strategy);
        }

        Self {
            strategies: map,
            duplicates,
        }
    }

    pub fn find(&self, platform_code: &str) -> Option<Arc<dyn DeliveryStrategy>> {
        self.strategies.get(platform_code).cloned()
    }

    pub fn platform_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.strategies.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// 注册时被忽略的重复编码
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// 内置策略：W3待办、WeLink应用号、通用Webhook
pub fn default_strategies(config: &DispatcherConfig) -> PushResult<Vec<Arc<dyn DeliveryStrategy>>> {
    let mock_delay = Duration::from_millis(config.mock_delay_ms);
    let webhook = WebhookStrategy::new(Duration::from_millis(config.webhook_timeout_ms))?;

    Ok(vec![
        Arc::new(W3TodoStrategy::new(mock_delay)),
        Arc::new(WeLinkAppStrategy::new(mock_delay)),
        Arc::new(webhook),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{W3_TODO_CODE, WEBHOOK_CODE, WELINK_APP_CODE};

    #[test]
    fn test_default_registry_contains_builtin_platforms() {
        let registry =
            StrategyRegistry::new(default_strategies(&DispatcherConfig::default()).unwrap());

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.platform_codes(),
            vec![W3_TODO_CODE, WEBHOOK_CODE, WELINK_APP_CODE]
        );
        assert!(registry.duplicates().is_empty());
        assert!(registry.find("DINGTALK").is_none());
    }

    #[test]
    fn test_duplicate_code_keeps_first() {
        let first: Arc<dyn DeliveryStrategy> = Arc::new(W3TodoStrategy::new(Duration::ZERO));
        let second: Arc<dyn DeliveryStrategy> =
            Arc::new(W3TodoStrategy::new(Duration::from_secs(1)));
        let registry = StrategyRegistry::new(vec![first.clone(), second]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.duplicates(), &[W3_TODO_CODE.to_string()]);
        let found = registry.find(W3_TODO_CODE).unwrap();
        assert!(Arc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_empty_registry() {
        let registry = StrategyRegistry::new(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.find(W3_TODO_CODE).is_none());
    }
}
