use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// 推送调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// 单次推送内并发执行的平台数，1 表示逐个平台顺序执行
    pub max_concurrent_platforms: usize,
    /// 单个平台执行超时（毫秒），超时按执行失败处理
    pub platform_timeout_ms: u64,
    /// 模拟推送后端的网络延迟（毫秒）
    pub mock_delay_ms: u64,
    pub webhook_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_platforms: 1,
            platform_timeout_ms: 10_000,
            mock_delay_ms: 200,
            webhook_timeout_ms: 5_000,
        }
    }
}

impl ConfigValidator for DispatcherConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_count(
            self.max_concurrent_platforms,
            "dispatcher.max_concurrent_platforms",
            64,
        )?;
        ValidationUtils::validate_timeout_ms(
            self.platform_timeout_ms,
            "dispatcher.platform_timeout_ms",
        )?;
        ValidationUtils::validate_timeout_ms(
            self.webhook_timeout_ms,
            "dispatcher.webhook_timeout_ms",
        )?;

        if self.mock_delay_ms >= self.platform_timeout_ms {
            return Err(crate::ConfigError::Validation(
                "dispatcher.mock_delay_ms must be less than platform_timeout_ms".to_string(),
            ));
        }

        Ok(())
    }
}
