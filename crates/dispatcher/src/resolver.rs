use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use push_domain::{BusinessType, ConfigStore, Platform, PlatformConfig, PushError, PushResult, Recipient};
use tracing::debug;

/// 从配置存储中解析一次推送所需的业务类型、平台配置和接收人
pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// 返回业务类型及其启用的平台配置，配置可能为空
    pub async fn resolve(&self, business_code: &str) -> PushResult<(BusinessType, Vec<PlatformConfig>)> {
        let business_type = self
            .store
            .find_business_type_by_code(business_code)
            .await?
            .ok_or_else(|| PushError::business_type_not_found(business_code))?;

        let configs: Vec<PlatformConfig> = self
            .store
            .find_enabled_configs_by_business_type(business_type.id)
            .await?
            .into_iter()
            .filter(|config| config.enabled)
            .collect();

        debug!(
            "业务类型 {} 启用的平台配置数: {}",
            business_code,
            configs.len()
        );
        Ok((business_type, configs))
    }

    /// 按编码查询启用的平台，重复编码只查询一次
    pub async fn enabled_platforms(&self, codes: &[String]) -> PushResult<HashMap<String, Platform>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = codes
            .iter()
            .filter(|code| seen.insert(code.as_str()))
            .cloned()
            .collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let platforms = self.store.find_enabled_platforms_by_codes(&unique).await?;
        Ok(platforms
            .into_iter()
            .filter(|platform| platform.enabled && seen.contains(platform.platform_code.as_str()))
            .map(|platform| (platform.platform_code.clone(), platform))
            .collect())
    }

    pub async fn recipients(&self, group_id: i64) -> PushResult<Vec<Recipient>> {
        self.store.find_group_members(group_id).await
    }
}
