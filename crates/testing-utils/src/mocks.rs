//! 存储与推送策略的内存实现

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use push_dispatcher::{DeliveryStrategy, PlatformRequest};
use push_domain::{
    AuditRecord, AuditStore, BusinessType, ConfigStore, DeliveryOutcome, JsonMap, Platform,
    PlatformConfig, Recipient,
};
use push_errors::{PushError, PushResult};
use serde_json::{json, Value};

#[derive(Debug, Default)]
struct ConfigData {
    business_types: Vec<BusinessType>,
    platforms: Vec<Platform>,
    configs: Vec<PlatformConfig>,
    groups: HashMap<i64, Vec<Recipient>>,
    next_id: i64,
}

impl ConfigData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// 内存配置存储，查询语义与SQLite实现一致
#[derive(Debug, Clone, Default)]
pub struct MockConfigStore {
    data: Arc<Mutex<ConfigData>>,
    failing: Arc<AtomicBool>,
    queries: Arc<AtomicUsize>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_business_type(&self, code: &str, name: &str) -> i64 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.business_types.push(BusinessType {
            id,
            business_code: code.to_string(),
            business_name: name.to_string(),
        });
        id
    }

    pub fn add_platform(&self, code: &str, name: &str, enabled: bool) {
        self.data.lock().unwrap().platforms.push(Platform {
            platform_code: code.to_string(),
            platform_name: name.to_string(),
            enabled,
        });
    }

    pub fn add_config(&self, business_type_id: i64, platform_code: &str, enabled: bool, config: Value) -> i64 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.configs.push(PlatformConfig {
            id,
            business_type_id,
            platform_code: platform_code.to_string(),
            enabled,
            config_json: config.as_object().cloned().unwrap_or_default(),
        });
        id
    }

    pub fn add_group(&self, members: Vec<Recipient>) -> i64 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.groups.insert(id, members);
        id
    }

    /// 之后的所有查询都返回数据库错误
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 已执行的查询次数
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> PushResult<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PushError::database_error("mock config store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn find_business_type_by_code(&self, code: &str) -> PushResult<Option<BusinessType>> {
        self.check()?;
        let data = self.data.lock().unwrap();
        Ok(data
            .business_types
            .iter()
            .find(|bt| bt.business_code == code)
            .cloned())
    }

    async fn find_enabled_configs_by_business_type(
        &self,
        business_type_id: i64,
    ) -> PushResult<Vec<PlatformConfig>> {
        self.check()?;
        let data = self.data.lock().unwrap();
        Ok(data
            .configs
            .iter()
            .filter(|c| c.business_type_id == business_type_id && c.enabled)
            .cloned()
            .collect())
    }

    async fn find_enabled_platforms_by_codes(&self, codes: &[String]) -> PushResult<Vec<Platform>> {
        self.check()?;
        let data = self.data.lock().unwrap();
        Ok(data
            .platforms
            .iter()
            .filter(|p| p.enabled && codes.contains(&p.platform_code))
            .cloned()
            .collect())
    }

    async fn find_group_members(&self, group_id: i64) -> PushResult<Vec<Recipient>> {
        self.check()?;
        let data = self.data.lock().unwrap();
        Ok(data.groups.get(&group_id).cloned().unwrap_or_default())
    }
}

/// 内存推送历史存储
#[derive(Debug, Clone, Default)]
pub struct MockAuditStore {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MockAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入总是失败的存储
    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    /// 按写入顺序返回全部记录
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditStore for MockAuditStore {
    async fn append(&self, record: &AuditRecord) -> PushResult<i64> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PushError::database_error("mock audit store unavailable"));
        }
        let mut records = self.records.lock().unwrap();
        let mut record = record.clone();
        record.id = records.len() as i64 + 1;
        records.push(record);
        Ok(records.len() as i64)
    }

    async fn list(&self, page: u32, size: u32) -> PushResult<(Vec<AuditRecord>, i64)> {
        let records = self.records.lock().unwrap();
        let mut sorted = records.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let page_items = sorted
            .into_iter()
            .skip(page as usize * size as usize)
            .take(size as usize)
            .collect();
        Ok((page_items, records.len() as i64))
    }

    async fn find_by_id(&self, id: i64) -> PushResult<Option<AuditRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }
}

/// 脚本化策略的行为
#[derive(Debug, Clone)]
pub enum ScriptedBehavior {
    Succeed,
    Fail(String),
    BuildError(String),
    BuildPanic(String),
    ExecutePanic(String),
    /// 执行前等待，用于超时与并发测试
    Slow(Duration),
}

#[derive(Debug, Clone)]
pub struct ScriptedRequest {
    params: JsonMap,
}

impl PlatformRequest for ScriptedRequest {
    fn to_params(&self) -> JsonMap {
        self.params.clone()
    }
}

/// 行为可控的推送策略，记录构建与执行次数
pub struct ScriptedStrategy {
    code: String,
    behavior: ScriptedBehavior,
    builds: AtomicUsize,
    executions: AtomicUsize,
}

impl ScriptedStrategy {
    pub fn new(code: &str, behavior: ScriptedBehavior) -> Self {
        Self {
            code: code.to_string(),
            behavior,
            builds: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn succeeding(code: &str) -> Self {
        Self::new(code, ScriptedBehavior::Succeed)
    }

    pub fn failing(code: &str, reason: &str) -> Self {
        Self::new(code, ScriptedBehavior::Fail(reason.to_string()))
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn execute_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryStrategy for ScriptedStrategy {
    fn platform_code(&self) -> &str {
        &self.code
    }

    fn build_request(
        &self,
        config: &JsonMap,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
    ) -> PushResult<Box<dyn PlatformRequest>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ScriptedBehavior::BuildError(message) => {
                return Err(PushError::invalid_params(&self.code, message.clone()))
            }
            ScriptedBehavior::BuildPanic(message) => panic!("{}", message),
            _ => {}
        }

        let mut params = config.clone();
        for (key, value) in dynamic_params {
            params.insert(key.clone(), value.clone());
        }
        params.insert("platform".to_string(), json!(self.code));
        params.insert("recipients".to_string(), json!(push_domain::employee_nos(recipients)));
        Ok(Box::new(ScriptedRequest { params }))
    }

    async fn execute(&self, _request: &JsonMap) -> DeliveryOutcome {
        self.executions.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ScriptedBehavior::Fail(reason) => DeliveryOutcome::failure(reason.clone()).with_http_status(500),
            ScriptedBehavior::ExecutePanic(message) => panic!("{}", message),
            ScriptedBehavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                DeliveryOutcome::success(format!("{} delivered", self.code))
            }
            _ => DeliveryOutcome::success(format!("{} delivered", self.code))
                .with_http_status(200)
                .with_trace(format!("{}_TRACE", self.code), "{}"),
        }
    }
}
