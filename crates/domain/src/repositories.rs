//! 推送领域仓储抽象
//!
//! 调度核心只通过这两个接口访问外部存储：配置读取与推送历史追加。

use async_trait::async_trait;
use push_errors::PushResult;

use crate::entities::{AuditRecord, BusinessType, Platform, PlatformConfig, Recipient};

/// 推送配置存储，调度核心只读
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn find_business_type_by_code(&self, code: &str) -> PushResult<Option<BusinessType>>;
    async fn find_enabled_configs_by_business_type(
        &self,
        business_type_id: i64,
    ) -> PushResult<Vec<PlatformConfig>>;
    /// 返回已启用且编码在 `codes` 中的平台
    async fn find_enabled_platforms_by_codes(&self, codes: &[String])
        -> PushResult<Vec<Platform>>;
    async fn find_group_members(&self, group_id: i64) -> PushResult<Vec<Recipient>>;
}

/// 推送历史存储，只追加
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// 写入一条记录，返回存储分配的ID
    async fn append(&self, record: &AuditRecord) -> PushResult<i64>;
    /// 按创建时间倒序分页，`page` 从0开始，返回 (当前页, 总数)
    async fn list(&self, page: u32, size: u32) -> PushResult<(Vec<AuditRecord>, i64)>;
    async fn find_by_id(&self, id: i64) -> PushResult<Option<AuditRecord>>;
}
