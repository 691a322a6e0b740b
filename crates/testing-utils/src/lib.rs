//! # Push Testing Utils
//!
//! 推送系统各crate共享的测试工具：
//!
//! - **内存存储**: `ConfigStore` / `AuditStore` 的内存实现，可模拟存储故障
//! - **脚本化策略**: 行为可控的 `DeliveryStrategy`，用于失败、超时、panic 场景
//! - **测试数据构建器**: 带默认值的实体构建器
//! - **场景夹具**: 常用业务场景的预置数据
//!
//! ```toml
//! [dev-dependencies]
//! push-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
