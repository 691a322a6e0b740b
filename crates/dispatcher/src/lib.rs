//! 推送调度核心
//!
//! 根据业务编码解析启用的平台配置，按平台策略构建请求并执行推送，
//! 单平台失败互不影响，最终汇总为一个结果并为每次尝试写入推送历史。

pub mod audit;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod strategies;
pub mod template;

pub use audit::{AuditRecorder, AuditTarget};
pub use orchestrator::{aggregate, AttemptResult, DispatchOptions, DispatchOrchestrator};
pub use registry::{default_strategies, StrategyRegistry};
pub use resolver::ConfigResolver;
pub use strategies::*;
pub use push_domain::JsonMap;
pub use template::TemplateMerger;
