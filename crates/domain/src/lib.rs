pub mod entities;
pub mod outcome;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use outcome::*;
pub use push_errors::{PushError, PushResult};
pub use repositories::*;
pub use value_objects::*;

/// 平台配置模板、动态参数、请求参数统一使用的 JSON 对象类型
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
