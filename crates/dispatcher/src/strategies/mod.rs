//! 推送平台策略
//!
//! 每个平台一个实现：负责把配置模板、动态参数和群组成员映射成平台特定的请求，
//! 并执行对外调用。构建失败以 `Err` 返回，执行结果总是一个 `DeliveryOutcome`。

mod w3_todo;
mod webhook;
mod welink_app;

pub use w3_todo::{W3TodoRequest, W3TodoStrategy, W3_TODO_CODE};
pub use webhook::{WebhookRequest, WebhookStrategy, WEBHOOK_CODE};
pub use welink_app::{WeLinkAppRequest, WeLinkAppStrategy, WELINK_APP_CODE};

use async_trait::async_trait;
use push_domain::{DeliveryOutcome, JsonMap, PushError, PushResult, Recipient};
use serde_json::Value;

/// 平台特定的推送请求
pub trait PlatformRequest: Send + Sync + std::fmt::Debug {
    /// 转换为通用键值形式，交给 `execute` 实际调用
    fn to_params(&self) -> JsonMap;

    /// 用于预览展示和历史记录的形式，敏感字段已打码
    fn masked_params(&self) -> JsonMap {
        self.to_params()
    }
}

#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    /// 平台编码，注册表按此查找，必须全局唯一
    fn platform_code(&self) -> &str;

    fn build_request(
        &self,
        config: &JsonMap,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
    ) -> PushResult<Box<dyn PlatformRequest>>;

    /// 执行推送，内部失败以 `success: false` 的结果返回
    async fn execute(&self, request: &JsonMap) -> DeliveryOutcome;
}

#[derive(Debug, Clone, Copy)]
enum FieldSource {
    Config,
    Params,
}

/// 按字段读取配置模板或动态参数，`null` 与缺失同样处理
pub(crate) struct FieldReader<'a> {
    platform: &'a str,
    source: FieldSource,
    map: &'a JsonMap,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn config(platform: &'a str, map: &'a JsonMap) -> Self {
        Self {
            platform,
            source: FieldSource::Config,
            map,
        }
    }

    pub(crate) fn params(platform: &'a str, map: &'a JsonMap) -> Self {
        Self {
            platform,
            source: FieldSource::Params,
            map,
        }
    }

    pub(crate) fn opt_str(&self, key: &str) -> PushResult<Option<String>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.type_error(key, "a string", other)),
        }
    }

    pub(crate) fn str_or(&self, key: &str, default: &str) -> PushResult<String> {
        Ok(self
            .opt_str(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub(crate) fn required_str(&self, key: &str) -> PushResult<String> {
        match self.opt_str(key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(self.error(format!("{key} is required"))),
        }
    }

    pub(crate) fn opt_object(&self, key: &str) -> PushResult<Option<&'a JsonMap>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj)),
            Some(other) => Err(self.type_error(key, "an object", other)),
        }
    }

    fn type_error(&self, key: &str, expected: &str, found: &Value) -> PushError {
        self.error(format!("{key} must be {expected}, got {found}"))
    }

    fn error(&self, message: String) -> PushError {
        match self.source {
            FieldSource::Config => PushError::invalid_config(self.platform, message),
            FieldSource::Params => PushError::invalid_params(self.platform, message),
        }
    }
}

/// 8位随机十六进制串，用于生成任务ID、模拟追踪ID
pub(crate) fn short_uuid() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_field_reader_treats_null_as_absent() {
        let params = map(json!({"taskTitle": null, "taskState": "2"}));
        let reader = FieldReader::params("W3_TODO", &params);

        assert_eq!(reader.opt_str("taskTitle").unwrap(), None);
        assert_eq!(reader.str_or("taskTitle", "默认").unwrap(), "默认");
        assert_eq!(reader.str_or("taskState", "1").unwrap(), "2");
    }

    #[test]
    fn test_field_reader_rejects_wrong_shape() {
        let config = map(json!({"appName": 42}));
        let err = FieldReader::config("W3_TODO", &config)
            .opt_str("appName")
            .unwrap_err();
        assert!(matches!(err, PushError::InvalidConfig { .. }));

        let params = map(json!({"taskTitle": ["a"]}));
        let err = FieldReader::params("W3_TODO", &params)
            .opt_str("taskTitle")
            .unwrap_err();
        assert!(matches!(err, PushError::InvalidParams { .. }));
    }

    #[test]
    fn test_required_str_rejects_blank() {
        let config = map(json!({"url": "  "}));
        assert!(FieldReader::config("WEBHOOK", &config)
            .required_str("url")
            .is_err());
    }

    #[test]
    fn test_short_uuid_is_hex() {
        let id = short_uuid();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, short_uuid());
    }
}
