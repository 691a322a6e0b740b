use std::sync::Arc;

use chrono::Utc;
use push_domain::{AuditRecord, AuditStatus, AuditStore, DeliveryOutcome};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

/// 推送历史归属：业务类型、群组与调用方业务键
#[derive(Debug, Clone, Copy)]
pub struct AuditTarget<'a> {
    pub business_type_id: i64,
    pub group_id: Option<i64>,
    pub business_key: Option<&'a str>,
}

/// 为每次平台推送尝试写入一条历史记录
///
/// 写入失败只记录日志，不影响推送结果。
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub fn build_record(
        target: AuditTarget<'_>,
        platform_code: &str,
        request_params: &Value,
        outcome: &DeliveryOutcome,
    ) -> AuditRecord {
        AuditRecord {
            id: 0,
            business_type_id: target.business_type_id,
            platform_code: platform_code.to_string(),
            group_id: target.group_id,
            business_key: target.business_key.map(str::to_string),
            request_json: to_json_or_debug(request_params),
            response_json: Some(to_json_or_debug(outcome)),
            status: AuditStatus::from_success(outcome.success),
            error_message: (!outcome.success).then(|| outcome.message.clone()),
            created_at: Utc::now(),
        }
    }

    /// 返回存储分配的记录ID，写入失败时返回 `None`
    pub async fn record(
        &self,
        target: AuditTarget<'_>,
        platform_code: &str,
        request_params: &Value,
        outcome: &DeliveryOutcome,
    ) -> Option<i64> {
        let record = Self::build_record(target, platform_code, request_params, outcome);
        match self.store.append(&record).await {
            Ok(id) => {
                debug!("写入推送历史: id={}, 平台={}", id, platform_code);
                Some(id)
            }
            Err(e) => {
                error!("写入推送历史失败: 平台={}, 错误={}", platform_code, e);
                None
            }
        }
    }
}

fn to_json_or_debug<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target() -> AuditTarget<'static> {
        AuditTarget {
            business_type_id: 7,
            group_id: Some(3),
            business_key: Some("ORDER-1"),
        }
    }

    #[test]
    fn test_success_record_has_no_error_message() {
        let outcome = DeliveryOutcome::success("W3代办推送成功").with_trace("W3_TASK_1", "{}");
        let record =
            AuditRecorder::build_record(target(), "W3_TODO", &json!({"taskTitle": "t"}), &outcome);

        assert!(record.is_success());
        assert_eq!(record.business_type_id, 7);
        assert_eq!(record.group_id, Some(3));
        assert_eq!(record.business_key.as_deref(), Some("ORDER-1"));
        assert_eq!(record.request_json, r#"{"taskTitle":"t"}"#);
        assert!(record.error_message.is_none());

        let response: Value = serde_json::from_str(record.response_json.as_deref().unwrap()).unwrap();
        assert_eq!(response["traceId"], "W3_TASK_1");
    }

    #[test]
    fn test_failure_record_keeps_message() {
        let outcome = DeliveryOutcome::failure("platform timed out");
        let record = AuditRecorder::build_record(target(), "WEBHOOK", &json!({}), &outcome);

        assert_eq!(record.status, AuditStatus::Failure);
        assert_eq!(record.error_message.as_deref(), Some("platform timed out"));
    }
}
