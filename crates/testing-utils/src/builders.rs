//! 测试数据构建器，提供合理默认值

use chrono::{DateTime, Utc};
use push_domain::{AuditRecord, AuditStatus, DispatchRequest, JsonMap};
use serde_json::Value;

/// 构建推送历史记录
pub struct AuditRecordBuilder {
    record: AuditRecord,
}

impl AuditRecordBuilder {
    pub fn new() -> Self {
        Self {
            record: AuditRecord {
                id: 0,
                business_type_id: 1,
                platform_code: "W3_TODO".to_string(),
                group_id: Some(1),
                business_key: None,
                request_json: "{}".to_string(),
                response_json: Some(r#"{"success":true}"#.to_string()),
                status: AuditStatus::Success,
                error_message: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_business_type(mut self, business_type_id: i64) -> Self {
        self.record.business_type_id = business_type_id;
        self
    }

    pub fn with_platform(mut self, platform_code: &str) -> Self {
        self.record.platform_code = platform_code.to_string();
        self
    }

    pub fn with_business_key(mut self, business_key: &str) -> Self {
        self.record.business_key = Some(business_key.to_string());
        self
    }

    pub fn with_request(mut self, request: Value) -> Self {
        self.record.request_json = request.to_string();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.record.created_at = created_at;
        self
    }

    pub fn without_group(mut self) -> Self {
        self.record.group_id = None;
        self
    }

    pub fn failed(mut self, error_message: &str) -> Self {
        self.record.status = AuditStatus::Failure;
        self.record.error_message = Some(error_message.to_string());
        self
    }

    pub fn build(self) -> AuditRecord {
        self.record
    }
}

impl Default for AuditRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON对象字面量转为参数映射，非对象时返回空映射
pub fn json_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

/// 构建推送请求
pub fn dispatch_request(business_code: &str, group_id: Option<i64>, params: Value) -> DispatchRequest {
    let request = DispatchRequest::new(business_code).with_params(json_map(params));
    match group_id {
        Some(id) => request.with_group(id),
        None => request,
    }
}
