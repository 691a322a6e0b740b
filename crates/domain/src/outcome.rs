use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单个平台一次推送尝试的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub success: bool,
    pub message: String,
    pub http_status_code: Option<u16>,
    /// 第三方平台返回的业务码
    pub business_code: Option<String>,
    pub business_message: Option<String>,
    /// 第三方平台追踪ID，例如W3的taskId、WeLink的msgId
    pub trace_id: Option<String>,
    pub response_body: Option<String>,
    pub response_time: DateTime<Utc>,
    pub exception_stack: Option<String>,
}

impl DeliveryOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            http_status_code: None,
            business_code: None,
            business_message: None,
            trace_id: None,
            response_body: None,
            response_time: Utc::now(),
            exception_stack: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>, response_body: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self.response_body = Some(response_body.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status_code = Some(status);
        self
    }

    pub fn with_business(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.business_code = Some(code.into());
        self.business_message = Some(message.into());
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    pub fn with_exception(mut self, stack: impl Into<String>) -> Self {
        self.exception_stack = Some(stack.into());
        self
    }
}

/// 一次推送的整体结论
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateResult {
    pub success: bool,
    pub message: String,
}

impl AggregateResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
