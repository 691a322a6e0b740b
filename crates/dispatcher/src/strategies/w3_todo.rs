use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use push_domain::{employee_nos, DeliveryOutcome, JsonMap, PushResult, Recipient};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::{short_uuid, DeliveryStrategy, FieldReader, PlatformRequest};

pub const W3_TODO_CODE: &str = "W3_TODO";

/// W3待办请求，字段名与W3待办接口保持一致
#[derive(Debug, Clone, Serialize)]
pub struct W3TodoRequest {
    #[serde(rename = "appName")]
    pub app_name: Option<String>,
    #[serde(rename = "appURL")]
    pub app_url: Option<String>,
    #[serde(rename = "type")]
    pub todo_type: Option<String>,
    pub reserve1: String,
    pub reserve2: Option<String>,
    pub reserve10: String,
    #[serde(rename = "taskDesc")]
    pub task_desc: String,
    #[serde(rename = "taskURL")]
    pub task_url: String,
    #[serde(rename = "taskTitle")]
    pub task_title: String,
    #[serde(rename = "taskCreateUser")]
    pub task_create_user: String,
    #[serde(rename = "taskCreateUserName")]
    pub task_create_user_name: String,
    #[serde(rename = "taskState")]
    pub task_state: String,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(rename = "taskCreateTime")]
    pub task_create_time: String,
    #[serde(rename = "receiverUserAccounts")]
    pub receiver_user_accounts: Vec<String>,
    #[serde(rename = "copyUserAccounts")]
    pub copy_user_accounts: Option<Vec<String>>,
}

impl PlatformRequest for W3TodoRequest {
    fn to_params(&self) -> JsonMap {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => JsonMap::new(),
        }
    }
}

/// W3待办推送，当前为模拟调用
pub struct W3TodoStrategy {
    mock_delay: Duration,
}

impl W3TodoStrategy {
    pub fn new(mock_delay: Duration) -> Self {
        Self { mock_delay }
    }
}

#[async_trait]
impl DeliveryStrategy for W3TodoStrategy {
    fn platform_code(&self) -> &str {
        W3_TODO_CODE
    }

    fn build_request(
        &self,
        config: &JsonMap,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
    ) -> PushResult<Box<dyn PlatformRequest>> {
        let cfg = FieldReader::config(W3_TODO_CODE, config);
        let params = FieldReader::params(W3_TODO_CODE, dynamic_params);

        let app_name = cfg.opt_str("appName")?;
        let task_uuid = match params.opt_str("taskUUID")? {
            Some(uuid) if !uuid.is_empty() => uuid,
            _ => format!("{}_{}", app_name.as_deref().unwrap_or_default(), short_uuid()),
        };
        let task_create_time = match params.opt_str("taskCreateTime")? {
            Some(time) => time,
            None => Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let request = W3TodoRequest {
            app_url: cfg.opt_str("appURL")?,
            todo_type: cfg.opt_str("type")?,
            reserve1: cfg.str_or("reserve1", "")?,
            reserve2: cfg.opt_str("reserve2")?,
            reserve10: cfg.str_or("reserve10", "0")?,
            task_desc: params.str_or("taskDesc", "")?,
            task_url: params.str_or("taskURL", "")?,
            task_title: params.str_or("taskTitle", "")?,
            task_create_user: params.str_or("taskCreateUser", "")?,
            task_create_user_name: params.str_or("taskCreateUserName", "")?,
            task_state: params.str_or("taskState", "1")?,
            task_uuid,
            task_create_time,
            receiver_user_accounts: employee_nos(recipients),
            copy_user_accounts: None,
            app_name,
        };

        debug!(
            "构建W3待办请求: taskUUID={}, 接收人数={}",
            request.task_uuid,
            request.receiver_user_accounts.len()
        );
        Ok(Box::new(request))
    }

    async fn execute(&self, request: &JsonMap) -> DeliveryOutcome {
        info!(
            "模拟调用W3待办接口: taskUUID={}",
            request
                .get("taskUUID")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
        );
        tokio::time::sleep(self.mock_delay).await;

        let task_id = format!("W3_TASK_{}", short_uuid());
        let body = json!({
            "code": "0",
            "message": "成功",
            "data": {"taskId": task_id, "taskStatus": "created"}
        });

        DeliveryOutcome::success("W3代办推送成功")
            .with_http_status(200)
            .with_business("0", "成功")
            .with_trace(task_id, body.to_string())
    }
}
