use std::time::Duration;

use async_trait::async_trait;
use push_domain::{employee_nos, DeliveryOutcome, JsonMap, PushResult, Recipient};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{short_uuid, DeliveryStrategy, FieldReader, PlatformRequest};

pub const WELINK_APP_CODE: &str = "WELINK_APP";

/// WeLink应用号模板消息请求
#[derive(Debug, Clone, Default)]
pub struct WeLinkAppRequest {
    pub app_id: Option<String>,
    pub theme_id: Option<String>,
    pub template_no: Option<String>,
    pub from_user_account: Option<String>,
    pub message_type: String,
    pub display_type: Option<String>,
    pub notice_type: Option<String>,
    pub title_name: Option<String>,
    pub title: Option<String>,
    pub content_name: Option<String>,
    pub content: Option<String>,
    pub action: Option<String>,
    pub jump_url: String,
    /// 逗号分隔的工号，例如 `z00512371,dwx477491`
    pub to_user_account: String,
}

impl WeLinkAppRequest {
    fn template_title_params(&self) -> String {
        let mut params = JsonMap::new();
        if let Some(name) = self.title_name.as_ref().or(self.title.as_ref()) {
            params.insert("tName".to_string(), Value::String(name.clone()));
        }
        Value::Object(params).to_string()
    }

    fn template_content_params(&self) -> String {
        let mut params = JsonMap::new();
        if let Some(name) = self.content_name.as_ref().or(self.content.as_ref()) {
            params.insert("cName".to_string(), Value::String(name.clone()));
        }
        if let Some(action) = &self.action {
            params.insert("doName".to_string(), Value::String(action.clone()));
        }
        Value::Object(params).to_string()
    }
}

impl PlatformRequest for WeLinkAppRequest {
    fn to_params(&self) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert("app_id".into(), json!(self.app_id));
        map.insert("theme_id".into(), json!(self.theme_id));
        map.insert("templateNo".into(), json!(self.template_no));
        map.insert("from_user_account".into(), json!(self.from_user_account));
        map.insert("type".into(), json!(self.message_type));
        map.insert("displayType".into(), json!(self.display_type));
        map.insert("noticeType".into(), json!(self.notice_type));
        map.insert(
            "templateTitleParams".into(),
            Value::String(self.template_title_params()),
        );
        map.insert(
            "templateContentParams".into(),
            Value::String(self.template_content_params()),
        );
        map.insert("jump_url".into(), json!(self.jump_url));
        map.insert("to_user_account".into(), json!(self.to_user_account));
        map
    }
}

/// WeLink应用号推送，当前为模拟调用
pub struct WeLinkAppStrategy {
    mock_delay: Duration,
}

impl WeLinkAppStrategy {
    pub fn new(mock_delay: Duration) -> Self {
        Self { mock_delay }
    }
}

#[async_trait]
impl DeliveryStrategy for WeLinkAppStrategy {
    fn platform_code(&self) -> &str {
        WELINK_APP_CODE
    }

    fn build_request(
        &self,
        config: &JsonMap,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
    ) -> PushResult<Box<dyn PlatformRequest>> {
        let cfg = FieldReader::config(WELINK_APP_CODE, config);
        let params = FieldReader::params(WELINK_APP_CODE, dynamic_params);

        let request = WeLinkAppRequest {
            app_id: cfg.opt_str("app_id")?,
            theme_id: cfg.opt_str("theme_id")?,
            template_no: cfg.opt_str("templateNo")?,
            from_user_account: cfg.opt_str("from_user_account")?,
            message_type: cfg.str_or("type", "1")?,
            display_type: cfg.opt_str("displayType")?,
            notice_type: cfg.opt_str("noticeType")?,
            title_name: params.opt_str("titleName")?,
            title: params.opt_str("title")?,
            content_name: params.opt_str("contentName")?,
            content: params.opt_str("content")?,
            action: params.opt_str("action")?,
            jump_url: params.str_or("jumpUrl", "")?,
            to_user_account: employee_nos(recipients).join(","),
        };

        debug!("构建WeLink应用号请求: 接收人={}", request.to_user_account);
        Ok(Box::new(request))
    }

    async fn execute(&self, request: &JsonMap) -> DeliveryOutcome {
        info!(
            "模拟调用WeLink模板消息接口: templateNo={}",
            request
                .get("templateNo")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
        );
        tokio::time::sleep(self.mock_delay).await;

        let msg_id = format!("WE_LINK_MSG_{}", short_uuid());
        let body = json!({
            "code": "0",
            "message": "success",
            "data": {"msgId": msg_id, "status": "sent"}
        });

        DeliveryOutcome::success("WeLink应用号推送成功")
            .with_http_status(200)
            .with_business("0", "success")
            .with_trace(msg_id, body.to_string())
    }
}
