use std::time::{Duration, Instant};

use async_trait::async_trait;
use push_domain::{employee_nos, DeliveryOutcome, JsonMap, PushError, PushResult, Recipient};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{DeliveryStrategy, FieldReader, PlatformRequest};
use crate::template::TemplateMerger;

pub const WEBHOOK_CODE: &str = "WEBHOOK";

const DEFAULT_RECIPIENT_FIELD: &str = "recipients";
const TRACE_HEADER: &str = "x-request-id";
const MASK: &str = "******";

/// 通用Webhook请求：配置中的 `body` 作为模板，动态参数覆盖其上
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub url: String,
    pub headers: JsonMap,
    pub body: JsonMap,
}

impl PlatformRequest for WebhookRequest {
    fn to_params(&self) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert("url".into(), Value::String(self.url.clone()));
        map.insert("headers".into(), Value::Object(self.headers.clone()));
        map.insert("body".into(), Value::Object(self.body.clone()));
        map
    }

    /// 请求头常带鉴权信息，只保留名称
    fn masked_params(&self) -> JsonMap {
        let mut map = self.to_params();
        let masked: JsonMap = self
            .headers
            .keys()
            .map(|name| (name.clone(), Value::String(MASK.to_string())))
            .collect();
        map.insert("headers".into(), Value::Object(masked));
        map
    }
}

pub struct WebhookStrategy {
    client: reqwest::Client,
}

impl WebhookStrategy {
    pub fn new(timeout: Duration) -> PushResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PushError::config_error(format!("创建Webhook HTTP客户端失败: {e}")))?;
        Ok(Self { client })
    }

    fn header_map(headers: &JsonMap) -> Result<HeaderMap, String> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let Some(value) = value.as_str() else {
                return Err(format!("header {name} must be a string"));
            };
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("invalid header name {name}: {e}"))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| format!("invalid header value: {e}"))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

#[async_trait]
impl DeliveryStrategy for WebhookStrategy {
    fn platform_code(&self) -> &str {
        WEBHOOK_CODE
    }

    fn build_request(
        &self,
        config: &JsonMap,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
    ) -> PushResult<Box<dyn PlatformRequest>> {
        let cfg = FieldReader::config(WEBHOOK_CODE, config);

        let url = cfg.required_str("url")?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PushError::invalid_config(
                WEBHOOK_CODE,
                format!("url must be http(s): {url}"),
            ));
        }
        let headers = cfg.opt_object("headers")?.cloned().unwrap_or_default();
        if let Err(message) = Self::header_map(&headers) {
            return Err(PushError::invalid_config(WEBHOOK_CODE, message));
        }
        let recipient_field = cfg.str_or("recipientField", DEFAULT_RECIPIENT_FIELD)?;

        let template = cfg.opt_object("body")?.cloned().unwrap_or_default();
        let mut body = TemplateMerger::merge(&template, dynamic_params);
        body.insert(recipient_field, json!(employee_nos(recipients)));

        debug!("构建Webhook请求: url={}, 接收人数={}", url, recipients.len());
        Ok(Box::new(WebhookRequest { url, headers, body }))
    }

    async fn execute(&self, request: &JsonMap) -> DeliveryOutcome {
        let Some(url) = request.get("url").and_then(Value::as_str) else {
            return DeliveryOutcome::failure("Webhook推送失败: 缺少url");
        };
        let headers = match request.get("headers").and_then(Value::as_object) {
            Some(headers) => match Self::header_map(headers) {
                Ok(map) => map,
                Err(e) => return DeliveryOutcome::failure(format!("Webhook推送失败: {e}")),
            },
            None => HeaderMap::new(),
        };
        let body = request.get("body").cloned().unwrap_or_else(|| json!({}));

        let started = Instant::now();
        let response = match self.client.post(url).headers(headers).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Webhook调用失败: url={}, 错误={}", url, e);
                return DeliveryOutcome::failure(format!("Webhook推送失败: {e}"))
                    .with_exception(format!("{e:?}"));
            }
        };

        let status = response.status();
        let trace_id = response
            .headers()
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("读取Webhook响应体失败: url={}, 错误={}", url, e);
                String::new()
            }
        };
        debug!(
            "Webhook响应: url={}, 状态={}, 耗时={}ms",
            url,
            status,
            started.elapsed().as_millis()
        );

        let mut outcome = if status.is_success() {
            DeliveryOutcome::success("Webhook推送成功")
        } else {
            DeliveryOutcome::failure(format!("Webhook推送失败: HTTP {}", status.as_u16()))
        };
        outcome = outcome
            .with_http_status(status.as_u16())
            .with_response_body(text);
        outcome.trace_id = trace_id;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap_or_default()
    }

    fn strategy() -> WebhookStrategy {
        WebhookStrategy::new(Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_build_request_merges_body_template() {
        let config = map(json!({
            "url": "http://localhost:9000/hook",
            "headers": {"x-token": "abc"},
            "recipientField": "to",
            "body": {"title": "默认标题", "level": "info"}
        }));
        let params = map(json!({"title": "订单已创建", "orderNo": "A1"}));
        let members = vec![Recipient::new("E001", "张三")];

        let params = strategy()
            .build_request(&config, &params, &members)
            .unwrap()
            .to_params();

        assert_eq!(params["url"], "http://localhost:9000/hook");
        assert_eq!(params["headers"]["x-token"], "abc");
        assert_eq!(
            params["body"],
            json!({"title": "订单已创建", "level": "info", "orderNo": "A1", "to": ["E001"]})
        );
    }

    #[test]
    fn test_build_request_requires_url() {
        let err = strategy()
            .build_request(&JsonMap::new(), &JsonMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, PushError::InvalidConfig { .. }));

        let config = map(json!({"url": "ftp://example"}));
        assert!(strategy().build_request(&config, &JsonMap::new(), &[]).is_err());
    }

    #[test]
    fn test_build_request_rejects_bad_headers() {
        let config = map(json!({"url": "http://localhost/hook", "headers": {"x-n": 1}}));
        assert!(strategy().build_request(&config, &JsonMap::new(), &[]).is_err());
    }

    #[test]
    fn test_masked_params_hide_header_values() {
        let config = map(json!({
            "url": "http://localhost/hook",
            "headers": {"authorization": "Bearer abc", "x-token": "secret"},
            "body": {"title": "默认标题"}
        }));

        let request = strategy()
            .build_request(&config, &JsonMap::new(), &[])
            .unwrap();
        let masked = request.masked_params();

        assert_eq!(
            masked["headers"],
            json!({"authorization": "******", "x-token": "******"})
        );
        assert_eq!(masked["body"], request.to_params()["body"]);
        assert_eq!(request.to_params()["headers"]["x-token"], "secret");
        assert!(!Value::Object(masked).to_string().contains("secret"));
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let config = map(json!({
            "url": "http://localhost/hook",
            "headers": {"x-token": "abc"},
            "body": {"title": "默认标题", "level": "info"}
        }));
        let params = map(json!({"title": "订单已创建", "orderNo": "A1"}));
        let members = vec![Recipient::new("E001", "张三"), Recipient::new("E002", "李四")];

        let first = strategy()
            .build_request(&config, &params, &members)
            .unwrap()
            .to_params();
        let second = strategy()
            .build_request(&config, &params, &members)
            .unwrap()
            .to_params();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_execute_without_url_fails() {
        let outcome = strategy().execute(&JsonMap::new()).await;
        assert!(!outcome.success);
    }
}
