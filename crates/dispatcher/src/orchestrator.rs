//! 推送编排：解析配置、构建请求、执行推送、写入历史并汇总结果

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{stream, FutureExt, StreamExt};
use metrics::{counter, histogram};
use push_config::DispatcherConfig;
use push_domain::{
    employee_nos, AggregateResult, AuditStore, ConfigStore, DeliveryOutcome, DispatchRequest,
    JsonMap, Platform, PlatformConfig, PlatformPreview, PreviewResponse, PushError, PushResult,
    Recipient,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::audit::{AuditRecorder, AuditTarget};
use crate::registry::StrategyRegistry;
use crate::resolver::ConfigResolver;
use crate::strategies::{DeliveryStrategy, PlatformRequest};

const PLATFORM_NOT_ENABLED: &str = "platform not enabled";
const STRATEGY_NOT_IMPLEMENTED: &str = "strategy not implemented";
const NO_ENABLED_PLATFORM: &str = "no enabled platform configured for this business";
const GROUP_REQUIRED: &str = "please select a recipient group";
const EMPTY_GROUP: &str = "group has no members";

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// 同一次推送内并发执行的平台数，1 表示按配置顺序逐个执行
    pub max_concurrent_platforms: usize,
    /// 单个平台执行超时，超时视为该平台推送失败
    pub platform_timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent_platforms: 1,
            platform_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&DispatcherConfig> for DispatchOptions {
    fn from(config: &DispatcherConfig) -> Self {
        Self {
            max_concurrent_platforms: config.max_concurrent_platforms.max(1),
            platform_timeout: Duration::from_millis(config.platform_timeout_ms),
        }
    }
}

/// 单个平台配置的推送结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub platform_code: String,
    pub success: bool,
    /// 失败原因，成功时为空
    pub reason: Option<String>,
}

impl AttemptResult {
    pub fn succeeded(platform_code: impl Into<String>) -> Self {
        Self {
            platform_code: platform_code.into(),
            success: true,
            reason: None,
        }
    }

    pub fn failed(platform_code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            platform_code: platform_code.into(),
            success: false,
            reason: Some(reason.into()),
        }
    }

    fn from_outcome(platform_code: &str, outcome: &DeliveryOutcome) -> Self {
        if outcome.success {
            Self::succeeded(platform_code)
        } else {
            Self::failed(platform_code, outcome.message.clone())
        }
    }
}

/// 汇总各平台结论；部分成功视为整体成功
pub fn aggregate(attempts: &[AttemptResult]) -> AggregateResult {
    let failed: Vec<String> = attempts
        .iter()
        .filter(|attempt| !attempt.success)
        .map(|attempt| {
            format!(
                "{}({})",
                attempt.platform_code,
                attempt.reason.as_deref().unwrap_or_default()
            )
        })
        .collect();
    let success_count = attempts.len() - failed.len();

    match (success_count, failed.len()) {
        (0, 0) => AggregateResult::failure(NO_ENABLED_PLATFORM),
        (0, _) => AggregateResult::failure(format!(
            "all platforms failed, failed platforms: {}",
            failed.join(", ")
        )),
        (succeeded, 0) => {
            AggregateResult::success(format!("all platforms succeeded, success: {succeeded}"))
        }
        (succeeded, failures) => AggregateResult::success(format!(
            "partially succeeded (success: {succeeded}, failure: {failures}), failed platforms: {}",
            failed.join(", ")
        )),
    }
}

pub struct DispatchOrchestrator {
    resolver: ConfigResolver,
    recorder: AuditRecorder,
    registry: Arc<StrategyRegistry>,
    options: DispatchOptions,
}

impl DispatchOrchestrator {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        audit_store: Arc<dyn AuditStore>,
        registry: Arc<StrategyRegistry>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            resolver: ConfigResolver::new(config_store),
            recorder: AuditRecorder::new(audit_store),
            registry,
            options,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// 预览各平台将要发送的请求，不调用任何平台也不写历史
    #[instrument(skip(self, request), fields(business_code = %request.business_code))]
    pub async fn preview(&self, request: &DispatchRequest) -> PushResult<PreviewResponse> {
        let (_, configs) = self.resolver.resolve(&request.business_code).await?;
        let mut response = PreviewResponse {
            business_code: request.business_code.clone(),
            platforms: Vec::new(),
        };
        if configs.is_empty() {
            warn!("业务类型 {} 没有启用的推送平台", request.business_code);
            return Ok(response);
        }

        let recipients = match request.group_id {
            Some(group_id) => self.resolver.recipients(group_id).await?,
            None => Vec::new(),
        };
        let platforms = self.resolver.enabled_platforms(&platform_codes(&configs)).await?;

        let mut skipped = 0usize;
        for config in &configs {
            let code = config.platform_code.as_str();
            let (platform, strategy) = match self.resolve_platform(config, &platforms) {
                Ok(resolved) => resolved,
                Err(reason) => {
                    debug!("预览跳过平台 {}: {}", code, reason);
                    counter!("push_preview_skipped_total", "platform" => code.to_string(), "reason" => reason)
                        .increment(1);
                    skipped += 1;
                    continue;
                }
            };

            match build_guarded(
                strategy.as_ref(),
                &config.config_json,
                &request.dynamic_params,
                &recipients,
            ) {
                Ok(built) => response.platforms.push(PlatformPreview {
                    platform_code: platform.platform_code.clone(),
                    platform_name: platform.platform_name.clone(),
                    request_params: built.masked_params(),
                }),
                Err(reason) => {
                    warn!("预览构建平台 {} 请求失败: {}", code, reason);
                    counter!("push_preview_skipped_total", "platform" => code.to_string(), "reason" => "build failed")
                        .increment(1);
                    skipped += 1;
                }
            }
        }

        info!(
            "预览完成: 业务={}, 成功={}, 跳过={}",
            request.business_code,
            response.platforms.len(),
            skipped
        );
        Ok(response)
    }

    /// 执行推送，总是返回一个整体结论
    #[instrument(skip(self, request), fields(business_code = %request.business_code))]
    pub async fn execute(&self, request: &DispatchRequest) -> AggregateResult {
        let started = Instant::now();
        let result = match self.try_execute(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("推送未执行: 业务={}, 原因={}", request.business_code, e);
                AggregateResult::failure(immediate_failure_message(&e))
            }
        };

        info!(
            "推送完成: 业务={}, 成功={}, 耗时={}ms, 结果={}",
            request.business_code,
            result.success,
            started.elapsed().as_millis(),
            result.message
        );
        result
    }

    async fn try_execute(&self, request: &DispatchRequest) -> PushResult<AggregateResult> {
        let (business_type, configs) = self.resolver.resolve(&request.business_code).await?;
        if configs.is_empty() {
            return Err(PushError::Unconfigured(NO_ENABLED_PLATFORM.to_string()));
        }
        let group_id = request
            .group_id
            .ok_or_else(|| PushError::Unconfigured(GROUP_REQUIRED.to_string()))?;
        let recipients = self.resolver.recipients(group_id).await?;
        if recipients.is_empty() {
            return Err(PushError::Unconfigured(EMPTY_GROUP.to_string()));
        }
        let platforms = self.resolver.enabled_platforms(&platform_codes(&configs)).await?;

        let target = AuditTarget {
            business_type_id: business_type.id,
            group_id: Some(group_id),
            business_key: request.business_key.as_deref(),
        };

        // buffered 按输入顺序产出结果，汇总消息与完成顺序无关
        let pending: Vec<_> = configs
            .iter()
            .map(|config| {
                self.attempt(config, &platforms, &request.dynamic_params, &recipients, target)
            })
            .collect();
        let attempts: Vec<AttemptResult> = stream::iter(pending)
        .buffered(self.options.max_concurrent_platforms.max(1))
        .collect()
        .await;

        Ok(aggregate(&attempts))
    }

    async fn attempt(
        &self,
        config: &PlatformConfig,
        platforms: &HashMap<String, Platform>,
        dynamic_params: &JsonMap,
        recipients: &[Recipient],
        target: AuditTarget<'_>,
    ) -> AttemptResult {
        let code = config.platform_code.as_str();

        let strategy = match self.resolve_platform(config, platforms) {
            Ok((_, strategy)) => strategy,
            Err(reason) => {
                warn!("跳过平台 {}: {}", code, reason);
                counter!("push_platform_attempts_total", "platform" => code.to_string(), "status" => "skipped")
                    .increment(1);
                return AttemptResult::failed(code, reason);
            }
        };

        let built =
            match build_guarded(strategy.as_ref(), &config.config_json, dynamic_params, recipients) {
                Ok(built) => built,
                Err(reason) => {
                    error!("构建平台 {} 请求失败: {}", code, reason);
                    let outcome = DeliveryOutcome::failure(format!("build request failed: {reason}"));
                    let knowable = json!({
                        "config": config.config_json,
                        "dynamicParams": dynamic_params,
                        "recipients": employee_nos(recipients),
                    });
                    self.recorder.record(target, code, &knowable, &outcome).await;
                    record_attempt_metric(code, &outcome);
                    return AttemptResult::from_outcome(code, &outcome);
                }
            };

        let request_params = built.to_params();
        let started = Instant::now();
        let outcome = self.execute_guarded(strategy.as_ref(), &request_params).await;
        histogram!("push_platform_duration_ms", "platform" => code.to_string())
            .record(started.elapsed().as_secs_f64() * 1000.0);

        if outcome.success {
            info!("平台 {} 推送成功: {}", code, outcome.message);
        } else {
            warn!("平台 {} 推送失败: {}", code, outcome.message);
        }

        self.recorder
            .record(target, code, &Value::Object(built.masked_params()), &outcome)
            .await;
        record_attempt_metric(code, &outcome);
        AttemptResult::from_outcome(code, &outcome)
    }

    fn resolve_platform<'a>(
        &self,
        config: &PlatformConfig,
        platforms: &'a HashMap<String, Platform>,
    ) -> Result<(&'a Platform, Arc<dyn DeliveryStrategy>), &'static str> {
        let platform = platforms
            .get(&config.platform_code)
            .filter(|platform| platform.enabled)
            .ok_or(PLATFORM_NOT_ENABLED)?;
        let strategy = self
            .registry
            .find(&config.platform_code)
            .ok_or(STRATEGY_NOT_IMPLEMENTED)?;
        Ok((platform, strategy))
    }

    /// 执行超时与 panic 都转换为失败结果
    async fn execute_guarded(
        &self,
        strategy: &dyn DeliveryStrategy,
        request: &JsonMap,
    ) -> DeliveryOutcome {
        let guarded = AssertUnwindSafe(strategy.execute(request)).catch_unwind();
        match tokio::time::timeout(self.options.platform_timeout, guarded).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                DeliveryOutcome::failure(format!("execute failed: {message}")).with_exception(message)
            }
            Err(_) => DeliveryOutcome::failure(format!(
                "execute timed out after {}ms",
                self.options.platform_timeout.as_millis()
            )),
        }
    }
}

fn platform_codes(configs: &[PlatformConfig]) -> Vec<String> {
    configs.iter().map(|c| c.platform_code.clone()).collect()
}

fn build_guarded(
    strategy: &dyn DeliveryStrategy,
    config: &JsonMap,
    dynamic_params: &JsonMap,
    recipients: &[Recipient],
) -> Result<Box<dyn PlatformRequest>, String> {
    let built = std::panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.build_request(config, dynamic_params, recipients)
    }));
    match built {
        Ok(Ok(request)) => Ok(request),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn immediate_failure_message(error: &PushError) -> String {
    match error {
        PushError::BusinessTypeNotFound { code } => format!("business type not found: {code}"),
        PushError::Unconfigured(message) => message.clone(),
        other => other.user_message().to_string(),
    }
}

fn record_attempt_metric(platform_code: &str, outcome: &DeliveryOutcome) {
    let status = if outcome.success { "success" } else { "failure" };
    counter!("push_platform_attempts_total", "platform" => platform_code.to_string(), "status" => status)
        .increment(1);
}
