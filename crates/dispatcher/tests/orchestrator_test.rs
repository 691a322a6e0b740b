use std::sync::Arc;
use std::time::{Duration, Instant};

use push_dispatcher::{
    DeliveryStrategy, DispatchOptions, W3TodoStrategy, WeLinkAppStrategy, WebhookStrategy,
    W3_TODO_CODE, WEBHOOK_CODE,
};
use push_domain::{AuditStatus, PushError, Recipient};
use push_testing_utils::{
    dispatch_request, options, orchestrator_with, MockAuditStore, MockConfigStore,
    OrderCreatedFixture, ScriptedBehavior, ScriptedStrategy, ORDER_CREATED,
};
use serde_json::json;

fn builtin() -> Vec<Arc<dyn DeliveryStrategy>> {
    vec![
        Arc::new(W3TodoStrategy::new(Duration::ZERO)),
        Arc::new(WeLinkAppStrategy::new(Duration::ZERO)),
    ]
}

/// 三个启用平台 P1..P3，每个平台使用给定策略
fn three_platform_store(
    strategies: Vec<ScriptedStrategy>,
) -> (MockConfigStore, i64, Vec<Arc<dyn DeliveryStrategy>>) {
    let store = MockConfigStore::new();
    let business_type_id = store.add_business_type("MULTI", "多平台");
    for (index, code) in ["P1", "P2", "P3"].iter().enumerate() {
        store.add_platform(code, &format!("平台{}", index + 1), true);
        store.add_config(business_type_id, code, true, json!({"slot": index}));
    }
    let group_id = store.add_group(vec![Recipient::new("E001", "张三")]);
    let strategies = strategies
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn DeliveryStrategy>)
        .collect();
    (store, group_id, strategies)
}

#[tokio::test]
async fn test_order_created_attempts_only_enabled_platform() {
    let fixture = OrderCreatedFixture::new();
    let orchestrator = fixture.orchestrator(builtin());

    let request = dispatch_request(
        ORDER_CREATED,
        Some(fixture.group_id),
        json!({"taskTitle": "新订单待处理"}),
    )
    .with_business_key("ORDER-1001");
    let result = orchestrator.execute(&request).await;

    assert!(result.success, "{}", result.message);
    assert!(result.message.contains("success: 1"));
    assert!(result.message.contains("WELINK_APP(platform not enabled)"));

    let records = fixture.audit_store.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.platform_code, W3_TODO_CODE);
    assert_eq!(record.status, AuditStatus::Success);
    assert_eq!(record.business_type_id, fixture.business_type_id);
    assert_eq!(record.group_id, Some(fixture.group_id));
    assert_eq!(record.business_key.as_deref(), Some("ORDER-1001"));
    assert!(record.error_message.is_none());

    let request_json: serde_json::Value = serde_json::from_str(&record.request_json).unwrap();
    assert_eq!(request_json["taskTitle"], "新订单待处理");
    assert_eq!(
        request_json["receiverUserAccounts"],
        json!(["z00512371", "dwx477491"])
    );
}

#[tokio::test]
async fn test_failing_platform_is_reported_and_audited() {
    let fixture = OrderCreatedFixture::new();
    let w3 = Arc::new(ScriptedStrategy::failing(W3_TODO_CODE, "connection refused"));
    let orchestrator = fixture.orchestrator(vec![w3.clone()]);

    let result = orchestrator
        .execute(&dispatch_request(ORDER_CREATED, Some(fixture.group_id), json!({})))
        .await;

    assert!(!result.success);
    assert!(result.message.starts_with("all platforms failed"));
    assert!(result.message.contains("W3_TODO(connection refused)"));
    assert_eq!(w3.execute_count(), 1);

    let records = fixture.audit_store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AuditStatus::Failure);
    assert_eq!(records[0].error_message.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn test_partial_failure_is_overall_success() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::succeeding("P1"),
        ScriptedStrategy::failing("P2", "quota exceeded"),
        ScriptedStrategy::new("P3", ScriptedBehavior::BuildError("missing title".into())),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, strategies, DispatchOptions::default());

    let result = orchestrator
        .execute(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await;

    assert!(result.success);
    assert!(result
        .message
        .starts_with("partially succeeded (success: 1, failure: 2)"));
    assert!(result.message.contains("P2(quota exceeded)"));
    assert!(result.message.contains("P3(build request failed"));

    let records = audit.records();
    assert_eq!(records.len(), 3);
    let build_failure = records.iter().find(|r| r.platform_code == "P3").unwrap();
    assert_eq!(build_failure.status, AuditStatus::Failure);
    assert!(build_failure
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("build request failed"));
    let knowable: serde_json::Value = serde_json::from_str(&build_failure.request_json).unwrap();
    assert_eq!(knowable["config"]["slot"], 2);
    assert_eq!(knowable["recipients"], json!(["E001"]));
}

#[tokio::test]
async fn test_all_success_message() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::succeeding("P1"),
        ScriptedStrategy::succeeding("P2"),
        ScriptedStrategy::succeeding("P3"),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, strategies, DispatchOptions::default());

    let result = orchestrator
        .execute(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await;

    assert!(result.success);
    assert_eq!(result.message, "all platforms succeeded, success: 3");
    assert_eq!(audit.count(), 3);
    assert!(audit.records().iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn test_unknown_business_code_fails_without_audit() {
    let fixture = OrderCreatedFixture::new();
    let orchestrator = fixture.orchestrator(builtin());

    let result = orchestrator
        .execute(&dispatch_request("NOPE", Some(fixture.group_id), json!({})))
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "business type not found: NOPE");
    assert_eq!(fixture.audit_store.count(), 0);
}

#[tokio::test]
async fn test_unconfigured_cases_have_distinct_messages() {
    let fixture = OrderCreatedFixture::new();
    fixture
        .config_store
        .add_business_type("NO_PLATFORMS", "无平台");
    let empty_group = fixture.config_store.add_group(Vec::new());
    let orchestrator = fixture.orchestrator(builtin());

    let no_platforms = orchestrator
        .execute(&dispatch_request("NO_PLATFORMS", Some(fixture.group_id), json!({})))
        .await;
    assert!(!no_platforms.success);
    assert_eq!(
        no_platforms.message,
        "no enabled platform configured for this business"
    );

    let no_group = orchestrator
        .execute(&dispatch_request(ORDER_CREATED, None, json!({})))
        .await;
    assert_eq!(no_group.message, "please select a recipient group");

    let no_members = orchestrator
        .execute(&dispatch_request(ORDER_CREATED, Some(empty_group), json!({})))
        .await;
    assert_eq!(no_members.message, "group has no members");

    assert_eq!(fixture.audit_store.count(), 0);
}

#[tokio::test]
async fn test_unregistered_strategy_counts_as_failure() {
    let fixture = OrderCreatedFixture::new();
    let orchestrator = fixture.orchestrator(Vec::new());

    let result = orchestrator
        .execute(&dispatch_request(ORDER_CREATED, Some(fixture.group_id), json!({})))
        .await;

    assert!(!result.success);
    assert!(result.message.contains("W3_TODO(strategy not implemented)"));
    assert!(result.message.contains("WELINK_APP(platform not enabled)"));
    assert_eq!(fixture.audit_store.count(), 0);
}

#[tokio::test]
async fn test_execute_loads_configuration_in_one_pass() {
    let fixture = OrderCreatedFixture::new();
    let orchestrator = fixture.orchestrator(builtin());

    orchestrator
        .execute(&dispatch_request(ORDER_CREATED, Some(fixture.group_id), json!({})))
        .await;

    // 业务类型、平台配置、群组成员、平台各一次
    assert_eq!(fixture.config_store.query_count(), 4);
}

#[tokio::test]
async fn test_preview_never_executes_or_audits() {
    let fixture = OrderCreatedFixture::new();
    let w3 = Arc::new(ScriptedStrategy::succeeding(W3_TODO_CODE));
    let orchestrator = fixture.orchestrator(vec![w3.clone()]);

    let preview = orchestrator
        .preview(&dispatch_request(
            ORDER_CREATED,
            Some(fixture.group_id),
            json!({"taskTitle": "预览"}),
        ))
        .await
        .unwrap();

    assert_eq!(preview.business_code, ORDER_CREATED);
    assert_eq!(preview.platforms.len(), 1);
    let platform = &preview.platforms[0];
    assert_eq!(platform.platform_code, W3_TODO_CODE);
    assert_eq!(platform.platform_name, "W3待办");
    assert_eq!(platform.request_params["taskTitle"], "预览");
    assert_eq!(
        platform.request_params["recipients"],
        json!(["z00512371", "dwx477491"])
    );

    assert_eq!(w3.build_count(), 1);
    assert_eq!(w3.execute_count(), 0);
    assert_eq!(fixture.audit_store.count(), 0);
}

#[tokio::test]
async fn test_preview_without_group_uses_empty_recipients() {
    let fixture = OrderCreatedFixture::new();
    let orchestrator = fixture.orchestrator(builtin());

    let preview = orchestrator
        .preview(&dispatch_request(ORDER_CREATED, None, json!({})))
        .await
        .unwrap();

    assert_eq!(preview.platforms.len(), 1);
    assert_eq!(
        preview.platforms[0].request_params["receiverUserAccounts"],
        json!([])
    );
}

#[tokio::test]
async fn test_preview_of_business_without_enabled_configs_is_empty() {
    let store = MockConfigStore::new();
    store.add_platform(W3_TODO_CODE, "W3待办", true);
    let business_type_id = store.add_business_type("EMPTY", "无配置");
    store.add_config(business_type_id, W3_TODO_CODE, false, json!({"appName": "Off"}));
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, builtin(), DispatchOptions::default());

    let preview = orchestrator
        .preview(&dispatch_request("EMPTY", None, json!({})))
        .await
        .unwrap();

    assert_eq!(preview.business_code, "EMPTY");
    assert!(preview.platforms.is_empty());
    assert_eq!(audit.count(), 0);
}

#[tokio::test]
async fn test_preview_masks_webhook_headers() {
    let store = MockConfigStore::new();
    store.add_platform(WEBHOOK_CODE, "Webhook", true);
    let business_type_id = store.add_business_type("HOOKED", "回调通知");
    store.add_config(
        business_type_id,
        WEBHOOK_CODE,
        true,
        json!({
            "url": "http://127.0.0.1:9/hook",
            "headers": {"x-token": "secret"},
            "body": {"title": "默认标题"}
        }),
    );
    let strategies: Vec<Arc<dyn DeliveryStrategy>> =
        vec![Arc::new(WebhookStrategy::new(Duration::from_secs(1)).unwrap())];
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, strategies, DispatchOptions::default());

    let preview = orchestrator
        .preview(&dispatch_request("HOOKED", None, json!({"title": "订单已创建"})))
        .await
        .unwrap();

    let params = &preview.platforms[0].request_params;
    assert_eq!(params["headers"], json!({"x-token": "******"}));
    assert_eq!(params["body"]["title"], "订单已创建");
}

#[tokio::test]
async fn test_preview_skips_build_failures_and_unknown_code_fails() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::succeeding("P1"),
        ScriptedStrategy::new("P2", ScriptedBehavior::BuildError("bad".into())),
        ScriptedStrategy::new("P3", ScriptedBehavior::BuildPanic("broken".into())),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, strategies, DispatchOptions::default());

    let preview = orchestrator
        .preview(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await
        .unwrap();
    let codes: Vec<&str> = preview
        .platforms
        .iter()
        .map(|p| p.platform_code.as_str())
        .collect();
    assert_eq!(codes, vec!["P1"]);

    let err = orchestrator
        .preview(&dispatch_request("UNKNOWN", None, json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::BusinessTypeNotFound { .. }));
    assert_eq!(audit.count(), 0);
}

#[tokio::test]
async fn test_panics_are_isolated_per_platform() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::new("P1", ScriptedBehavior::ExecutePanic("boom".into())),
        ScriptedStrategy::new("P2", ScriptedBehavior::BuildPanic("broken".into())),
        ScriptedStrategy::succeeding("P3"),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(&store, &audit, strategies, DispatchOptions::default());

    let result = orchestrator
        .execute(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await;

    assert!(result.success);
    assert!(result.message.contains("P1(execute failed: boom)"));
    assert!(result.message.contains("P2(build request failed: broken)"));
    assert_eq!(audit.count(), 3);
}

#[tokio::test]
async fn test_platform_timeout_is_a_failure() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::new("P1", ScriptedBehavior::Slow(Duration::from_secs(5))),
        ScriptedStrategy::succeeding("P2"),
        ScriptedStrategy::succeeding("P3"),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(
        &store,
        &audit,
        strategies,
        options(1, Duration::from_millis(50)),
    );

    let result = orchestrator
        .execute(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await;

    assert!(result.success);
    assert!(result.message.contains("P1(execute timed out after 50ms)"));
    let timed_out = audit
        .records()
        .into_iter()
        .find(|r| r.platform_code == "P1")
        .unwrap();
    assert_eq!(timed_out.status, AuditStatus::Failure);
}

#[tokio::test]
async fn test_parallel_dispatch_keeps_config_order() {
    let (store, group_id, strategies) = three_platform_store(vec![
        ScriptedStrategy::new("P1", ScriptedBehavior::Slow(Duration::from_millis(300))),
        ScriptedStrategy::failing("P2", "first"),
        ScriptedStrategy::failing("P3", "second"),
    ]);
    let audit = MockAuditStore::new();
    let orchestrator = orchestrator_with(
        &store,
        &audit,
        strategies,
        options(3, Duration::from_secs(5)),
    );

    let started = Instant::now();
    let result = orchestrator
        .execute(&dispatch_request("MULTI", Some(group_id), json!({})))
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(
        result.message,
        "partially succeeded (success: 1, failure: 2), failed platforms: P2(first), P3(second)"
    );
    assert_eq!(audit.count(), 3);
}

#[tokio::test]
async fn test_audit_store_failure_does_not_change_result() {
    let fixture = OrderCreatedFixture::new();
    let audit = MockAuditStore::failing();
    let orchestrator = orchestrator_with(
        &fixture.config_store,
        &audit,
        builtin(),
        DispatchOptions::default(),
    );

    let result = orchestrator
        .execute(&dispatch_request(ORDER_CREATED, Some(fixture.group_id), json!({})))
        .await;

    assert!(result.success);
    assert_eq!(audit.count(), 0);
}

#[tokio::test]
async fn test_config_store_failure() {
    let fixture = OrderCreatedFixture::new();
    fixture.config_store.set_failing(true);
    let orchestrator = fixture.orchestrator(builtin());
    let request = dispatch_request(ORDER_CREATED, Some(fixture.group_id), json!({}));

    let result = orchestrator.execute(&request).await;
    assert!(!result.success);
    assert_eq!(result.message, "system busy, please retry later");

    assert!(orchestrator.preview(&request).await.is_err());
}
