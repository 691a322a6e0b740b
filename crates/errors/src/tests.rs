use crate::*;

#[test]
fn test_push_error_display() {
    let db_op_error = PushError::DatabaseOperation("Connection failed".to_string());
    assert_eq!(db_op_error.to_string(), "数据库操作错误: Connection failed");

    let not_found = PushError::business_type_not_found("ORDER_CREATED");
    assert_eq!(not_found.to_string(), "业务类型不存在: ORDER_CREATED");

    let invalid = PushError::invalid_config("W3_TODO", "appName must be a string");
    assert_eq!(
        invalid.to_string(),
        "平台 W3_TODO 配置无效: appName must be a string"
    );

    let config = PushError::config_error("bad client");
    assert_eq!(config.to_string(), "配置错误: bad client");
}

#[test]
fn test_error_classification() {
    assert!(PushError::business_type_not_found("X").is_not_found());
    assert!(!PushError::database_error("locked").is_not_found());
    assert!(!PushError::Unconfigured("group has no members".into()).is_not_found());

    assert!(PushError::invalid_params("WELINK_APP", "title").is_build_failure());
    assert!(PushError::invalid_config("WEBHOOK", "url").is_build_failure());
    assert!(!PushError::config_error("client").is_build_failure());
}

#[test]
fn test_user_message() {
    assert_eq!(
        PushError::business_type_not_found("X").user_message(),
        "business type not found"
    );
    assert_eq!(
        PushError::database_error("x").user_message(),
        "system busy, please retry later"
    );
}

#[test]
fn test_from_serde_json_error() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let push_err: PushError = err.into();
    assert!(matches!(push_err, PushError::Serialization(_)));
}
