use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JsonMap;

/// 业务类型，例如 "ORDER_CREATED"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessType {
    pub id: i64,
    pub business_code: String,
    pub business_name: String,
}

/// 推送平台，全局启用/禁用，与业务配置无关
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub platform_code: String,
    pub platform_name: String,
    pub enabled: bool,
}

/// 业务类型 × 平台 的推送配置，每对最多一行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub id: i64,
    pub business_type_id: i64,
    pub platform_code: String,
    pub enabled: bool,
    /// 平台固定字段模板
    pub config_json: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushGroup {
    pub id: i64,
    pub group_name: String,
    pub description: Option<String>,
}

/// 群组成员，即推送接收人
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub employee_no: String,
    pub employee_name: String,
}

impl Recipient {
    pub fn new(employee_no: impl Into<String>, employee_name: impl Into<String>) -> Self {
        Self {
            employee_no: employee_no.into(),
            employee_name: employee_name.into(),
        }
    }
}

/// 提取接收人工号，保持群组成员顺序
pub fn employee_nos(recipients: &[Recipient]) -> Vec<String> {
    recipients.iter().map(|r| r.employee_no.clone()).collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILURE")]
    Failure,
}

impl AuditStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            AuditStatus::Success
        } else {
            AuditStatus::Failure
        }
    }

    /// 持久化取值：成功 1，失败 0
    pub fn as_i32(&self) -> i32 {
        match self {
            AuditStatus::Success => 1,
            AuditStatus::Failure => 0,
        }
    }

    pub fn from_i32(value: i32) -> Self {
        if value == 1 {
            AuditStatus::Success
        } else {
            AuditStatus::Failure
        }
    }
}

/// 推送历史：每次平台推送尝试写入一条，只追加不更新
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// 由存储层分配，写入前为 0
    pub id: i64,
    pub business_type_id: i64,
    pub platform_code: String,
    pub group_id: Option<i64>,
    pub business_key: Option<String>,
    pub request_json: String,
    pub response_json: Option<String>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn is_success(&self) -> bool {
        self.status == AuditStatus::Success
    }
}
