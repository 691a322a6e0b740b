use serde::{Deserialize, Serialize};

use crate::JsonMap;

/// 调用方发起的一次推送请求，接收后不再修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub business_code: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub dynamic_params: JsonMap,
    #[serde(default)]
    pub business_key: Option<String>,
}

impl DispatchRequest {
    pub fn new(business_code: impl Into<String>) -> Self {
        Self {
            business_code: business_code.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_params(mut self, dynamic_params: JsonMap) -> Self {
        self.dynamic_params = dynamic_params;
        self
    }

    pub fn with_business_key(mut self, business_key: impl Into<String>) -> Self {
        self.business_key = Some(business_key.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPreview {
    pub platform_code: String,
    pub platform_name: String,
    pub request_params: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub business_code: String,
    pub platforms: Vec<PlatformPreview>,
}
