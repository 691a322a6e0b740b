use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("业务类型不存在: {code}")]
    BusinessTypeNotFound { code: String },
    #[error("推送未配置: {0}")]
    Unconfigured(String),
    #[error("平台 {platform} 配置无效: {message}")]
    InvalidConfig { platform: String, message: String },
    #[error("平台 {platform} 动态参数无效: {message}")]
    InvalidParams { platform: String, message: String },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
}

pub type PushResult<T> = Result<T, PushError>;

impl PushError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn business_type_not_found<S: Into<String>>(code: S) -> Self {
        Self::BusinessTypeNotFound { code: code.into() }
    }
    pub fn invalid_config<P: Into<String>, S: Into<String>>(platform: P, msg: S) -> Self {
        Self::InvalidConfig {
            platform: platform.into(),
            message: msg.into(),
        }
    }
    pub fn invalid_params<P: Into<String>, S: Into<String>>(platform: P, msg: S) -> Self {
        Self::InvalidParams {
            platform: platform.into(),
            message: msg.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, PushError::BusinessTypeNotFound { .. })
    }
    /// 构建请求阶段的错误，由调度循环按单平台失败处理
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            PushError::InvalidConfig { .. } | PushError::InvalidParams { .. }
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            PushError::BusinessTypeNotFound { .. } => "business type not found",
            PushError::Unconfigured(_) => "push is not configured for this request",
            PushError::InvalidConfig { .. } => "platform configuration is invalid",
            PushError::InvalidParams { .. } => "dynamic parameters are invalid",
            _ => "system busy, please retry later",
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        PushError::Serialization(err.to_string())
    }
}
