//! 数据库行与领域实体之间的字段转换

use push_domain::JsonMap;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

pub struct MappingHelpers;

impl MappingHelpers {
    /// 解析平台配置模板；内容损坏时记录日志并视为空模板
    pub fn parse_config_json(raw: Option<&str>, config_id: i64) -> JsonMap {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return JsonMap::new();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("推送配置 {} 的模板不是JSON对象，按空模板处理: {}", config_id, other);
                JsonMap::new()
            }
            Err(e) => {
                warn!("推送配置 {} 的模板解析失败，按空模板处理: {}", config_id, e);
                JsonMap::new()
            }
        }
    }

    pub fn parse_config_json_sqlite(row: &SqliteRow, field_name: &str, config_id: i64) -> JsonMap {
        let raw = row.try_get::<Option<String>, _>(field_name).ok().flatten();
        Self::parse_config_json(raw.as_deref(), config_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_config_json_object() {
        let map = MappingHelpers::parse_config_json(Some(r#"{"appName":"OrderSystem"}"#), 1);
        assert_eq!(map.get("appName"), Some(&json!("OrderSystem")));
    }

    #[test]
    fn test_parse_config_json_falls_back_to_empty() {
        assert!(MappingHelpers::parse_config_json(None, 1).is_empty());
        assert!(MappingHelpers::parse_config_json(Some(""), 1).is_empty());
        assert!(MappingHelpers::parse_config_json(Some("{broken"), 1).is_empty());
        assert!(MappingHelpers::parse_config_json(Some("[1,2]"), 1).is_empty());
    }
}
