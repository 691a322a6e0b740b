use async_trait::async_trait;
use push_domain::{
    BusinessType, ConfigStore, JsonMap, Platform, PlatformConfig, PushGroup, Recipient,
};
use push_errors::{PushError, PushResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::database::mapping::MappingHelpers;

/// 推送配置存储
///
/// 除 `ConfigStore` 的只读查询外，还提供初始化数据用的写入方法。
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_platform_config(row: &sqlx::sqlite::SqliteRow) -> PushResult<PlatformConfig> {
        let id: i64 = row.try_get("id")?;
        Ok(PlatformConfig {
            id,
            business_type_id: row.try_get("business_type_id")?,
            platform_code: row.try_get("platform_code")?,
            enabled: row.try_get("enabled")?,
            config_json: MappingHelpers::parse_config_json_sqlite(row, "config_json", id),
        })
    }

    pub async fn create_business_type(&self, code: &str, name: &str) -> PushResult<BusinessType> {
        let result = sqlx::query("INSERT INTO business_type (business_code, business_name) VALUES ($1, $2)")
            .bind(code)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(PushError::Database)?;

        debug!("创建业务类型: {}", code);
        Ok(BusinessType {
            id: result.last_insert_rowid(),
            business_code: code.to_string(),
            business_name: name.to_string(),
        })
    }

    pub async fn upsert_platform(&self, platform: &Platform) -> PushResult<()> {
        sqlx::query(
            r#"
            INSERT INTO push_platform (platform_code, platform_name, enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT(platform_code) DO UPDATE SET
                platform_name = excluded.platform_name,
                enabled = excluded.enabled
            "#,
        )
        .bind(&platform.platform_code)
        .bind(&platform.platform_name)
        .bind(platform.enabled)
        .execute(&self.pool)
        .await
        .map_err(PushError::Database)?;

        debug!("保存推送平台: {}", platform.platform_code);
        Ok(())
    }

    /// 同一业务类型与平台只保留一行配置，重复保存覆盖模板与启用状态
    pub async fn upsert_config(
        &self,
        business_type_id: i64,
        platform_code: &str,
        enabled: bool,
        config_json: &JsonMap,
    ) -> PushResult<i64> {
        let config_text = serde_json::to_string(config_json)?;
        let row = sqlx::query(
            r#"
            INSERT INTO push_config (business_type_id, platform_code, enabled, config_json)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(business_type_id, platform_code) DO UPDATE SET
                enabled = excluded.enabled,
                config_json = excluded.config_json
            RETURNING id
            "#,
        )
        .bind(business_type_id)
        .bind(platform_code)
        .bind(enabled)
        .bind(config_text)
        .fetch_one(&self.pool)
        .await
        .map_err(PushError::Database)?;

        Ok(row.try_get("id")?)
    }

    pub async fn create_group(&self, group_name: &str, description: Option<&str>) -> PushResult<PushGroup> {
        let result = sqlx::query("INSERT INTO push_group (group_name, description) VALUES ($1, $2)")
            .bind(group_name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(PushError::Database)?;

        Ok(PushGroup {
            id: result.last_insert_rowid(),
            group_name: group_name.to_string(),
            description: description.map(str::to_string),
        })
    }

    pub async fn add_group_member(&self, group_id: i64, member: &Recipient) -> PushResult<()> {
        sqlx::query(
            "INSERT INTO group_member (group_id, employee_no, employee_name) VALUES ($1, $2, $3)",
        )
        .bind(group_id)
        .bind(&member.employee_no)
        .bind(&member.employee_name)
        .execute(&self.pool)
        .await
        .map_err(PushError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn find_business_type_by_code(&self, code: &str) -> PushResult<Option<BusinessType>> {
        let row = sqlx::query(
            "SELECT id, business_code, business_name FROM business_type WHERE business_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(PushError::Database)?;

        match row {
            Some(row) => Ok(Some(BusinessType {
                id: row.try_get("id")?,
                business_code: row.try_get("business_code")?,
                business_name: row.try_get("business_name")?,
            })),
            None => Ok(None),
        }
    }

    async fn find_enabled_configs_by_business_type(
        &self,
        business_type_id: i64,
    ) -> PushResult<Vec<PlatformConfig>> {
        let rows = sqlx::query(
            r#"
            SELECT id, business_type_id, platform_code, enabled, config_json
            FROM push_config
            WHERE business_type_id = $1 AND enabled = 1
            ORDER BY id
            "#,
        )
        .bind(business_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PushError::Database)?;

        rows.iter().map(Self::row_to_platform_config).collect()
    }

    async fn find_enabled_platforms_by_codes(&self, codes: &[String]) -> PushResult<Vec<Platform>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT platform_code, platform_name, enabled FROM push_platform WHERE enabled = 1 AND platform_code IN (",
        );
        let mut separated = builder.separated(", ");
        for code in codes {
            separated.push_bind(code.clone());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(PushError::Database)?;

        rows.iter()
            .map(|row| -> PushResult<_> {
                Ok(Platform {
                    platform_code: row.try_get("platform_code")?,
                    platform_name: row.try_get("platform_name")?,
                    enabled: row.try_get("enabled")?,
                })
            })
            .collect()
    }

    async fn find_group_members(&self, group_id: i64) -> PushResult<Vec<Recipient>> {
        let rows = sqlx::query(
            "SELECT employee_no, employee_name FROM group_member WHERE group_id = $1 ORDER BY id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PushError::Database)?;

        rows.iter()
            .map(|row| -> PushResult<_> {
                Ok(Recipient {
                    employee_no: row.try_get("employee_no")?,
                    employee_name: row.try_get("employee_name")?,
                })
            })
            .collect()
    }
}
