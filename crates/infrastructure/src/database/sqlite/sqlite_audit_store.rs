use async_trait::async_trait;
use push_domain::{AuditRecord, AuditStatus, AuditStore};
use push_errors::{PushError, PushResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

const HISTORY_COLUMNS: &str = "id, business_type_id, platform_code, group_id, business_key, request_json, response_json, status, error_message, created_at";

/// 推送历史存储，只追加
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> PushResult<AuditRecord> {
        Ok(AuditRecord {
            id: row.try_get("id")?,
            business_type_id: row.try_get("business_type_id")?,
            platform_code: row.try_get("platform_code")?,
            group_id: row.try_get("group_id")?,
            business_key: row.try_get("business_key")?,
            request_json: row.try_get("request_json")?,
            response_json: row.try_get("response_json")?,
            status: AuditStatus::from_i32(row.try_get("status")?),
            error_message: row.try_get("error_message")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn append(&self, record: &AuditRecord) -> PushResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO push_history (business_type_id, platform_code, group_id, business_key,
                request_json, response_json, status, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.business_type_id)
        .bind(&record.platform_code)
        .bind(record.group_id)
        .bind(&record.business_key)
        .bind(&record.request_json)
        .bind(&record.response_json)
        .bind(record.status.as_i32())
        .bind(&record.error_message)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(PushError::Database)?;

        let id = result.last_insert_rowid();
        debug!("写入推送历史成功: id={}, 平台={}", id, record.platform_code);
        Ok(id)
    }

    async fn list(&self, page: u32, size: u32) -> PushResult<(Vec<AuditRecord>, i64)> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM push_history")
            .fetch_one(&self.pool)
            .await
            .map_err(PushError::Database)?
            .try_get("total")?;

        let offset = i64::from(page) * i64::from(size);
        let rows = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM push_history ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(PushError::Database)?;

        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<PushResult<Vec<_>>>()?;
        Ok((records, total))
    }

    async fn find_by_id(&self, id: i64) -> PushResult<Option<AuditRecord>> {
        let row = sqlx::query(&format!("SELECT {HISTORY_COLUMNS} FROM push_history WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(PushError::Database)?;

        row.as_ref().map(Self::row_to_record).transpose()
    }
}
