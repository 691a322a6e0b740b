use std::sync::Arc;
use std::time::Duration;

use push_config::DatabaseConfig;
use push_domain::{AuditStore, ConfigStore};
use push_errors::{PushError, PushResult};
use sqlx::SqlitePool;
use tracing::info;

use super::schema::SCHEMA_STATEMENTS;
use super::sqlite::{SqliteAuditStore, SqliteConfigStore};

pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> PushResult<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(1800)) // 30分钟默认生命周期
            .connect(&config.url)
            .await
            .map_err(PushError::Database)?;

        info!("数据库连接池已创建: {}", config.url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> PushResult<()> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(PushError::Database)?;
        }
        info!("数据库表结构已就绪");
        Ok(())
    }

    pub async fn health_check(&self) -> PushResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(PushError::Database)?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn config_store(&self) -> Arc<dyn ConfigStore> {
        Arc::new(SqliteConfigStore::new(self.pool.clone()))
    }

    pub fn audit_store(&self) -> Arc<dyn AuditStore> {
        Arc::new(SqliteAuditStore::new(self.pool.clone()))
    }
}
