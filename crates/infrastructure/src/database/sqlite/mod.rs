pub mod sqlite_audit_store;
pub mod sqlite_config_store;

pub use sqlite_audit_store::SqliteAuditStore;
pub use sqlite_config_store::SqliteConfigStore;
