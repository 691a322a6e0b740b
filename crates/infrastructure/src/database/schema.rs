//! 建表语句，均可重复执行

pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS business_type (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_code TEXT NOT NULL UNIQUE,
        business_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS push_platform (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        platform_code TEXT NOT NULL UNIQUE,
        platform_name TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS push_config (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_type_id INTEGER NOT NULL,
        platform_code TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        config_json TEXT NOT NULL DEFAULT '{}',
        UNIQUE (business_type_id, platform_code)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS push_group (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_name TEXT NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS group_member (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER NOT NULL,
        employee_no TEXT NOT NULL,
        employee_name TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_group_member_group ON group_member (group_id)",
    r#"
    CREATE TABLE IF NOT EXISTS push_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_type_id INTEGER NOT NULL,
        platform_code TEXT NOT NULL,
        group_id INTEGER,
        business_key TEXT,
        request_json TEXT NOT NULL,
        response_json TEXT,
        status INTEGER NOT NULL,
        error_message TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_push_history_business_type ON push_history (business_type_id)",
    "CREATE INDEX IF NOT EXISTS idx_push_history_platform ON push_history (platform_code)",
    "CREATE INDEX IF NOT EXISTS idx_push_history_created_at ON push_history (created_at)",
];
