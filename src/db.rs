// ==========================================
// 护照草稿导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发导入/编辑时的偶发 busy 错误
// - 统一建表（草稿表 / 正式护照表 / 配置表）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式（与 datetime('now') 对齐）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS draft_passports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    gender TEXT,
    full_name TEXT,
    nationality TEXT,
    passport_number TEXT,
    passport_id TEXT,
    date_of_birth TEXT,
    residence_expiry_date TEXT,
    expiration_date TEXT,
    phone_number TEXT,
    mobile_number TEXT,
    transaction_type TEXT,
    residence_authority TEXT,
    address TEXT,
    governorate TEXT,
    zipcode TEXT,
    najacode TEXT,
    personal_photo TEXT,
    passport_photo TEXT,
    residence_photo TEXT,
    passport_extension_photo TEXT,
    notes TEXT,
    completion_status TEXT NOT NULL DEFAULT 'draft'
        CHECK(completion_status IN ('draft', 'in_review', 'ready_for_transfer')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_draft_passports_created_at
    ON draft_passports(created_at DESC, id DESC);

CREATE TABLE IF NOT EXISTS passports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    nationality TEXT NOT NULL,
    passport_number TEXT NOT NULL UNIQUE,
    unique_code TEXT NOT NULL UNIQUE,
    code_sequence INTEGER NOT NULL,
    date_of_birth TEXT NOT NULL,
    residence_expiry_date TEXT NOT NULL,
    phone_number TEXT,
    mobile_number TEXT NOT NULL,
    passport_status TEXT NOT NULL
        CHECK(passport_status IN ('in_progress', 'ready_for_pickup', 'delivered')),
    passport_delivery_date TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    payment_status TEXT NOT NULL
        CHECK(payment_status IN ('paid', 'unpaid', 'pay_later')),
    delivered_by TEXT NOT NULL,
    address TEXT NOT NULL,
    zipcode TEXT,
    personal_photo TEXT,
    passport_photo TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并写入当前 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开连接 + 建表，供 API 层与命令行入口使用
pub fn open_and_migrate(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;

    if let Some(version) = read_schema_version(&conn)? {
        if version > CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                db_version = version,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema_version 高于当前程序版本"
            );
        }
    }

    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
