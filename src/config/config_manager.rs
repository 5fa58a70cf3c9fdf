// ==========================================
// 护照草稿导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::intake_config_trait::IntakeConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置（按 key 排序）
    pub fn get_all_global(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置，格式错误或越界时回退默认值
    fn get_number_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + PartialOrd + Copy + Default + std::fmt::Display,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// IntakeConfigReader Trait 实现
// ==========================================
impl IntakeConfigReader for ConfigManager {
    fn get_unique_code_prefix(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::UNIQUE_CODE_PREFIX,
            config_keys::DEFAULT_UNIQUE_CODE_PREFIX,
        )
    }

    fn get_unique_code_width(&self) -> RepositoryResult<usize> {
        self.get_number_or_default(
            config_keys::UNIQUE_CODE_WIDTH,
            config_keys::DEFAULT_UNIQUE_CODE_WIDTH,
        )
    }

    fn get_default_operator(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::DEFAULT_OPERATOR,
            config_keys::DEFAULT_OPERATOR_VALUE,
        )
    }

    fn get_default_page_size(&self) -> RepositoryResult<u32> {
        self.get_number_or_default(
            config_keys::DEFAULT_PAGE_SIZE,
            config_keys::DEFAULT_PAGE_SIZE_VALUE,
        )
    }

    fn get_max_page_size(&self) -> RepositoryResult<u32> {
        self.get_number_or_default(
            config_keys::MAX_PAGE_SIZE,
            config_keys::DEFAULT_MAX_PAGE_SIZE,
        )
    }

    fn get_upload_url_prefix(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::UPLOAD_URL_PREFIX,
            config_keys::DEFAULT_UPLOAD_URL_PREFIX,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 转正编码
    pub const UNIQUE_CODE_PREFIX: &str = "unique_code_prefix";
    pub const UNIQUE_CODE_WIDTH: &str = "unique_code_width";
    pub const DEFAULT_OPERATOR: &str = "default_operator";

    // 分页
    pub const DEFAULT_PAGE_SIZE: &str = "default_page_size";
    pub const MAX_PAGE_SIZE: &str = "max_page_size";

    // 照片
    pub const UPLOAD_URL_PREFIX: &str = "upload_url_prefix";

    // 默认值
    pub const DEFAULT_UNIQUE_CODE_PREFIX: &str = "P";
    pub const DEFAULT_UNIQUE_CODE_WIDTH: usize = 6;
    pub const DEFAULT_OPERATOR_VALUE: &str = "النظام";
    pub const DEFAULT_PAGE_SIZE_VALUE: u32 = 20;
    pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
    pub const DEFAULT_UPLOAD_URL_PREFIX: &str = "/storage/uploads";
}
