// ==========================================
// 护照草稿导入系统 - 配置层
// ==========================================
// 职责: 业务配置读取与覆写，默认路径解析
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod intake_config_trait;
pub mod paths;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use intake_config_trait::IntakeConfigReader;
pub use paths::{get_default_db_path, get_default_upload_dir};
