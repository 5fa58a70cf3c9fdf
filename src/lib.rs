// ==========================================
// 护照草稿导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格导入草稿 → 人工补全 → 一次性转正
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 转正
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 照片存储
pub mod storage;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CompletionStatus, PassportStatus, PaymentStatus, PhotoKind};

// 领域实体
pub use domain::{DraftFields, DraftPage, DraftRecord, ImportSummary, ReloadSummary};
pub use domain::passport::{NewPassport, Passport};

// 导入 / 转正
pub use engine::ConversionGuard;
pub use importer::{BulkReloadImporter, BulkReloader, DraftImporter, DraftImporterImpl};

// API
pub use api::{DraftApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "护照草稿导入系统";
