// ==========================================
// 护照草稿导入系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行或上层服务调用
// ==========================================

pub mod draft_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use draft_api::DraftApi;
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse, ReloadApiResponse};
