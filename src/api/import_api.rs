// ==========================================
// 护照草稿导入API
// ==========================================
// 职责: 封装追加导入与显式全量重载
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::draft::{ImportSummary, ReloadSummary};
use crate::importer::{BulkReloadImporter, BulkReloader, DraftImporter, DraftImporterImpl};
use crate::repository::DraftRecordRepositoryImpl;

/// 追加导入响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    #[serde(flatten)]
    pub summary: ImportSummary,
    /// 提示信息（تم استيراد N جواز بنجاح）
    pub message: String,
}

/// 全量重载响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadApiResponse {
    #[serde(flatten)]
    pub summary: ReloadSummary,
    pub message: String,
}

/// 导入API
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 追加导入草稿（.xlsx/.xls/.csv，位置列）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果（行级失败在 per_row_errors 中）
    /// - Err(ApiError): 整文件错误
    pub fn import_file(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let importer = DraftImporterImpl::new(DraftRecordRepositoryImpl::new(self.conn.clone()));
        let summary = importer.import_file(Path::new(file_path))?;

        Ok(ImportApiResponse {
            message: success_message(summary.imported_count),
            summary,
        })
    }

    /// 全量重载草稿（仅 .csv，表头列；清空后重新写入）
    pub fn reload_from_csv(&self, file_path: &str) -> ApiResult<ReloadApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let reloader = BulkReloadImporter::new(DraftRecordRepositoryImpl::new(self.conn.clone()));
        let summary = reloader.reload_from_csv(Path::new(file_path))?;

        Ok(ReloadApiResponse {
            message: success_message(summary.imported_count),
            summary,
        })
    }
}

fn success_message(imported_count: usize) -> String {
    format!("تم استيراد {} جواز بنجاح", imported_count)
}
