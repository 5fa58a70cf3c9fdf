// ==========================================
// 护照草稿导入系统 - 导入器 Trait 定义
// ==========================================
// 两种策略相互独立，不以参数切换:
// - DraftImporter: 追加导入，逐行落库，行级失败不中止
// - BulkReloader: 全量重载，清空后按表头 CSV 重建（仅显式调用）
// ==========================================

use crate::domain::draft::{ImportSummary, ReloadSummary};
use crate::importer::error::ImportResult;
use std::path::Path;

pub trait DraftImporter {
    /// 追加导入 .csv / .xlsx / .xls
    ///
    /// # 返回
    /// - Ok(ImportSummary): 成功数 / 跳过数 / 行级错误
    /// - Err: 整文件错误（格式不支持 / 文件不存在 / 解码失败）
    fn import_file(&self, path: &Path) -> ImportResult<ImportSummary>;
}

pub trait BulkReloader {
    /// 全量重载（先完整解码，再在单事务中清空并重建）
    ///
    /// # 返回
    /// - Err: 整文件错误，此时表内数据保持不变
    fn reload_from_csv(&self, path: &Path) -> ImportResult<ReloadSummary>;
}
