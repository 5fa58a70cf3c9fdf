// ==========================================
// 护照草稿导入系统 - 全量重载导入器
// ==========================================
// 流程: 表头 CSV 解码（整文件） → 表头映射 → 单事务清空 + 重建
// 约束:
// - 解码失败时不触碰表数据
// - 行级失败只回滚该行
// - 同一文件重复执行结果一致（含 id）
// ==========================================

use crate::domain::draft::{DraftFields, ReloadSummary};
use crate::importer::draft_importer_trait::BulkReloader;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::HeaderCsvParser;
use crate::importer::header_mapper::HeaderRowProjector;
use crate::repository::DraftRecordRepository;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// CSV 首行为表头，数据行号从 2 开始
const FIRST_DATA_LINE: usize = 2;

pub struct BulkReloadImporter<R>
where
    R: DraftRecordRepository,
{
    repo: R,
    parser: HeaderCsvParser,
    projector: HeaderRowProjector,
}

impl<R> BulkReloadImporter<R>
where
    R: DraftRecordRepository,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            parser: HeaderCsvParser,
            projector: HeaderRowProjector,
        }
    }
}

impl<R> BulkReloader for BulkReloadImporter<R>
where
    R: DraftRecordRepository,
{
    #[instrument(skip(self, path), fields(batch_id, file = %path.display()))]
    fn reload_from_csv(&self, path: &Path) -> ImportResult<ReloadSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, "开始全量重载草稿");

        let rows = self.parser.parse(path)?;

        let mut line_numbers = Vec::with_capacity(rows.len());
        let mut projected: Vec<DraftFields> = Vec::with_capacity(rows.len());
        let mut skipped_count = 0;
        for (idx, row) in rows.iter().enumerate() {
            match self.projector.project(row) {
                Some(fields) => {
                    line_numbers.push(idx + FIRST_DATA_LINE);
                    projected.push(fields);
                }
                None => skipped_count += 1,
            }
        }
        info!(total_rows = rows.len(), valid_rows = projected.len(), "文件解码完成");

        let outcome = self.repo.replace_all(&projected)?;

        let mut per_row_errors = Vec::with_capacity(outcome.failed_rows.len());
        for (idx, message) in &outcome.failed_rows {
            let line = line_numbers.get(*idx).copied().unwrap_or_default();
            let record = projected
                .get(*idx)
                .and_then(|f| serde_json::to_string(f).ok())
                .unwrap_or_default();
            warn!(row_number = line, record = %record, error = %message, "重载写入失败，跳过该行");
            per_row_errors.push(format!("第 {} 行: {}", line, message));
        }

        let summary = ReloadSummary {
            batch_id: batch_id.clone(),
            deleted_count: outcome.deleted_count,
            imported_count: outcome.inserted_count,
            skipped_count,
            per_row_errors,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            batch_id = %batch_id,
            deleted = summary.deleted_count,
            imported = summary.imported_count,
            skipped = summary.skipped_count,
            failed = summary.per_row_errors.len(),
            elapsed_ms = summary.elapsed_ms,
            "全量重载完成"
        );

        Ok(summary)
    }
}
