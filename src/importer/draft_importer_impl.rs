// ==========================================
// 护照草稿导入系统 - 追加导入器实现
// ==========================================
// 流程: 识别格式 → 解码 → 去表头 → 位置映射 → 逐行落库
// 约束: 行级失败记录后继续，不回滚已写入的行
// ==========================================

use crate::domain::draft::ImportSummary;
use crate::importer::draft_importer_trait::DraftImporter;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::PositionalFileParser;
use crate::importer::positional_mapper::PositionalRowProjector;
use crate::repository::DraftRecordRepository;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// DraftImporterImpl - 追加导入编排
// ==========================================
pub struct DraftImporterImpl<R>
where
    R: DraftRecordRepository,
{
    repo: R,
    parser: PositionalFileParser,
    projector: PositionalRowProjector,
}

impl<R> DraftImporterImpl<R>
where
    R: DraftRecordRepository,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            parser: PositionalFileParser,
            projector: PositionalRowProjector,
        }
    }
}

impl<R> DraftImporter for DraftImporterImpl<R>
where
    R: DraftRecordRepository,
{
    #[instrument(skip(self, path), fields(batch_id, file = %path.display()))]
    fn import_file(&self, path: &Path) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, "开始追加导入草稿");

        // === 整文件阶段: 任何错误直接返回 ===
        let rows = self.parser.parse(path)?;
        let total_rows = rows.len();
        let (rows, header_offset) = PositionalRowProjector::drop_header(rows);
        info!(total_rows, data_rows = rows.len(), "文件解码完成");

        // === 逐行阶段: 失败只记录 ===
        let mut summary = ImportSummary {
            batch_id: batch_id.clone(),
            ..Default::default()
        };

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1 + header_offset;

            let Some(fields) = self.projector.project(row) else {
                debug!(row_number, "姓名为空，跳过该行");
                summary.skipped_count += 1;
                continue;
            };

            match self.repo.create(&fields) {
                Ok(record) => {
                    debug!(row_number, draft_id = record.id, "草稿写入成功");
                    summary.imported_count += 1;
                }
                Err(e) => {
                    warn!(
                        row_number,
                        raw_row = %serde_json::to_string(row).unwrap_or_default(),
                        error = %e,
                        "草稿写入失败，跳过该行"
                    );
                    summary
                        .per_row_errors
                        .push(format!("第 {} 行: {}", row_number, e));
                }
            }
        }

        summary.elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            imported = summary.imported_count,
            skipped = summary.skipped_count,
            failed = summary.per_row_errors.len(),
            elapsed_ms = summary.elapsed_ms,
            "追加导入完成"
        );

        Ok(summary)
    }
}
