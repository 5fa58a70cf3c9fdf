// ==========================================
// 护照草稿导入系统 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 位置行（未去表头）
// ==========================================

use crate::importer::archive_reader::{ArchiveReader, FIRST_SHEET_ENTRY, SHARED_STRINGS_ENTRY};
use crate::importer::csv_decoder::{decode_positional, decode_with_headers, HeaderRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::shared_strings::SharedStringTable;
use crate::importer::worksheet::{RawRow, WorksheetDecoder};
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// 按扩展名（不区分大小写）识别格式
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xls" => Ok(SourceFormat::Spreadsheet),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// 位置行解析（追加导入使用）
// ==========================================
pub struct PositionalFileParser;

impl PositionalFileParser {
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<RawRow>> {
        let format = SourceFormat::from_path(path)?;
        ensure_exists(path)?;

        match format {
            SourceFormat::Csv => decode_positional(File::open(path)?),
            SourceFormat::Spreadsheet => self.parse_spreadsheet(path),
        }
    }

    fn parse_spreadsheet(&self, path: &Path) -> ImportResult<Vec<RawRow>> {
        let mut archive = ArchiveReader::open(path)?;

        let shared_xml = archive.read_entry(SHARED_STRINGS_ENTRY)?;
        let shared = SharedStringTable::parse(shared_xml.as_deref())?;

        let sheet_xml = archive.read_entry(FIRST_SHEET_ENTRY)?.ok_or_else(|| {
            ImportError::DecodeError(format!("工作簿缺少 {}", FIRST_SHEET_ENTRY))
        })?;

        WorksheetDecoder::new(&shared).decode(&sheet_xml)
    }
}

// ==========================================
// 表头行解析（全量重载使用，仅 CSV）
// ==========================================
pub struct HeaderCsvParser;

impl HeaderCsvParser {
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<HeaderRow>> {
        match SourceFormat::from_path(path)? {
            SourceFormat::Csv => {}
            SourceFormat::Spreadsheet => {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                return Err(ImportError::UnsupportedFormat(ext));
            }
        }
        ensure_exists(path)?;

        decode_with_headers(File::open(path)?)
    }
}
