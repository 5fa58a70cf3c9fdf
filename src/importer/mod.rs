// ==========================================
// 护照草稿导入系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 草稿记录
// 支持: Excel (.xlsx/.xls，位置列), CSV（位置列 / 表头列）
// ==========================================

// 模块声明
pub mod archive_reader;
pub mod bulk_reload_importer;
pub mod csv_decoder;
pub mod date_coercion;
pub mod draft_importer_impl;
pub mod draft_importer_trait;
pub mod error;
pub mod file_parser;
pub mod header_mapper;
pub mod positional_mapper;
pub mod shared_strings;
pub mod worksheet;

// 重导出核心类型
pub use archive_reader::ArchiveReader;
pub use bulk_reload_importer::BulkReloadImporter;
pub use draft_importer_impl::DraftImporterImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{HeaderCsvParser, PositionalFileParser, SourceFormat};
pub use header_mapper::HeaderRowProjector;
pub use positional_mapper::{PositionalColumn, PositionalRowProjector};
pub use shared_strings::SharedStringTable;
pub use worksheet::{RawRow, WorksheetDecoder};

// 重导出 Trait 接口
pub use draft_importer_trait::{BulkReloader, DraftImporter};
