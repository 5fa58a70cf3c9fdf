// ==========================================
// 护照草稿导入系统 - 转正引擎层
// ==========================================
// 职责: 草稿 → 正式护照的一次性、原子转正
// 红线: 校验不通过时不产生任何写入
// ==========================================

pub mod conversion_guard;
pub mod error;

pub use conversion_guard::{format_unique_code, validate_required, ConversionGuard, REQUIRED_FIELDS};
pub use error::{ConversionError, ConversionResult};
