// ==========================================
// 护照草稿导入系统 - API层错误类型
// ==========================================
// 职责: 将 Repository / Importer / Engine / Storage 错误转换为用户可读的错误
// ==========================================

use crate::engine::error::ConversionError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use crate::storage::error::BlobStoreError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 转正必填字段缺失（首个缺失字段）
    #[error("必填字段缺失: {0}")]
    MissingRequiredField(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 转正一致性错误（已回滚，需人工排查）
    #[error("转正一致性错误: {0}")]
    ConversionConsistency(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入 / 存储错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("照片存储失败: {0}")]
    StorageError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件不存在: {}", path)),
            ImportError::UnsupportedFormat(_) => ApiError::InvalidInput(err.to_string()),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConversionError 转换
// ==========================================
impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::NotFound(id) => ApiError::NotFound(format!("草稿(id={})不存在", id)),
            ConversionError::Validation { field } => {
                ApiError::MissingRequiredField(field.to_string())
            }
            ConversionError::EntityCreation(msg) => ApiError::BusinessRuleViolation(msg),
            ConversionError::ConversionConsistency { .. } => {
                ApiError::ConversionConsistency(err.to_string())
            }
            ConversionError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<BlobStoreError> for ApiError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::InvalidPath(msg) => ApiError::InvalidInput(format!("文件名非法: {}", msg)),
            other => ApiError::StorageError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_errors_keep_field_and_kind() {
        let err: ApiError = ConversionError::Validation {
            field: "mobile_number",
        }
        .into();
        assert!(matches!(err, ApiError::MissingRequiredField(ref f) if f == "mobile_number"));

        let err: ApiError = ConversionError::NotFound(7).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_import_errors_split_by_cause() {
        let err: ApiError = ImportError::UnsupportedFormat("pdf".to_string()).into();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err: ApiError = ImportError::DecodeError("bad xml".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }
}
