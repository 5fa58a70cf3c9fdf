// ==========================================
// 护照草稿导入系统 - 转正引擎错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("草稿不存在: id={0}")]
    NotFound(i64),

    /// 首个缺失的必填字段
    #[error("必填字段缺失: {field}")]
    Validation { field: &'static str },

    /// 正式护照创建失败（草稿保持不变）
    #[error("正式护照创建失败: {0}")]
    EntityCreation(String),

    /// 护照已创建但草稿删除失败，事务已回滚
    #[error("转正一致性错误 (draft_id={draft_id}): {message}")]
    ConversionConsistency { draft_id: i64, message: String },

    #[error("数据库错误: {0}")]
    Database(String),
}

impl From<RepositoryError> for ConversionError {
    fn from(err: RepositoryError) -> Self {
        ConversionError::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for ConversionError {
    fn from(err: rusqlite::Error) -> Self {
        ConversionError::Database(err.to_string())
    }
}

pub type ConversionResult<T> = Result<T, ConversionError>;
