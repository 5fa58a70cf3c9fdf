// ==========================================
// 护照草稿导入系统 - 照片存储错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("非法的文件路径: {0}")]
    InvalidPath(String),

    #[error("文件写入失败: {0}")]
    WriteError(String),

    #[error("文件删除失败: {0}")]
    DeleteError(String),
}

pub type BlobStoreResult<T> = Result<T, BlobStoreError>;
