// ==========================================
// 护照草稿导入系统 - 照片存储层
// ==========================================
// 职责: 照片二进制的保存/删除，对外只暴露不透明路径
// 红线: 不解析文件内容
// ==========================================

pub mod blob_store;
pub mod error;

pub use blob_store::{BlobStore, LocalBlobStore};
pub use error::{BlobStoreError, BlobStoreResult};
