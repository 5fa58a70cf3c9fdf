// ==========================================
// 护照草稿导入系统 - BlobStore
// ==========================================
// 返回路径形如 /storage/uploads/<name>，草稿表只保存该路径
// ==========================================

use crate::storage::error::{BlobStoreError, BlobStoreResult};
use std::path::PathBuf;
use tracing::debug;

pub trait BlobStore: Send + Sync {
    /// 保存文件，返回不透明路径
    fn store(&self, bytes: &[u8], suggested_name: &str) -> BlobStoreResult<String>;

    /// 删除文件（不存在视为成功）
    fn delete(&self, path: &str) -> BlobStoreResult<()>;
}

// ==========================================
// LocalBlobStore - 本地目录实现
// ==========================================
pub struct LocalBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// 不透明路径 → 本地文件路径（只接受本存储发出的单层文件名）
    fn resolve(&self, path: &str) -> BlobStoreResult<PathBuf> {
        let name = path
            .strip_prefix(&self.url_prefix)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(path);
        Ok(self.root.join(validate_name(name)?))
    }
}

fn validate_name(name: &str) -> BlobStoreResult<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(BlobStoreError::InvalidPath(name.to_string()));
    }
    Ok(name)
}

impl BlobStore for LocalBlobStore {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> BlobStoreResult<String> {
        let name = validate_name(suggested_name)?;

        std::fs::create_dir_all(&self.root)
            .map_err(|e| BlobStoreError::WriteError(format!("{}: {}", self.root.display(), e)))?;

        let target = self.root.join(name);
        std::fs::write(&target, bytes)
            .map_err(|e| BlobStoreError::WriteError(format!("{}: {}", target.display(), e)))?;

        debug!(file = %target.display(), size = bytes.len(), "照片已保存");
        Ok(format!("{}/{}", self.url_prefix, name))
    }

    fn delete(&self, path: &str) -> BlobStoreResult<()> {
        let target = self.resolve(path)?;
        match std::fs::remove_file(&target) {
            Ok(()) => {
                debug!(file = %target.display(), "照片已删除");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::DeleteError(format!(
                "{}: {}",
                target.display(),
                e
            ))),
        }
    }
}
