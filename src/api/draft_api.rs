// ==========================================
// 护照草稿导入系统 - 草稿管理 API
// ==========================================
// 职责: 草稿增删改查、状态切换、照片管理、转正
// 照片: 经 BlobStore 保存，草稿只记录路径；旧照片删除失败只记日志
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, IntakeConfigReader};
use crate::domain::draft::{DraftFields, DraftPage, DraftRecord};
use crate::domain::passport::Passport;
use crate::domain::types::{CompletionStatus, PhotoKind};
use crate::engine::ConversionGuard;
use crate::repository::{DraftRecordRepository, DraftRecordRepositoryImpl, SqlitePassportFactory};
use crate::storage::BlobStore;

// ==========================================
// DraftApi - 草稿管理 API
// ==========================================
pub struct DraftApi {
    repo: DraftRecordRepositoryImpl,
    config: ConfigManager,
    blob_store: Arc<dyn BlobStore>,
    guard: ConversionGuard<SqlitePassportFactory, ConfigManager>,
}

impl DraftApi {
    /// 创建新的DraftApi实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接（schema 已初始化）
    /// - blob_store: 照片存储
    pub fn new(conn: Arc<Mutex<Connection>>, blob_store: Arc<dyn BlobStore>) -> ApiResult<Self> {
        Ok(Self {
            repo: DraftRecordRepositoryImpl::new(conn.clone()),
            config: ConfigManager::from_connection(conn.clone())?,
            blob_store,
            guard: ConversionGuard::new(
                conn.clone(),
                SqlitePassportFactory::new(),
                ConfigManager::from_connection(conn)?,
            ),
        })
    }

    pub fn create(&self, fields: &DraftFields) -> ApiResult<DraftRecord> {
        let record = self.repo.create(fields)?;
        info!(draft_id = record.id, "草稿已创建");
        Ok(record)
    }

    pub fn get(&self, id: i64) -> ApiResult<DraftRecord> {
        Ok(self.repo.get(id)?)
    }

    /// 更新草稿（照片/状态为空时保留原值）
    pub fn update(&self, id: i64, fields: &DraftFields) -> ApiResult<DraftRecord> {
        Ok(self.repo.update(id, fields)?)
    }

    /// 删除草稿，随后尽力删除其引用的照片
    pub fn delete(&self, id: i64) -> ApiResult<DraftRecord> {
        let record = self.repo.delete(id)?;
        for path in record.photo_paths() {
            self.discard_blob(id, path);
        }
        info!(draft_id = id, "草稿已删除");
        Ok(record)
    }

    /// 分页查询草稿
    ///
    /// # 参数
    /// - page: 页码（从 1 开始，None 为第一页）
    /// - page_size: 每页条数（None 使用配置默认值，上限为 max_page_size）
    pub fn list(&self, page: Option<u32>, page_size: Option<u32>) -> ApiResult<DraftPage> {
        let max_page_size = self.config.get_max_page_size()?;
        let page_size = match page_size {
            Some(size) => size,
            None => self.config.get_default_page_size()?,
        }
        .clamp(1, max_page_size.max(1));

        Ok(self.repo.list(page.unwrap_or(1).max(1), page_size)?)
    }

    /// 切换完成状态（接受状态代码或阿拉伯语标签）
    pub fn update_status(&self, id: i64, status: &str) -> ApiResult<DraftRecord> {
        let parsed = CompletionStatus::parse(status)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知的草稿状态: {}", status)))?;

        let record = self.repo.set_status(id, parsed)?;
        info!(draft_id = id, status = %parsed, "草稿状态已更新");
        Ok(record)
    }

    /// 上传照片
    ///
    /// # 参数
    /// - id: 草稿 id
    /// - kind: 照片类型
    /// - bytes: 文件内容
    /// - original_name: 原始文件名（仅取扩展名）
    pub fn upload_photo(
        &self,
        id: i64,
        kind: PhotoKind,
        bytes: &[u8],
        original_name: &str,
    ) -> ApiResult<DraftRecord> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("照片内容不能为空".to_string()));
        }

        // 先确认草稿存在，避免产生无主文件
        self.repo.get(id)?;

        let name = format!(
            "{}_{}_{}.{}",
            Utc::now().timestamp(),
            id,
            kind.as_str(),
            photo_extension(original_name)
        );
        let path = self.blob_store.store(bytes, &name)?;

        let previous = match self.repo.set_photo(id, kind, Some(&path)) {
            Ok(previous) => previous,
            Err(e) => {
                self.discard_blob(id, &path);
                return Err(e.into());
            }
        };

        if let Some(old) = previous.filter(|old| *old != path) {
            self.discard_blob(id, &old);
        }

        info!(draft_id = id, kind = %kind, path = %path, "照片已上传");
        Ok(self.repo.get(id)?)
    }

    /// 清除照片路径并删除文件
    pub fn remove_photo(&self, id: i64, kind: PhotoKind) -> ApiResult<DraftRecord> {
        if let Some(old) = self.repo.set_photo(id, kind, None)? {
            self.discard_blob(id, &old);
        }
        Ok(self.repo.get(id)?)
    }

    /// 草稿转正
    ///
    /// # 参数
    /// - id: 草稿 id
    /// - operator: 操作人（None 使用默认操作人）
    pub fn convert(&self, id: i64, operator: Option<&str>) -> ApiResult<Passport> {
        Ok(self.guard.convert(id, operator)?)
    }

    fn discard_blob(&self, draft_id: i64, path: &str) {
        if let Err(e) = self.blob_store.delete(path) {
            warn!(draft_id, path, error = %e, "照片删除失败，已忽略");
        }
    }
}

/// 扩展名: 小写字母数字，缺失时为 bin
fn photo_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_extension() {
        assert_eq!(photo_extension("face.JPG"), "jpg");
        assert_eq!(photo_extension("scan.final.png"), "png");
        assert_eq!(photo_extension("noext"), "bin");
        assert_eq!(photo_extension("weird.j/p"), "bin");
    }
}
