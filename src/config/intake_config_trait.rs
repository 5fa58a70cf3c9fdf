// ==========================================
// 护照草稿导入系统 - 业务配置读取 Trait
// ==========================================
// 职责: 定义转正/分页/照片模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;

// ==========================================
// IntakeConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
// 约定: 配置缺失或格式错误时返回默认值，只有数据库错误才返回 Err
pub trait IntakeConfigReader: Send + Sync {
    // ===== 转正编码 =====

    /// 正式护照编码前缀
    ///
    /// # 默认值
    /// - "P"
    fn get_unique_code_prefix(&self) -> RepositoryResult<String>;

    /// 编码序号补零宽度
    ///
    /// # 默认值
    /// - 6（P000001）
    fn get_unique_code_width(&self) -> RepositoryResult<usize>;

    /// 未指定操作人时 delivered_by 的取值
    ///
    /// # 默认值
    /// - "النظام"
    fn get_default_operator(&self) -> RepositoryResult<String>;

    // ===== 分页 =====

    /// # 默认值
    /// - 20
    fn get_default_page_size(&self) -> RepositoryResult<u32>;

    /// # 默认值
    /// - 100
    fn get_max_page_size(&self) -> RepositoryResult<u32>;

    // ===== 照片 =====

    /// BlobStore 返回路径的 URL 前缀
    ///
    /// # 默认值
    /// - "/storage/uploads"
    fn get_upload_url_prefix(&self) -> RepositoryResult<String>;
}
