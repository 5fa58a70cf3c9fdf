// ==========================================
// 护照草稿导入系统 - 草稿领域模型
// ==========================================
// 对齐: draft_passports 表
// 用途: 导入层写入 / 编辑接口修改 / 转正后删除
// ==========================================

use crate::domain::types::{CompletionStatus, PhotoKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DraftFields - 草稿可写字段集合
// ==========================================
// 用途: 单条提交 / 导入行投影 / 编辑更新
// 更新语义: 照片与 completion_status 为 None 时保留原值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftFields {
    // ===== 身份信息 =====
    pub gender: Option<String>,
    pub full_name: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub passport_id: Option<String>, // 表头导入: 与 passport_number 同源

    // ===== 日期 =====
    pub date_of_birth: Option<NaiveDate>,
    pub residence_expiry_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>, // 表头导入: 与 residence_expiry_date 同源

    // ===== 联系方式 =====
    pub phone_number: Option<String>,
    pub mobile_number: Option<String>,

    // ===== 办理信息 =====
    pub transaction_type: Option<String>,
    pub residence_authority: Option<String>,

    // ===== 地址 =====
    pub address: Option<String>,
    pub governorate: Option<String>,
    pub zipcode: Option<String>,
    pub najacode: Option<String>, // 表头导入: 与 zipcode 同源

    // ===== 照片（BlobStore 返回的不透明路径）=====
    pub personal_photo: Option<String>,
    pub passport_photo: Option<String>,
    pub residence_photo: Option<String>,
    pub passport_extension_photo: Option<String>,

    pub notes: Option<String>,
    pub completion_status: Option<CompletionStatus>,
}

impl DraftFields {
    pub fn photo(&self, kind: PhotoKind) -> Option<&str> {
        match kind {
            PhotoKind::Personal => self.personal_photo.as_deref(),
            PhotoKind::Passport => self.passport_photo.as_deref(),
            PhotoKind::Residence => self.residence_photo.as_deref(),
            PhotoKind::PassportExtension => self.passport_extension_photo.as_deref(),
        }
    }
}

// ==========================================
// DraftRecord - 未完成护照草稿
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: i64,

    pub gender: Option<String>,
    pub full_name: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub passport_id: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
    pub residence_expiry_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,

    pub phone_number: Option<String>,
    pub mobile_number: Option<String>,

    pub transaction_type: Option<String>,
    pub residence_authority: Option<String>,

    pub address: Option<String>,
    pub governorate: Option<String>,
    pub zipcode: Option<String>,
    pub najacode: Option<String>,

    pub personal_photo: Option<String>,
    pub passport_photo: Option<String>,
    pub residence_photo: Option<String>,
    pub passport_extension_photo: Option<String>,

    pub notes: Option<String>,
    pub completion_status: CompletionStatus,

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DraftRecord {
    pub fn photo(&self, kind: PhotoKind) -> Option<&str> {
        match kind {
            PhotoKind::Personal => self.personal_photo.as_deref(),
            PhotoKind::Passport => self.passport_photo.as_deref(),
            PhotoKind::Residence => self.residence_photo.as_deref(),
            PhotoKind::PassportExtension => self.passport_extension_photo.as_deref(),
        }
    }

    /// 当前引用的全部照片路径
    pub fn photo_paths(&self) -> Vec<&str> {
        PhotoKind::ALL
            .into_iter()
            .filter_map(|kind| self.photo(kind))
            .collect()
    }
}

// ==========================================
// DraftPage - 分页结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPage {
    pub items: Vec<DraftRecord>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

// ==========================================
// ImportSummary - 导入结果
// ==========================================
// 语义: 行级失败不影响整体，只计入 per_row_errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub imported_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_row_errors: Vec<String>,
    pub elapsed_ms: u64,
}

// ==========================================
// ReloadSummary - 全量重载结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub batch_id: String,
    pub deleted_count: usize,
    pub imported_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_row_errors: Vec<String>,
    pub elapsed_ms: u64,
}

// ==========================================
// ReloadOutcome - 全量重载的落库结果
// ==========================================
// failed_rows: (输入切片下标, 错误信息)
#[derive(Debug, Clone, Default)]
pub struct ReloadOutcome {
    pub deleted_count: usize,
    pub inserted_count: usize,
    pub failed_rows: Vec<(usize, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_by_kind() {
        let fields = DraftFields {
            residence_photo: Some("/storage/uploads/r.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.photo(PhotoKind::Residence), Some("/storage/uploads/r.pdf"));
        assert_eq!(fields.photo(PhotoKind::Personal), None);
    }
}
