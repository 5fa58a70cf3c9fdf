// ==========================================
// 护照草稿导入系统 - 领域类型定义
// ==========================================
// 约束: 所有枚举只允许列出的取值，数据库以小写代码存储
// 兼容: 历史数据/前端使用阿拉伯语标签，parse 时同时接受
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 草稿完成状态 (Completion Status)
// ==========================================
// 无状态机约束: 任意状态之间可以互相切换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    Draft, // 草稿 (مسودة)
    InReview,         // 审核中 (قيد المراجعة)
    ReadyForTransfer, // 可转正 (جاهز للنقل)
}

impl CompletionStatus {
    pub const ALL: [CompletionStatus; 3] = [
        CompletionStatus::Draft,
        CompletionStatus::InReview,
        CompletionStatus::ReadyForTransfer,
    ];

    /// 数据库存储代码
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Draft => "draft",
            CompletionStatus::InReview => "in_review",
            CompletionStatus::ReadyForTransfer => "ready_for_transfer",
        }
    }

    /// 前端展示标签
    pub fn label(&self) -> &'static str {
        match self {
            CompletionStatus::Draft => "مسودة",
            CompletionStatus::InReview => "قيد المراجعة",
            CompletionStatus::ReadyForTransfer => "جاهز للنقل",
        }
    }

    /// 解析状态代码或阿拉伯语标签，未知取值返回 None（不做兜底）
    pub fn parse(raw: &str) -> Option<CompletionStatus> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(trimmed) || s.label() == trimmed)
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 照片类型 (Photo Kind)
// ==========================================
// 每种照片对应 draft_passports 表的一列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    Personal,
    Passport,
    Residence,
    PassportExtension,
}

impl PhotoKind {
    pub const ALL: [PhotoKind; 4] = [
        PhotoKind::Personal,
        PhotoKind::Passport,
        PhotoKind::Residence,
        PhotoKind::PassportExtension,
    ];

    /// 对应的数据库列名
    pub fn column(&self) -> &'static str {
        match self {
            PhotoKind::Personal => "personal_photo",
            PhotoKind::Passport => "passport_photo",
            PhotoKind::Residence => "residence_photo",
            PhotoKind::PassportExtension => "passport_extension_photo",
        }
    }

    pub fn parse(raw: &str) -> Option<PhotoKind> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.column() == trimmed || k.as_str() == trimmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Personal => "personal",
            PhotoKind::Passport => "passport",
            PhotoKind::Residence => "residence",
            PhotoKind::PassportExtension => "passport_extension",
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 护照办理状态 (Passport Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassportStatus {
    #[default]
    InProgress, // 办理中 (قيد الانجاز)
    ReadyForPickup, // 待领取 (جاهز للاستلام)
    Delivered,      // 已交付 (تم تسليمه)
}

impl PassportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassportStatus::InProgress => "in_progress",
            PassportStatus::ReadyForPickup => "ready_for_pickup",
            PassportStatus::Delivered => "delivered",
        }
    }

    pub fn parse(raw: &str) -> Option<PassportStatus> {
        match raw.trim() {
            "in_progress" | "قيد الانجاز" => Some(PassportStatus::InProgress),
            "ready_for_pickup" | "جاهز للاستلام" => Some(PassportStatus::ReadyForPickup),
            "delivered" | "تم تسليمه" => Some(PassportStatus::Delivered),
            _ => None,
        }
    }
}

impl fmt::Display for PassportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 付款状态 (Payment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid, // 已付 (تم)
    #[default]
    Unpaid, // 未付 (لم يتم)
    PayLater, // 稍后付 (يدفع لاحقا)
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PayLater => "pay_later",
        }
    }

    pub fn parse(raw: &str) -> Option<PaymentStatus> {
        match raw.trim() {
            "paid" | "تم" => Some(PaymentStatus::Paid),
            "unpaid" | "لم يتم" => Some(PaymentStatus::Unpaid),
            "pay_later" | "يدفع لاحقا" => Some(PaymentStatus::PayLater),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_status_parse_code_and_label() {
        assert_eq!(CompletionStatus::parse("draft"), Some(CompletionStatus::Draft));
        assert_eq!(
            CompletionStatus::parse("قيد المراجعة"),
            Some(CompletionStatus::InReview)
        );
        assert_eq!(
            CompletionStatus::parse(" READY_FOR_TRANSFER "),
            Some(CompletionStatus::ReadyForTransfer)
        );
    }

    #[test]
    fn test_completion_status_rejects_unknown() {
        assert_eq!(CompletionStatus::parse("archived"), None);
        assert_eq!(CompletionStatus::parse(""), None);
    }

    #[test]
    fn test_completion_status_default_is_draft() {
        assert_eq!(CompletionStatus::default(), CompletionStatus::Draft);
    }

    #[test]
    fn test_photo_kind_parse_column_name() {
        assert_eq!(
            PhotoKind::parse("passport_extension_photo"),
            Some(PhotoKind::PassportExtension)
        );
        assert_eq!(PhotoKind::parse("residence"), Some(PhotoKind::Residence));
        assert_eq!(PhotoKind::parse("signature"), None);
    }
}
