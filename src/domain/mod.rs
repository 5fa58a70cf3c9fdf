// ==========================================
// 护照草稿导入系统 - 领域模型层
// ==========================================
// 职责: 定义草稿/正式护照实体与枚举类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod draft;
pub mod passport;
pub mod types;

// 重导出核心类型
pub use draft::{
    DraftFields, DraftPage, DraftRecord, ImportSummary, ReloadOutcome, ReloadSummary,
};
pub use passport::{NewPassport, Passport};
pub use types::{CompletionStatus, PassportStatus, PaymentStatus, PhotoKind};
