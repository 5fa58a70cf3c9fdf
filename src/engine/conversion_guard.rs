// ==========================================
// 护照草稿导入系统 - 转正守卫
// ==========================================
// 流程（单个 IMMEDIATE 事务）:
//   读取草稿 → 必填校验（按序，首个缺失即失败） → 生成编码
//   → 工厂创建正式护照 → 删除草稿 → 提交
// 约束:
// - 创建失败: 回滚，草稿不变
// - 删除失败或删除 0 行: 回滚并按一致性错误上报
// ==========================================

use crate::config::IntakeConfigReader;
use crate::domain::draft::DraftRecord;
use crate::domain::passport::{NewPassport, Passport};
use crate::domain::types::{PassportStatus, PaymentStatus};
use crate::engine::error::{ConversionError, ConversionResult};
use crate::repository::draft_record_repo::{delete_draft_tx, find_draft_tx};
use crate::repository::error::RepositoryError;
use crate::repository::PassportFactory;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument};

/// 转正必填字段（校验顺序即报错顺序）
pub const REQUIRED_FIELDS: [&str; 7] = [
    "full_name",
    "nationality",
    "passport_number",
    "date_of_birth",
    "residence_expiry_date",
    "mobile_number",
    "transaction_type",
];

/// 校验通过后的必填值
#[derive(Debug, Clone)]
pub struct RequiredFields {
    pub full_name: String,
    pub nationality: String,
    pub passport_number: String,
    pub date_of_birth: NaiveDate,
    pub residence_expiry_date: NaiveDate,
    pub mobile_number: String,
    pub transaction_type: String,
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 按固定顺序校验必填字段
pub fn validate_required(draft: &DraftRecord) -> ConversionResult<RequiredFields> {
    let missing = |field: &'static str| ConversionError::Validation { field };

    Ok(RequiredFields {
        full_name: text(&draft.full_name).ok_or_else(|| missing(REQUIRED_FIELDS[0]))?,
        nationality: text(&draft.nationality).ok_or_else(|| missing(REQUIRED_FIELDS[1]))?,
        passport_number: text(&draft.passport_number)
            .ok_or_else(|| missing(REQUIRED_FIELDS[2]))?,
        date_of_birth: draft
            .date_of_birth
            .ok_or_else(|| missing(REQUIRED_FIELDS[3]))?,
        residence_expiry_date: draft
            .residence_expiry_date
            .ok_or_else(|| missing(REQUIRED_FIELDS[4]))?,
        mobile_number: text(&draft.mobile_number).ok_or_else(|| missing(REQUIRED_FIELDS[5]))?,
        transaction_type: text(&draft.transaction_type)
            .ok_or_else(|| missing(REQUIRED_FIELDS[6]))?,
    })
}

/// 编码格式: 前缀 + 补零序号（P000001）
pub fn format_unique_code(prefix: &str, sequence: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, sequence, width = width)
}

// ==========================================
// ConversionGuard
// ==========================================
pub struct ConversionGuard<F, C>
where
    F: PassportFactory,
    C: IntakeConfigReader,
{
    conn: Arc<Mutex<Connection>>,
    factory: F,
    config: C,
}

impl<F, C> ConversionGuard<F, C>
where
    F: PassportFactory,
    C: IntakeConfigReader,
{
    pub fn new(conn: Arc<Mutex<Connection>>, factory: F, config: C) -> Self {
        Self {
            conn,
            factory,
            config,
        }
    }

    /// 草稿转正
    ///
    /// # 参数
    /// - draft_id: 草稿 id
    /// - operator: 操作人（None 或空白时使用配置的默认操作人）
    #[instrument(skip(self, operator))]
    pub fn convert(&self, draft_id: i64, operator: Option<&str>) -> ConversionResult<Passport> {
        // 配置读取与转正事务共用连接，必须在加锁前完成
        let prefix = self.config.get_unique_code_prefix()?;
        let width = self.config.get_unique_code_width()?;
        let delivered_by = match operator.map(str::trim).filter(|v| !v.is_empty()) {
            Some(op) => op.to_string(),
            None => self.config.get_default_operator()?,
        };

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ConversionError::Database(format!("锁获取失败: {}", e)))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let draft = find_draft_tx(&tx, draft_id)?.ok_or(ConversionError::NotFound(draft_id))?;
        let required = validate_required(&draft)?;

        let sequence = self.factory.next_code_sequence(&tx)?;
        let new_passport = NewPassport {
            full_name: required.full_name,
            nationality: required.nationality,
            passport_number: required.passport_number,
            unique_code: format_unique_code(&prefix, sequence, width),
            date_of_birth: required.date_of_birth,
            residence_expiry_date: required.residence_expiry_date,
            phone_number: text(&draft.phone_number),
            mobile_number: required.mobile_number,
            transaction_type: required.transaction_type,
            passport_status: PassportStatus::InProgress,
            payment_status: PaymentStatus::Unpaid,
            passport_delivery_date: Local::now().date_naive(),
            delivered_by,
            address: draft.address.clone().unwrap_or_default(),
            zipcode: text(&draft.zipcode),
            personal_photo: draft.personal_photo.clone(),
            passport_photo: draft.passport_photo.clone(),
            code_sequence: sequence,
        };

        let passport = self
            .factory
            .create(&tx, &new_passport)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(msg) => {
                    ConversionError::EntityCreation(format!("护照号或编码重复: {}", msg))
                }
                other => ConversionError::EntityCreation(other.to_string()),
            })?;

        match delete_draft_tx(&tx, draft_id) {
            Ok(1) => {}
            Ok(rows) => {
                error!(
                    draft_id,
                    passport_id = passport.id,
                    deleted_rows = rows,
                    "草稿删除行数异常，转正已回滚"
                );
                return Err(ConversionError::ConversionConsistency {
                    draft_id,
                    message: format!("删除草稿影响行数为 {}", rows),
                });
            }
            Err(e) => {
                error!(
                    draft_id,
                    passport_id = passport.id,
                    error = %e,
                    "草稿删除失败，转正已回滚"
                );
                return Err(ConversionError::ConversionConsistency {
                    draft_id,
                    message: e.to_string(),
                });
            }
        }

        tx.commit()?;

        info!(
            draft_id,
            passport_id = passport.id,
            unique_code = %passport.unique_code,
            delivered_by = %passport.delivered_by,
            "草稿转正完成"
        );

        Ok(passport)
    }
}
