// ==========================================
// 护照草稿导入系统 - 正式护照领域模型
// ==========================================
// 归属: 外部协作方（PassportFactory）
// 约束: passport_number / unique_code 全局唯一
// ==========================================

use crate::domain::types::{PassportStatus, PaymentStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// NewPassport - 创建正式护照所需字段
// ==========================================
// 必填字段已由 ConversionGuard 校验，此处为非空类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPassport {
    pub full_name: String,
    pub nationality: String,
    pub passport_number: String,
    pub unique_code: String,
    pub date_of_birth: NaiveDate,
    pub residence_expiry_date: NaiveDate,
    pub phone_number: Option<String>,
    pub mobile_number: String,
    pub transaction_type: String,
    pub passport_status: PassportStatus,
    pub payment_status: PaymentStatus,
    pub passport_delivery_date: NaiveDate,
    pub delivered_by: String,
    pub address: String,
    pub zipcode: Option<String>,
    pub personal_photo: Option<String>,
    pub passport_photo: Option<String>,
    pub code_sequence: i64,
}

// ==========================================
// Passport - 正式护照
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passport {
    pub id: i64,
    pub full_name: String,
    pub nationality: String,
    pub passport_number: String,
    pub unique_code: String,
    pub date_of_birth: NaiveDate,
    pub residence_expiry_date: NaiveDate,
    pub phone_number: Option<String>,
    pub mobile_number: String,
    pub transaction_type: String,
    pub passport_status: PassportStatus,
    pub payment_status: PaymentStatus,
    pub passport_delivery_date: NaiveDate,
    pub delivered_by: String,
    pub address: String,
    pub zipcode: Option<String>,
    pub personal_photo: Option<String>,
    pub passport_photo: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
