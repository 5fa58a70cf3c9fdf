// ==========================================
// 护照草稿导入系统 - 表头列映射（全量重载 CSV）
// ==========================================
// 扇出规则（一列写入两个字段）:
//   Passport_ID     → passport_id + passport_number
//   Phone_Number    → phone_number + mobile_number
//   Expiration_Date → expiration_date + residence_expiry_date
//   najacode        → najacode + zipcode
// 日期只走自由格式解析，不识别 Excel 序列号
// ==========================================

use crate::domain::draft::DraftFields;
use crate::domain::types::CompletionStatus;
use crate::importer::csv_decoder::HeaderRow;
use crate::importer::date_coercion::parse_free_form_date;

/// 表头名称（区分大小写）
pub mod headers {
    pub const GENDER: &str = "Gender";
    pub const FULL_NAME: &str = "Full_Name";
    pub const PASSPORT_ID: &str = "Passport_ID";
    pub const NATIONALITY: &str = "Nationality";
    pub const DATE_OF_BIRTH: &str = "Date_of_Birth";
    pub const PHONE_NUMBER: &str = "Phone_Number";
    pub const EXPIRATION_DATE: &str = "Expiration_Date";
    pub const ADDRESS: &str = "Address";
    pub const GOVERNORATE: &str = "Governorate";
    pub const NAJACODE: &str = "najacode";

    // 可选列
    pub const RESIDENCE_AUTHORITY: &str = "Residence_Authority";
    pub const PERSONAL_PHOTO: &str = "Personal_Photo";
    pub const PASSPORT_PHOTO: &str = "Passport_Photo";
    pub const RESIDENCE_PHOTO: &str = "Residence_Photo";
    pub const PASSPORT_EXTENSION_PHOTO: &str = "Passport_Extension_Photo";
}

pub struct HeaderRowProjector;

impl HeaderRowProjector {
    /// 投影一行
    ///
    /// # 返回
    /// - None: 整行为空，调用方跳过
    pub fn project(&self, row: &HeaderRow) -> Option<DraftFields> {
        if !has_any_value(row) {
            return None;
        }

        let passport_id = value(row, headers::PASSPORT_ID);
        let phone = value(row, headers::PHONE_NUMBER);
        let expiration = value(row, headers::EXPIRATION_DATE).and_then(|v| parse_free_form_date(&v));
        let najacode = value(row, headers::NAJACODE);

        Some(DraftFields {
            gender: value(row, headers::GENDER),
            full_name: value(row, headers::FULL_NAME),
            passport_number: passport_id.clone(),
            passport_id,
            nationality: value(row, headers::NATIONALITY),
            date_of_birth: value(row, headers::DATE_OF_BIRTH)
                .and_then(|v| parse_free_form_date(&v)),
            mobile_number: phone.clone(),
            phone_number: phone,
            residence_expiry_date: expiration,
            expiration_date: expiration,
            address: value(row, headers::ADDRESS),
            governorate: value(row, headers::GOVERNORATE),
            zipcode: najacode.clone(),
            najacode,
            residence_authority: value(row, headers::RESIDENCE_AUTHORITY),
            personal_photo: value(row, headers::PERSONAL_PHOTO),
            passport_photo: value(row, headers::PASSPORT_PHOTO),
            residence_photo: value(row, headers::RESIDENCE_PHOTO),
            passport_extension_photo: value(row, headers::PASSPORT_EXTENSION_PHOTO),
            completion_status: Some(CompletionStatus::Draft),
            ..Default::default()
        })
    }
}

fn value(row: &HeaderRow, header: &str) -> Option<String> {
    row.get(header)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn has_any_value(row: &HeaderRow) -> bool {
    row.values().any(|v| !v.trim().is_empty())
}
