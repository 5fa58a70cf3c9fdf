// ==========================================
// 护照草稿导入系统 - 位置列映射（xlsx / 旧版 CSV）
// ==========================================
// 列契约固定，不可调整:
//   0 序号 / 1 副参考号 → notes 模板
//   2 姓名 / 3 护照号 / 4 国籍 / 5 出生日期 / 6 手机号
//   7 到期日期 / 8 邮编 / 9 省份 + 10 街道 → address
// 与表头映射（header_mapper）是两套独立契约
// ==========================================

use crate::domain::draft::DraftFields;
use crate::domain::types::CompletionStatus;
use crate::importer::date_coercion::coerce_positional_date;
use crate::importer::worksheet::RawRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionalColumn {
    SequenceNo,
    SecondaryRef,
    FullName,
    PassportNumber,
    Nationality,
    DateOfBirth,
    MobileNumber,
    ExpiryDate,
    Zipcode,
    Governorate,
    StreetAddress,
}

impl PositionalColumn {
    pub const ALL: [PositionalColumn; 11] = [
        PositionalColumn::SequenceNo,
        PositionalColumn::SecondaryRef,
        PositionalColumn::FullName,
        PositionalColumn::PassportNumber,
        PositionalColumn::Nationality,
        PositionalColumn::DateOfBirth,
        PositionalColumn::MobileNumber,
        PositionalColumn::ExpiryDate,
        PositionalColumn::Zipcode,
        PositionalColumn::Governorate,
        PositionalColumn::StreetAddress,
    ];

    pub fn index(&self) -> usize {
        match self {
            PositionalColumn::SequenceNo => 0,
            PositionalColumn::SecondaryRef => 1,
            PositionalColumn::FullName => 2,
            PositionalColumn::PassportNumber => 3,
            PositionalColumn::Nationality => 4,
            PositionalColumn::DateOfBirth => 5,
            PositionalColumn::MobileNumber => 6,
            PositionalColumn::ExpiryDate => 7,
            PositionalColumn::Zipcode => 8,
            PositionalColumn::Governorate => 9,
            PositionalColumn::StreetAddress => 10,
        }
    }

    /// 写入的草稿字段（notes / address 为组合字段）
    pub fn target_field(&self) -> &'static str {
        match self {
            PositionalColumn::SequenceNo | PositionalColumn::SecondaryRef => "notes",
            PositionalColumn::FullName => "full_name",
            PositionalColumn::PassportNumber => "passport_number",
            PositionalColumn::Nationality => "nationality",
            PositionalColumn::DateOfBirth => "date_of_birth",
            PositionalColumn::MobileNumber => "mobile_number",
            PositionalColumn::ExpiryDate => "residence_expiry_date",
            PositionalColumn::Zipcode => "zipcode",
            PositionalColumn::Governorate | PositionalColumn::StreetAddress => "address",
        }
    }
}

pub struct PositionalRowProjector;

impl PositionalRowProjector {
    /// 多于一行时首行视为表头并丢弃；单行文件按数据处理
    pub fn drop_header(rows: Vec<RawRow>) -> (Vec<RawRow>, usize) {
        if rows.len() > 1 {
            (rows.into_iter().skip(1).collect(), 1)
        } else {
            (rows, 0)
        }
    }

    /// 投影一行
    ///
    /// # 返回
    /// - None: 姓名列为空或缺失，调用方跳过该行
    pub fn project(&self, row: &[String]) -> Option<DraftFields> {
        let full_name = cell(row, PositionalColumn::FullName)?;

        let sequence = cell(row, PositionalColumn::SequenceNo).unwrap_or_default();
        let secondary = cell(row, PositionalColumn::SecondaryRef).unwrap_or_default();

        Some(DraftFields {
            full_name: Some(full_name),
            passport_number: cell(row, PositionalColumn::PassportNumber),
            nationality: cell(row, PositionalColumn::Nationality),
            date_of_birth: cell(row, PositionalColumn::DateOfBirth)
                .and_then(|raw| coerce_positional_date(&raw)),
            mobile_number: cell(row, PositionalColumn::MobileNumber),
            residence_expiry_date: cell(row, PositionalColumn::ExpiryDate)
                .and_then(|raw| coerce_positional_date(&raw)),
            zipcode: cell(row, PositionalColumn::Zipcode),
            address: join_address(
                cell(row, PositionalColumn::Governorate).as_deref(),
                cell(row, PositionalColumn::StreetAddress).as_deref(),
            ),
            notes: Some(format!("التسلسل: {}, سیده: {}", sequence, secondary)),
            completion_status: Some(CompletionStatus::Draft),
            ..Default::default()
        })
    }
}

/// 取单元格（去首尾空白，空串视为缺失）
fn cell(row: &[String], column: PositionalColumn) -> Option<String> {
    row.get(column.index())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// "<省份> - <街道>"，去除两端空格与短横线；全空时返回 None
fn join_address(governorate: Option<&str>, street: Option<&str>) -> Option<String> {
    let joined = format!(
        "{} - {}",
        governorate.unwrap_or_default(),
        street.unwrap_or_default()
    );
    let trimmed = joined.trim_matches(|c| c == ' ' || c == '-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_column_contract_is_stable() {
        let indices: Vec<usize> = PositionalColumn::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(indices, (0..11).collect::<Vec<_>>());
        assert_eq!(PositionalColumn::ExpiryDate.target_field(), "residence_expiry_date");
        assert_eq!(PositionalColumn::MobileNumber.target_field(), "mobile_number");
    }

    #[test]
    fn test_project_full_row() {
        let fields = PositionalRowProjector
            .project(&row(&[
                "1",
                "2",
                "Ali Hassan",
                "P123",
                "Iraqi",
                "1990-05-01",
                "07701234567",
                "2030-01-01",
                "12345",
                "Baghdad",
                "Karrada",
            ]))
            .unwrap();

        assert_eq!(fields.full_name.as_deref(), Some("Ali Hassan"));
        assert_eq!(fields.passport_number.as_deref(), Some("P123"));
        assert_eq!(fields.nationality.as_deref(), Some("Iraqi"));
        assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(fields.mobile_number.as_deref(), Some("07701234567"));
        assert_eq!(
            fields.residence_expiry_date,
            NaiveDate::from_ymd_opt(2030, 1, 1)
        );
        assert_eq!(fields.zipcode.as_deref(), Some("12345"));
        assert_eq!(fields.address.as_deref(), Some("Baghdad - Karrada"));
        assert_eq!(fields.notes.as_deref(), Some("التسلسل: 1, سیده: 2"));
        assert_eq!(fields.completion_status, Some(CompletionStatus::Draft));
    }

    #[test]
    fn test_missing_name_is_skipped() {
        assert!(PositionalRowProjector
            .project(&row(&["1", "2", "  ", "P1"]))
            .is_none());
        assert!(PositionalRowProjector.project(&row(&["1", "2"])).is_none());
    }

    #[test]
    fn test_address_trimming() {
        assert_eq!(join_address(None, Some("X")), Some("X".to_string()));
        assert_eq!(join_address(Some("Basra"), None), Some("Basra".to_string()));
        assert_eq!(join_address(None, None), None);
    }

    #[test]
    fn test_serial_dates_are_converted() {
        let fields = PositionalRowProjector
            .project(&row(&["", "", "A", "", "", "32994", "", "44197"]))
            .unwrap();
        assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(
            fields.residence_expiry_date,
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(fields.address, None);
    }

    #[test]
    fn test_drop_header_only_when_multiple_rows() {
        let (rows, offset) = PositionalRowProjector::drop_header(vec![row(&["h"]), row(&["d"])]);
        assert_eq!(rows, vec![row(&["d"])]);
        assert_eq!(offset, 1);

        let (rows, offset) = PositionalRowProjector::drop_header(vec![row(&["only"])]);
        assert_eq!(rows.len(), 1);
        assert_eq!(offset, 0);
    }
}
