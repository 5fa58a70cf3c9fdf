// ==========================================
// 护照草稿导入系统 - 正式护照 Repository
// ==========================================
// 职责:
// - PassportFactory: 在调用方事务内创建正式护照
// - PassportRepository: 只读查询（列表/按护照号）
// 约束: passport_number / unique_code 由表级 UNIQUE 保证
// ==========================================

use crate::db::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::passport::{NewPassport, Passport};
use crate::domain::types::{PassportStatus, PaymentStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const PASSPORT_COLUMNS: &str = r#"
    id, full_name, nationality, passport_number, unique_code,
    date_of_birth, residence_expiry_date, phone_number, mobile_number,
    transaction_type, passport_status, payment_status, passport_delivery_date,
    delivered_by, address, zipcode, personal_photo, passport_photo,
    created_at, updated_at
"#;

// ==========================================
// PassportFactory Trait
// ==========================================
// 调用方持有事务，工厂只在该连接上执行语句，不自行提交
pub trait PassportFactory: Send + Sync {
    /// 下一个编码序号（已发放的最大序号 + 1，删除不会导致复用）
    fn next_code_sequence(&self, conn: &Connection) -> RepositoryResult<i64>;

    /// 创建正式护照
    fn create(&self, conn: &Connection, passport: &NewPassport) -> RepositoryResult<Passport>;
}

// ==========================================
// SqlitePassportFactory
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct SqlitePassportFactory;

impl SqlitePassportFactory {
    pub fn new() -> Self {
        Self
    }
}

impl PassportFactory for SqlitePassportFactory {
    fn next_code_sequence(&self, conn: &Connection) -> RepositoryResult<i64> {
        let max: Option<i64> =
            conn.query_row("SELECT MAX(code_sequence) FROM passports", [], |row| {
                row.get(0)
            })?;
        Ok(max.unwrap_or(0) + 1)
    }

    fn create(&self, conn: &Connection, passport: &NewPassport) -> RepositoryResult<Passport> {
        let stamp = Local::now()
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        conn.execute(
            r#"
            INSERT INTO passports (
                full_name, nationality, passport_number, unique_code, code_sequence,
                date_of_birth, residence_expiry_date, phone_number, mobile_number,
                transaction_type, passport_status, payment_status, passport_delivery_date,
                delivered_by, address, zipcode, personal_photo, passport_photo,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18,
                ?19, ?20
            )
            "#,
            params![
                passport.full_name,
                passport.nationality,
                passport.passport_number,
                passport.unique_code,
                passport.code_sequence,
                passport.date_of_birth.format(DATE_FORMAT).to_string(),
                passport.residence_expiry_date.format(DATE_FORMAT).to_string(),
                passport.phone_number,
                passport.mobile_number,
                passport.transaction_type,
                passport.passport_status.as_str(),
                passport.payment_status.as_str(),
                passport.passport_delivery_date.format(DATE_FORMAT).to_string(),
                passport.delivered_by,
                passport.address,
                passport.zipcode,
                passport.personal_photo,
                passport.passport_photo,
                stamp,
                stamp,
            ],
        )?;

        let id = conn.last_insert_rowid();
        find_passport(conn, "id = ?1", params![id])?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Passport".to_string(),
            id: id.to_string(),
        })
    }
}

// ==========================================
// PassportRepository - 只读查询
// ==========================================
pub struct PassportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PassportRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_unique_code(&self, unique_code: &str) -> RepositoryResult<Option<Passport>> {
        let conn = self.get_conn()?;
        find_passport(&conn, "unique_code = ?1", params![unique_code])
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM passports", [], |row| row.get(0))?;
        Ok(total)
    }
}

fn find_passport(
    conn: &Connection,
    predicate: &str,
    args: &[&dyn rusqlite::ToSql],
) -> RepositoryResult<Option<Passport>> {
    let sql = format!(
        "SELECT {} FROM passports WHERE {} LIMIT 1",
        PASSPORT_COLUMNS, predicate
    );
    let mut stmt = conn.prepare(&sql)?;

    match stmt.query_row(args, |row| map_row(row)) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn conversion_failure(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

fn parse_date(idx: usize, raw: &str) -> SqliteResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| conversion_failure(idx, format!("日期格式错误: {} ({})", raw, e)))
}

fn parse_timestamp(idx: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_failure(idx, format!("时间格式错误: {} ({})", raw, e)))
}

fn map_row(row: &Row) -> SqliteResult<Passport> {
    let date_of_birth: String = row.get(5)?;
    let residence_expiry_date: String = row.get(6)?;
    let passport_status: String = row.get(10)?;
    let payment_status: String = row.get(11)?;
    let passport_delivery_date: String = row.get(12)?;
    let created_at: String = row.get(18)?;
    let updated_at: String = row.get(19)?;

    Ok(Passport {
        id: row.get(0)?,
        full_name: row.get(1)?,
        nationality: row.get(2)?,
        passport_number: row.get(3)?,
        unique_code: row.get(4)?,
        date_of_birth: parse_date(5, &date_of_birth)?,
        residence_expiry_date: parse_date(6, &residence_expiry_date)?,
        phone_number: row.get(7)?,
        mobile_number: row.get(8)?,
        transaction_type: row.get(9)?,
        passport_status: PassportStatus::parse(&passport_status).ok_or_else(|| {
            conversion_failure(10, format!("未知 passport_status: {}", passport_status))
        })?,
        payment_status: PaymentStatus::parse(&payment_status).ok_or_else(|| {
            conversion_failure(11, format!("未知 payment_status: {}", payment_status))
        })?,
        passport_delivery_date: parse_date(12, &passport_delivery_date)?,
        delivered_by: row.get(13)?,
        address: row.get(14)?,
        zipcode: row.get(15)?,
        personal_photo: row.get(16)?,
        passport_photo: row.get(17)?,
        created_at: parse_timestamp(18, &created_at)?,
        updated_at: parse_timestamp(19, &updated_at)?,
    })
}
