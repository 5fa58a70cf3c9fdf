// ==========================================
// 护照草稿导入系统 - 草稿 Repository
// ==========================================
// 职责: draft_passports 表 CRUD / 分页 / 全量重载事务
// 红线: Repository 不含业务规则，只做数据存取
// ==========================================

use crate::db::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::draft::{DraftFields, DraftPage, DraftRecord, ReloadOutcome};
use crate::domain::types::{CompletionStatus, PhotoKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DRAFT_COLUMNS: &str = r#"
    id, gender, full_name, nationality, passport_number, passport_id,
    date_of_birth, residence_expiry_date, expiration_date,
    phone_number, mobile_number, transaction_type, residence_authority,
    address, governorate, zipcode, najacode,
    personal_photo, passport_photo, residence_photo, passport_extension_photo,
    notes, completion_status, created_at, updated_at
"#;

// ==========================================
// DraftRecordRepository Trait
// ==========================================
// 实现者: DraftRecordRepositoryImpl（rusqlite）
// 测试中可包装实现以注入行级失败
pub trait DraftRecordRepository: Send + Sync {
    /// 新建草稿，completion_status 缺省为 draft
    fn create(&self, fields: &DraftFields) -> RepositoryResult<DraftRecord>;

    /// 按 id 查询（不存在返回 NotFound）
    fn get(&self, id: i64) -> RepositoryResult<DraftRecord>;

    /// 更新草稿
    ///
    /// # 语义
    /// - 文本与日期字段整体覆盖
    /// - 照片字段与 completion_status 为 None 时保留原值
    fn update(&self, id: i64, fields: &DraftFields) -> RepositoryResult<DraftRecord>;

    /// 删除草稿，返回被删除的记录（供调用方清理照片）
    fn delete(&self, id: i64) -> RepositoryResult<DraftRecord>;

    /// 分页查询（page 从 1 开始，按 created_at DESC, id DESC 排序）
    fn list(&self, page: u32, page_size: u32) -> RepositoryResult<DraftPage>;

    /// 切换完成状态（任意状态之间均可切换）
    fn set_status(&self, id: i64, status: CompletionStatus) -> RepositoryResult<DraftRecord>;

    /// 设置/清除照片路径，返回原路径
    fn set_photo(
        &self,
        id: i64,
        kind: PhotoKind,
        path: Option<&str>,
    ) -> RepositoryResult<Option<String>>;

    /// 全量重载: 同一事务内清空表、重置自增序列、逐行插入
    ///
    /// # 返回
    /// - 行级失败只回滚该行（SAVEPOINT），记录在 failed_rows
    fn replace_all(&self, rows: &[DraftFields]) -> RepositoryResult<ReloadOutcome>;

    fn count(&self) -> RepositoryResult<i64>;
}

// ==========================================
// DraftRecordRepositoryImpl
// ==========================================
pub struct DraftRecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl DraftRecordRepositoryImpl {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl DraftRecordRepository for DraftRecordRepositoryImpl {
    fn create(&self, fields: &DraftFields) -> RepositoryResult<DraftRecord> {
        let conn = self.get_conn()?;
        let id = insert_draft(&conn, fields, now())?;
        find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))
    }

    fn get(&self, id: i64) -> RepositoryResult<DraftRecord> {
        let conn = self.get_conn()?;
        find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))
    }

    fn update(&self, id: i64, fields: &DraftFields) -> RepositoryResult<DraftRecord> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE draft_passports SET
                gender = ?1,
                full_name = ?2,
                nationality = ?3,
                passport_number = ?4,
                passport_id = ?5,
                date_of_birth = ?6,
                residence_expiry_date = ?7,
                expiration_date = ?8,
                phone_number = ?9,
                mobile_number = ?10,
                transaction_type = ?11,
                residence_authority = ?12,
                address = ?13,
                governorate = ?14,
                zipcode = ?15,
                najacode = ?16,
                personal_photo = COALESCE(?17, personal_photo),
                passport_photo = COALESCE(?18, passport_photo),
                residence_photo = COALESCE(?19, residence_photo),
                passport_extension_photo = COALESCE(?20, passport_extension_photo),
                notes = ?21,
                completion_status = COALESCE(?22, completion_status),
                updated_at = ?23
            WHERE id = ?24
            "#,
            params![
                fields.gender,
                fields.full_name,
                fields.nationality,
                fields.passport_number,
                fields.passport_id,
                format_date(fields.date_of_birth),
                format_date(fields.residence_expiry_date),
                format_date(fields.expiration_date),
                fields.phone_number,
                fields.mobile_number,
                fields.transaction_type,
                fields.residence_authority,
                fields.address,
                fields.governorate,
                fields.zipcode,
                fields.najacode,
                fields.personal_photo,
                fields.passport_photo,
                fields.residence_photo,
                fields.passport_extension_photo,
                fields.notes,
                fields.completion_status.map(|s| s.as_str()),
                now().format(TIMESTAMP_FORMAT).to_string(),
                id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::draft_not_found(id));
        }

        find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))
    }

    fn delete(&self, id: i64) -> RepositoryResult<DraftRecord> {
        let conn = self.get_conn()?;
        let existing =
            find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))?;
        delete_draft_tx(&conn, id)?;
        Ok(existing)
    }

    fn list(&self, page: u32, page_size: u32) -> RepositoryResult<DraftPage> {
        let conn = self.get_conn()?;
        let page = page.max(1);
        let page_size = page_size.max(1);
        let offset = i64::from(page - 1) * i64::from(page_size);

        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM draft_passports", [], |row| row.get(0))?;

        let sql = format!(
            "SELECT {} FROM draft_passports ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            DRAFT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![i64::from(page_size), offset], |row| map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(DraftPage {
            items,
            total,
            page,
            page_size,
        })
    }

    fn set_status(&self, id: i64, status: CompletionStatus) -> RepositoryResult<DraftRecord> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE draft_passports SET completion_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_str(),
                now().format(TIMESTAMP_FORMAT).to_string(),
                id
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::draft_not_found(id));
        }

        find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))
    }

    fn set_photo(
        &self,
        id: i64,
        kind: PhotoKind,
        path: Option<&str>,
    ) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let existing =
            find_draft_tx(&conn, id)?.ok_or_else(|| RepositoryError::draft_not_found(id))?;
        let previous = existing.photo(kind).map(str::to_string);

        // 列名来自 PhotoKind 枚举，非外部输入
        let sql = format!(
            "UPDATE draft_passports SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            kind.column()
        );
        conn.execute(
            &sql,
            params![path, now().format(TIMESTAMP_FORMAT).to_string(), id],
        )?;

        Ok(previous)
    }

    fn replace_all(&self, rows: &[DraftFields]) -> RepositoryResult<ReloadOutcome> {
        let mut conn = self.get_conn()?;
        let mut tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let deleted_count = tx.execute("DELETE FROM draft_passports", [])?;
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name = 'draft_passports'",
            [],
        )?;

        let stamp = now();
        let mut outcome = ReloadOutcome {
            deleted_count,
            ..Default::default()
        };

        for (idx, fields) in rows.iter().enumerate() {
            let sp = tx.savepoint()?;
            match insert_draft(&sp, fields, stamp) {
                Ok(_) => {
                    sp.commit()?;
                    outcome.inserted_count += 1;
                }
                Err(e) => {
                    // Savepoint 在 drop 时回滚，仅撤销该行
                    drop(sp);
                    outcome.failed_rows.push((idx, e.to_string()));
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcome)
    }

    fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM draft_passports", [], |row| row.get(0))?;
        Ok(total)
    }
}

// ==========================================
// 连接/事务级辅助函数（供转正事务复用）
// ==========================================

/// 在给定连接（或事务）上按 id 读取草稿
pub(crate) fn find_draft_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<DraftRecord>> {
    let sql = format!("SELECT {} FROM draft_passports WHERE id = ?1", DRAFT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;

    match stmt.query_row(params![id], |row| map_row(row)) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 在给定连接（或事务）上删除草稿，返回删除行数
pub(crate) fn delete_draft_tx(conn: &Connection, id: i64) -> RepositoryResult<usize> {
    let rows = conn.execute("DELETE FROM draft_passports WHERE id = ?1", params![id])?;
    Ok(rows)
}

fn insert_draft(
    conn: &Connection,
    fields: &DraftFields,
    stamp: NaiveDateTime,
) -> RepositoryResult<i64> {
    let stamp = stamp.format(TIMESTAMP_FORMAT).to_string();
    let status = fields.completion_status.unwrap_or_default();

    conn.execute(
        r#"
        INSERT INTO draft_passports (
            gender, full_name, nationality, passport_number, passport_id,
            date_of_birth, residence_expiry_date, expiration_date,
            phone_number, mobile_number, transaction_type, residence_authority,
            address, governorate, zipcode, najacode,
            personal_photo, passport_photo, residence_photo, passport_extension_photo,
            notes, completion_status, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24
        )
        "#,
        params![
            fields.gender,
            fields.full_name,
            fields.nationality,
            fields.passport_number,
            fields.passport_id,
            format_date(fields.date_of_birth),
            format_date(fields.residence_expiry_date),
            format_date(fields.expiration_date),
            fields.phone_number,
            fields.mobile_number,
            fields.transaction_type,
            fields.residence_authority,
            fields.address,
            fields.governorate,
            fields.zipcode,
            fields.najacode,
            fields.personal_photo,
            fields.passport_photo,
            fields.residence_photo,
            fields.passport_extension_photo,
            fields.notes,
            status.as_str(),
            stamp,
            stamp,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date_column(idx: usize, raw: Option<String>) -> SqliteResult<Option<NaiveDate>> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
        None => Ok(None),
    }
}

fn parse_timestamp_column(idx: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row(row: &Row) -> SqliteResult<DraftRecord> {
    let status_str: String = row.get(22)?;
    let completion_status = CompletionStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            22,
            rusqlite::types::Type::Text,
            format!("未知 completion_status: {}", status_str).into(),
        )
    })?;
    let created_at_str: String = row.get(23)?;
    let updated_at_str: String = row.get(24)?;

    Ok(DraftRecord {
        id: row.get(0)?,
        gender: row.get(1)?,
        full_name: row.get(2)?,
        nationality: row.get(3)?,
        passport_number: row.get(4)?,
        passport_id: row.get(5)?,
        date_of_birth: parse_date_column(6, row.get(6)?)?,
        residence_expiry_date: parse_date_column(7, row.get(7)?)?,
        expiration_date: parse_date_column(8, row.get(8)?)?,
        phone_number: row.get(9)?,
        mobile_number: row.get(10)?,
        transaction_type: row.get(11)?,
        residence_authority: row.get(12)?,
        address: row.get(13)?,
        governorate: row.get(14)?,
        zipcode: row.get(15)?,
        najacode: row.get(16)?,
        personal_photo: row.get(17)?,
        passport_photo: row.get(18)?,
        residence_photo: row.get(19)?,
        passport_extension_photo: row.get(20)?,
        notes: row.get(21)?,
        completion_status,
        created_at: parse_timestamp_column(23, &created_at_str)?,
        updated_at: parse_timestamp_column(24, &updated_at_str)?,
    })
}
