// ==========================================
// BulkReloadImporter 集成测试
// ==========================================
// 测试目标: 表头 CSV 全量重载（清空 + 重写，单事务）
// ==========================================


use chrono::NaiveDate;
use passport_intake::domain::DraftFields;
use passport_intake::importer::{BulkReloadImporter, BulkReloader, ImportError};
use passport_intake::logging;
use passport_intake::repository::{DraftRecordRepository, DraftRecordRepositoryImpl};
use std::io::Write;
use test_helpers::{
    count_drafts, create_test_db, install_failing_name_trigger, open_shared, write_csv,
};

const RELOAD_CSV: &str = "\u{feff}Gender,Full_Name,Passport_ID,Nationality,Date_of_Birth,Phone_Number,Expiration_Date,Address,Governorate,najacode\n\
M,Ali Hassan,P123,Iraqi,1990-05-01,07701234567,01/15/2030,Karrada,Baghdad,12345\n\
,,,,,,,,,\n\
F,Sara Ahmed,P456,Syrian,15.03.1988,07801234567,20291231,Mansour,Baghdad,54321\n";

/// (id, 姓名, 护照号, 出生日期, 到期日期, 邮编)
type Snapshot = Vec<(
    i64,
    Option<String>,
    Option<String>,
    Option<NaiveDate>,
    Option<NaiveDate>,
    Option<String>,
)>;

fn snapshot(repo: &DraftRecordRepositoryImpl) -> Snapshot {
    let mut items = repo.list(1, 1000).unwrap().items;
    items.sort_by_key(|d| d.id);
    items
        .into_iter()
        .map(|d| {
            (
                d.id,
                d.full_name,
                d.passport_number,
                d.date_of_birth,
                d.residence_expiry_date,
                d.zipcode,
            )
        })
        .collect()
}

#[test]
fn test_reload_maps_headers_and_skips_blank_rows() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let reloader = BulkReloadImporter::new(DraftRecordRepositoryImpl::new(conn.clone()));

    let file = write_csv(RELOAD_CSV);
    let summary = reloader.reload_from_csv(file.path()).unwrap();

    assert_eq!(summary.deleted_count, 0);
    assert_eq!(summary.imported_count, 2);
    assert_eq!(summary.skipped_count, 1);
    assert!(summary.per_row_errors.is_empty());

    let ali = repo.get(1).unwrap();
    assert_eq!(ali.gender.as_deref(), Some("M"));
    assert_eq!(ali.passport_number.as_deref(), Some("P123"));
    assert_eq!(ali.passport_id.as_deref(), Some("P123"));
    assert_eq!(ali.phone_number.as_deref(), Some("07701234567"));
    assert_eq!(ali.mobile_number.as_deref(), Some("07701234567"));
    assert_eq!(ali.residence_expiry_date, NaiveDate::from_ymd_opt(2030, 1, 15));
    assert_eq!(ali.expiration_date, NaiveDate::from_ymd_opt(2030, 1, 15));
    assert_eq!(ali.zipcode.as_deref(), Some("12345"));
    assert_eq!(ali.najacode.as_deref(), Some("12345"));
    assert_eq!(ali.address.as_deref(), Some("Karrada"));
    assert_eq!(ali.governorate.as_deref(), Some("Baghdad"));

    let sara = repo.get(2).unwrap();
    assert_eq!(sara.date_of_birth, NaiveDate::from_ymd_opt(1988, 3, 15));
    assert_eq!(sara.residence_expiry_date, NaiveDate::from_ymd_opt(2029, 12, 31));
}

#[test]
fn test_reload_is_idempotent() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let reloader = BulkReloadImporter::new(DraftRecordRepositoryImpl::new(conn.clone()));

    // 已有草稿会被清空
    repo.create(&DraftFields {
        full_name: Some("Stale".to_string()),
        ..Default::default()
    })
    .unwrap();

    let file = write_csv(RELOAD_CSV);
    let first = reloader.reload_from_csv(file.path()).unwrap();
    let after_first = snapshot(&repo);

    let second = reloader.reload_from_csv(file.path()).unwrap();
    let after_second = snapshot(&repo);

    assert_eq!(first.deleted_count, 1);
    assert_eq!(second.deleted_count, 2);
    assert_eq!(first.imported_count, second.imported_count);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first[0].0, 1);
    assert_ne!(first.batch_id, second.batch_id);
}

#[test]
fn test_whole_file_errors_leave_table_untouched() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let reloader = BulkReloadImporter::new(DraftRecordRepositoryImpl::new(conn.clone()));

    repo.create(&DraftFields {
        full_name: Some("Keep Me".to_string()),
        ..Default::default()
    })
    .unwrap();

    // 仅支持 .csv
    let xlsx = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    assert!(matches!(
        reloader.reload_from_csv(xlsx.path()),
        Err(ImportError::UnsupportedFormat(_))
    ));

    // 文件不存在
    assert!(matches!(
        reloader.reload_from_csv(std::path::Path::new("/nonexistent/reload.csv")),
        Err(ImportError::FileNotFound(_))
    ));

    // 非法 UTF-8 → CSV 解码失败
    let mut broken = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    broken.write_all(b"Full_Name,Passport_ID\nAli,\xC3\x28\n").unwrap();
    assert!(matches!(
        reloader.reload_from_csv(broken.path()),
        Err(ImportError::CsvParseError(_))
    ));

    assert_eq!(count_drafts(&conn), 1);
    assert_eq!(repo.get(1).unwrap().full_name.as_deref(), Some("Keep Me"));
}

#[test]
fn test_row_failure_rolls_back_only_that_row() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    install_failing_name_trigger(&conn, "BOOM");
    let reloader = BulkReloadImporter::new(DraftRecordRepositoryImpl::new(conn.clone()));

    let file = write_csv(
        "Full_Name,Passport_ID\n\
         Ali Hassan,P1\n\
         BOOM,P2\n\
         Sara Ahmed,P3\n",
    );
    let summary = reloader.reload_from_csv(file.path()).unwrap();

    assert_eq!(summary.imported_count, 2);
    assert_eq!(summary.per_row_errors.len(), 1);
    assert!(summary.per_row_errors[0].starts_with("第 3 行"));
    assert_eq!(count_drafts(&conn), 2);
}
