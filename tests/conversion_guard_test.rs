// ==========================================
// ConversionGuard 集成测试
// ==========================================
// 测试目标: 草稿转正的校验、原子性与编码生成
// ==========================================


use chrono::Local;
use passport_intake::config::{config_keys, ConfigManager};
use passport_intake::domain::{DraftFields, PassportStatus, PaymentStatus};
use passport_intake::engine::{ConversionError, ConversionGuard};
use passport_intake::logging;
use passport_intake::repository::{
    DraftRecordRepository, DraftRecordRepositoryImpl, PassportRepository, SqlitePassportFactory,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use test_helpers::{complete_draft, count_drafts, count_passports, create_test_db, open_shared};

fn build_guard(
    conn: &Arc<Mutex<Connection>>,
) -> ConversionGuard<SqlitePassportFactory, ConfigManager> {
    ConversionGuard::new(
        conn.clone(),
        SqlitePassportFactory::new(),
        ConfigManager::from_connection(conn.clone()).unwrap(),
    )
}

/// 在草稿删除前挂触发器，模拟删除失败（ABORT）或静默不删除（IGNORE）
fn install_draft_delete_trigger(conn: &Arc<Mutex<Connection>>, action: &str) {
    conn.lock()
        .unwrap()
        .execute_batch(&format!(
            r#"
            CREATE TRIGGER guard_draft_delete BEFORE DELETE ON draft_passports
            BEGIN
                SELECT {};
            END;
            "#,
            action
        ))
        .unwrap();
}

fn drop_draft_delete_trigger(conn: &Arc<Mutex<Connection>>) {
    conn.lock()
        .unwrap()
        .execute_batch("DROP TRIGGER guard_draft_delete;")
        .unwrap();
}

#[test]
fn test_missing_mobile_number_keeps_draft() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());

    let draft = repo
        .create(&DraftFields {
            mobile_number: None,
            ..complete_draft("P123")
        })
        .unwrap();

    let result = build_guard(&conn).convert(draft.id, None);
    assert!(matches!(
        result,
        Err(ConversionError::Validation {
            field: "mobile_number"
        })
    ));

    assert!(repo.get(draft.id).is_ok());
    assert_eq!(count_passports(&conn), 0);
}

#[test]
fn test_successful_conversion_moves_draft_once() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let guard = build_guard(&conn);

    let draft = repo
        .create(&DraftFields {
            personal_photo: Some("/storage/uploads/1_1_personal.jpg".to_string()),
            ..complete_draft("P123")
        })
        .unwrap();

    let passport = guard.convert(draft.id, Some("Operator A")).unwrap();
    assert_eq!(passport.unique_code, "P000001");
    assert_eq!(passport.passport_number, "P123");
    assert_eq!(passport.passport_status, PassportStatus::InProgress);
    assert_eq!(passport.payment_status, PaymentStatus::Unpaid);
    assert_eq!(passport.delivered_by, "Operator A");
    assert_eq!(passport.passport_delivery_date, Local::now().date_naive());
    assert_eq!(passport.address, "Baghdad - Karrada");
    assert_eq!(
        passport.personal_photo.as_deref(),
        Some("/storage/uploads/1_1_personal.jpg")
    );

    assert_eq!(count_passports(&conn), 1);
    assert_eq!(count_drafts(&conn), 0);

    // 再次转正同一草稿
    assert!(matches!(
        guard.convert(draft.id, None),
        Err(ConversionError::NotFound(id)) if id == draft.id
    ));
    assert_eq!(count_passports(&conn), 1);
}

#[test]
fn test_duplicate_passport_number_rolls_back() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let guard = build_guard(&conn);

    let first = repo.create(&complete_draft("P123")).unwrap();
    let second = repo.create(&complete_draft("P123")).unwrap();

    guard.convert(first.id, None).unwrap();

    let result = guard.convert(second.id, None);
    assert!(matches!(result, Err(ConversionError::EntityCreation(_))));

    // 第二份草稿保持不变
    assert_eq!(repo.get(second.id).unwrap(), second);
    assert_eq!(count_passports(&conn), 1);
}

#[test]
fn test_sequence_and_operator_follow_config() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());

    let config = ConfigManager::from_connection(conn.clone()).unwrap();
    config
        .set_config_value(config_keys::UNIQUE_CODE_PREFIX, "IQ-")
        .unwrap();
    config
        .set_config_value(config_keys::UNIQUE_CODE_WIDTH, "4")
        .unwrap();

    let guard = build_guard(&conn);
    let a = repo.create(&complete_draft("A1")).unwrap();
    let b = repo.create(&complete_draft("B2")).unwrap();

    let first = guard.convert(a.id, None).unwrap();
    let second = guard.convert(b.id, Some("   ")).unwrap();

    assert_eq!(first.unique_code, "IQ-0001");
    assert_eq!(second.unique_code, "IQ-0002");
    assert_eq!(first.delivered_by, config_keys::DEFAULT_OPERATOR_VALUE);
    assert_eq!(second.delivered_by, config_keys::DEFAULT_OPERATOR_VALUE);

    let found = PassportRepository::new(conn.clone())
        .find_by_unique_code("IQ-0002")
        .unwrap()
        .unwrap();
    assert_eq!(found.passport_number, "B2");
}

#[test]
fn test_unknown_draft_is_not_found() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);

    assert!(matches!(
        build_guard(&conn).convert(404, None),
        Err(ConversionError::NotFound(404))
    ));
}

#[test]
fn test_draft_delete_error_rolls_back_passport() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let guard = build_guard(&conn);

    let draft = repo.create(&complete_draft("P123")).unwrap();
    install_draft_delete_trigger(&conn, "RAISE(ABORT, 'draft row locked')");

    let result = guard.convert(draft.id, None);
    assert!(matches!(
        result,
        Err(ConversionError::ConversionConsistency { draft_id, .. }) if draft_id == draft.id
    ));
    assert_eq!(count_passports(&conn), 0);
    assert_eq!(repo.get(draft.id).unwrap(), draft);

    // 回滚后编号未被占用
    drop_draft_delete_trigger(&conn);
    let passport = guard.convert(draft.id, None).unwrap();
    assert_eq!(passport.unique_code, "P000001");
    assert_eq!(count_drafts(&conn), 0);
}

#[test]
fn test_draft_delete_affecting_no_rows_rolls_back_passport() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let repo = DraftRecordRepositoryImpl::new(conn.clone());
    let guard = build_guard(&conn);

    let draft = repo.create(&complete_draft("P123")).unwrap();
    install_draft_delete_trigger(&conn, "RAISE(IGNORE)");

    let result = guard.convert(draft.id, None);
    match result {
        Err(ConversionError::ConversionConsistency { draft_id, message }) => {
            assert_eq!(draft_id, draft.id);
            assert!(message.contains('0'));
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.unique_code)),
    }
    assert_eq!(count_passports(&conn), 0);
    assert_eq!(count_drafts(&conn), 1);
    assert_eq!(repo.get(draft.id).unwrap(), draft);
}
