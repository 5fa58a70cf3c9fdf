// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: DraftApi / ImportApi 端到端行为
// ==========================================


use passport_intake::api::{ApiError, DraftApi, ImportApi};
use passport_intake::config::{config_keys, ConfigManager};
use passport_intake::domain::{CompletionStatus, DraftFields, PhotoKind};
use passport_intake::logging;
use passport_intake::storage::LocalBlobStore;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_helpers::{complete_draft, count_drafts, create_test_db, open_shared, write_csv};

fn build_api(conn: &Arc<Mutex<Connection>>) -> (DraftApi, TempDir) {
    let upload_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalBlobStore::new(
        upload_dir.path(),
        config_keys::DEFAULT_UPLOAD_URL_PREFIX,
    ));
    (DraftApi::new(conn.clone(), store).unwrap(), upload_dir)
}

fn stored_file(upload_dir: &Path, path: &str) -> std::path::PathBuf {
    upload_dir.join(path.rsplit('/').next().unwrap())
}

#[test]
fn test_photo_upload_replaces_previous_blob() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, upload_dir) = build_api(&conn);

    let draft = api.create(&complete_draft("P123")).unwrap();

    let first = api
        .upload_photo(draft.id, PhotoKind::Personal, b"first", "face.JPG")
        .unwrap();
    let first_path = first.personal_photo.clone().unwrap();
    assert!(first_path.starts_with("/storage/uploads/"));
    assert!(first_path.ends_with(&format!("_{}_personal.jpg", draft.id)));
    assert!(stored_file(upload_dir.path(), &first_path).exists());

    let second = api
        .upload_photo(draft.id, PhotoKind::Personal, b"second", "face.png")
        .unwrap();
    let second_path = second.personal_photo.clone().unwrap();
    assert_ne!(first_path, second_path);
    assert!(!stored_file(upload_dir.path(), &first_path).exists());
    assert!(stored_file(upload_dir.path(), &second_path).exists());

    let cleared = api.remove_photo(draft.id, PhotoKind::Personal).unwrap();
    assert_eq!(cleared.personal_photo, None);
    assert!(!stored_file(upload_dir.path(), &second_path).exists());
}

#[test]
fn test_upload_rejects_empty_and_unknown_draft() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, upload_dir) = build_api(&conn);

    assert!(matches!(
        api.upload_photo(1, PhotoKind::Passport, b"", "scan.jpg"),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.upload_photo(99, PhotoKind::Passport, b"bytes", "scan.jpg"),
        Err(ApiError::NotFound(_))
    ));
    // 未产生无主文件
    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_delete_removes_draft_and_blobs() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, upload_dir) = build_api(&conn);

    let draft = api.create(&complete_draft("P123")).unwrap();
    let with_photo = api
        .upload_photo(draft.id, PhotoKind::Residence, b"doc", "residence.pdf")
        .unwrap();
    let path = with_photo.residence_photo.unwrap();

    api.delete(draft.id).unwrap();
    assert!(!stored_file(upload_dir.path(), &path).exists());
    assert!(matches!(api.get(draft.id), Err(ApiError::NotFound(_))));
    assert!(matches!(api.delete(draft.id), Err(ApiError::NotFound(_))));
}

#[test]
fn test_list_page_size_limits() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, _upload_dir) = build_api(&conn);

    for i in 0..25 {
        api.create(&DraftFields {
            full_name: Some(format!("Person {}", i)),
            ..Default::default()
        })
        .unwrap();
    }

    let page = api.list(None, None).unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 20);
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.total, 25);
    // 最新创建的在前
    assert_eq!(page.items[0].full_name.as_deref(), Some("Person 24"));

    let second = api.list(Some(2), None).unwrap();
    assert_eq!(second.items.len(), 5);

    let zero = api.list(Some(0), Some(0)).unwrap();
    assert_eq!(zero.page, 1);
    assert_eq!(zero.page_size, 1);

    ConfigManager::from_connection(conn.clone())
        .unwrap()
        .set_config_value(config_keys::MAX_PAGE_SIZE, "10")
        .unwrap();
    let capped = api.list(None, Some(500)).unwrap();
    assert_eq!(capped.page_size, 10);
    assert_eq!(capped.items.len(), 10);
}

#[test]
fn test_update_status_accepts_code_and_label() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, _upload_dir) = build_api(&conn);

    let draft = api.create(&DraftFields::default()).unwrap();

    let updated = api.update_status(draft.id, "ready_for_transfer").unwrap();
    assert_eq!(updated.completion_status, CompletionStatus::ReadyForTransfer);

    let updated = api.update_status(draft.id, "مسودة").unwrap();
    assert_eq!(updated.completion_status, CompletionStatus::Draft);

    assert!(matches!(
        api.update_status(draft.id, "archived"),
        Err(ApiError::InvalidInput(_))
    ));
    assert_eq!(
        api.get(draft.id).unwrap().completion_status,
        CompletionStatus::Draft
    );
}

#[test]
fn test_convert_errors_map_to_api_errors() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let (api, _upload_dir) = build_api(&conn);

    let incomplete = api
        .create(&DraftFields {
            transaction_type: None,
            ..complete_draft("P1")
        })
        .unwrap();
    assert!(matches!(
        api.convert(incomplete.id, None),
        Err(ApiError::MissingRequiredField(ref f)) if f == "transaction_type"
    ));

    let fixed = api
        .update(
            incomplete.id,
            &DraftFields {
                transaction_type: Some("إصدار".to_string()),
                ..complete_draft("P1")
            },
        )
        .unwrap();
    let passport = api.convert(fixed.id, Some("Operator B")).unwrap();
    assert_eq!(passport.delivered_by, "Operator B");
    assert!(matches!(api.convert(fixed.id, None), Err(ApiError::NotFound(_))));
}

#[test]
fn test_import_api_messages() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let api = ImportApi::new(conn.clone());

    let positional = write_csv("1,,Ali Hassan,P1\n2,,Sara Ahmed,P2\n");
    let response = api.import_file(positional.path().to_str().unwrap()).unwrap();
    assert_eq!(response.summary.imported_count, 2);
    assert_eq!(response.message, "تم استيراد 2 جواز بنجاح");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["imported_count"], 2);
    assert!(json.get("per_row_errors").is_none());

    let headered = write_csv("Full_Name,Passport_ID\nAli Hassan,P1\n");
    let reload = api.reload_from_csv(headered.path().to_str().unwrap()).unwrap();
    assert_eq!(reload.summary.deleted_count, 2);
    assert_eq!(reload.message, "تم استيراد 1 جواز بنجاح");
    assert_eq!(count_drafts(&conn), 1);

    assert!(matches!(
        api.import_file("/nonexistent/file.csv"),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.import_file("drafts.pdf"),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(api.import_file("  "), Err(ApiError::InvalidInput(_))));
}
