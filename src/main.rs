// ==========================================
// 护照草稿导入系统 - 命令行入口
// ==========================================
// 用法:
//   passport-intake import <file.xlsx|file.xls|file.csv>
//   passport-intake reload <file.csv>
//   passport-intake list [page] [page_size]
//   passport-intake convert <draft_id> [operator]
//
// 数据库: PASSPORT_INTAKE_DB_PATH 或系统数据目录
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use passport_intake::config::{
    get_default_db_path, get_default_upload_dir, ConfigManager, IntakeConfigReader,
};
use passport_intake::db::open_and_migrate;
use passport_intake::storage::LocalBlobStore;
use passport_intake::{logging, DraftApi, ImportApi};

const USAGE: &str = concat!(
    "用法: passport-intake <import <file> | reload <file.csv> | ",
    "list [page] [page_size] | convert <id> [operator]>"
);

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().ok_or_else(|| anyhow!(USAGE))?;

    let db_path = get_default_db_path();
    if let Some(parent) = Path::new(&db_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
    }

    tracing::info!("{} v{}", passport_intake::APP_NAME, passport_intake::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = Arc::new(Mutex::new(
        open_and_migrate(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?,
    ));

    match command.as_str() {
        "import" => {
            let file = args.next().ok_or_else(|| anyhow!(USAGE))?;
            let response = ImportApi::new(conn).import_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "reload" => {
            let file = args.next().ok_or_else(|| anyhow!(USAGE))?;
            let response = ImportApi::new(conn).reload_from_csv(&file)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "list" => {
            let page = parse_optional_u32(args.next(), "page")?;
            let page_size = parse_optional_u32(args.next(), "page_size")?;
            let page = build_draft_api(conn)?.list(page, page_size)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        "convert" => {
            let id: i64 = args
                .next()
                .ok_or_else(|| anyhow!(USAGE))?
                .trim()
                .parse()
                .context("草稿 id 必须为整数")?;
            let operator = args.next();
            let passport = build_draft_api(conn)?.convert(id, operator.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&passport)?);
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}

fn build_draft_api(conn: Arc<Mutex<rusqlite::Connection>>) -> Result<DraftApi> {
    let url_prefix = ConfigManager::from_connection(conn.clone())?.get_upload_url_prefix()?;
    let blob_store = Arc::new(LocalBlobStore::new(get_default_upload_dir(), &url_prefix));
    Ok(DraftApi::new(conn, blob_store)?)
}

fn parse_optional_u32(raw: Option<String>, name: &str) -> Result<Option<u32>> {
    raw.map(|v| {
        v.trim()
            .parse::<u32>()
            .with_context(|| format!("{} 必须为正整数: {}", name, v))
    })
    .transpose()
}
