// ==========================================
// 护照草稿导入系统 - 默认路径解析
// ==========================================
// 优先级: 环境变量 > 用户数据目录 > 当前目录
// ==========================================

use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PASSPORT_INTAKE_DB_PATH";
pub const UPLOAD_DIR_ENV: &str = "PASSPORT_INTAKE_UPLOAD_DIR";

const APP_DIR_NAME: &str = "passport-intake";
const DB_FILE_NAME: &str = "passport_intake.db";

fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn app_data_dir() -> Option<PathBuf> {
    let dir = dirs::data_dir()?.join(APP_DIR_NAME);
    // best-effort: 目录创建失败时由后续打开数据库/写文件时报错
    std::fs::create_dir_all(&dir).ok();
    Some(dir)
}

/// 默认数据库路径
pub fn get_default_db_path() -> String {
    if let Some(path) = env_override(DB_PATH_ENV) {
        return path;
    }

    let path = match app_data_dir() {
        Some(dir) => dir.join(DB_FILE_NAME),
        None => PathBuf::from(format!("./{}", DB_FILE_NAME)),
    };

    path.to_string_lossy().to_string()
}

/// 默认照片上传目录
pub fn get_default_upload_dir() -> PathBuf {
    if let Some(path) = env_override(UPLOAD_DIR_ENV) {
        return PathBuf::from(path);
    }

    match app_data_dir() {
        Some(dir) => dir.join("uploads"),
        None => PathBuf::from("./uploads"),
    }
}
