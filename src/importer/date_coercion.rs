// ==========================================
// 护照草稿导入系统 - 日期转换
// ==========================================
// Excel 序列号: unix_seconds = (serial - 25569) * 86400，按 UTC 取日期
// 自由格式: 覆盖常见的 strtotime 输入形态
// 约束: 无法解析的日期返回 None，不视为错误
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 1970-01-01 对应的 Excel 序列号
pub const EXCEL_UNIX_EPOCH_SERIAL: f64 = 25569.0;

const SECONDS_PER_DAY: f64 = 86400.0;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

// 斜杠日期按美式 月/日/年 解析
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

/// Excel 日期序列号转日历日期（小数部分按当天处理）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }

    let seconds = ((serial - EXCEL_UNIX_EPOCH_SERIAL) * SECONDS_PER_DAY).floor();
    if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}

/// 位置映射路径: 数值按 Excel 序列号处理，否则按自由格式解析
pub fn coerce_positional_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match parse_numeric(trimmed) {
        Some(serial) => excel_serial_to_date(serial),
        None => parse_free_form_date(trimmed),
    }
}

/// 自由格式日期解析（表头映射路径只走这里）
pub fn parse_free_form_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // 紧凑格式 YYYYMMDD
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok();
    }

    None
}

/// 与 PHP is_numeric 对齐的数值判定（不接受 inf/nan 等字面量）
fn parse_numeric(raw: &str) -> Option<f64> {
    let looks_numeric = raw
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
        && raw.bytes().any(|b| b.is_ascii_digit());
    if !looks_numeric {
        return None;
    }

    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
