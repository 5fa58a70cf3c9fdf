// ==========================================
// 护照草稿导入系统 - CSV 解码
// ==========================================
// 两种入口:
// - decode_positional: 无表头语义，供位置映射使用
// - decode_with_headers: 以首行为表头，供表头映射使用
// 约束: 空字段保留为空串；允许行长度不一致
// 编码: 位置列入口容忍非 UTF-8 字节；表头入口（全量重载）遇到即整文件失败
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::worksheet::RawRow;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;

const UTF8_BOM: char = '\u{feff}';

/// 表头键控的一行
pub type HeaderRow = HashMap<String, String>;

/// 按位置解码所有行
pub fn decode_positional<R: Read>(input: R) -> ImportResult<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 允许行长度不一致
        .from_reader(input);

    // 按字节读取: 非 UTF-8 字节替换为 U+FFFD，单行编码问题不影响整个文件
    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let mut row: RawRow = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        if rows.is_empty() {
            if let Some(first) = row.first_mut() {
                *first = first.trim_start_matches(UTF8_BOM).to_string();
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// 按表头解码所有行（表头去除首尾空白）
///
/// # 返回
/// - 空文件返回空列表
/// - 超出表头长度的多余字段被忽略
pub fn decode_with_headers<R: Read>(input: R) -> ImportResult<Vec<HeaderRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if !header.is_empty() {
                    row_map.insert(header.clone(), value.to_string());
                }
            }
        }

        rows.push(row_map);
    }

    Ok(rows)
}
