// ==========================================
// 护照草稿导入系统 - 工作表解码
// ==========================================
// 来源: xl/worksheets/sheet1.xml
// 规则:
// - t="s": <v> 为共享字符串下标
// - t="inlineStr": 取 <is><t> 文本
// - 其余类型: 原样取 <v> 文本（不做类型转换）
// - 单元格位置优先取 r 引用（C7 → 列 2），缺口补空串
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::shared_strings::SharedStringTable;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// 最大列下标（XFD）
pub const MAX_COLUMN_INDEX: usize = 16_383;

/// 解码后的一行（按列位置排列）
pub type RawRow = Vec<String>;

#[derive(Debug, Default)]
struct CellState {
    column: Option<usize>,
    cell_type: Option<String>,
    value: String,
    inline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Inline,
}

pub struct WorksheetDecoder<'a> {
    shared_strings: &'a SharedStringTable,
}

impl<'a> WorksheetDecoder<'a> {
    pub fn new(shared_strings: &'a SharedStringTable) -> Self {
        Self { shared_strings }
    }

    /// 解码工作表 XML 为行列表（文档顺序）
    pub fn decode(&self, xml: &[u8]) -> ImportResult<Vec<RawRow>> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut rows: Vec<RawRow> = Vec::new();
        let mut row: Option<RawRow> = None;
        let mut cell: Option<CellState> = None;
        let mut capture = Capture::None;
        let mut in_inline = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => row = Some(Vec::new()),
                    b"c" if row.is_some() => cell = Some(start_cell(&e)?),
                    b"v" if cell.is_some() => capture = Capture::Value,
                    b"is" if cell.is_some() => in_inline = true,
                    b"t" if in_inline => capture = Capture::Inline,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => rows.push(Vec::new()),
                    b"c" => {
                        if let Some(current) = row.as_mut() {
                            let state = start_cell(&e)?;
                            place_cell(current, state.column, String::new());
                        }
                    }
                    _ => {}
                },
                Event::Text(t) if capture != Capture::None => {
                    let text = t
                        .unescape()
                        .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                    push_text(cell.as_mut(), capture, &text);
                }
                Event::CData(t) if capture != Capture::None => {
                    let raw = t.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                    push_text(cell.as_mut(), capture, text);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" | b"t" => capture = Capture::None,
                    b"is" => in_inline = false,
                    b"c" => {
                        if let (Some(state), Some(current)) = (cell.take(), row.as_mut()) {
                            let column = state.column;
                            let value = self.resolve(state)?;
                            place_cell(current, column, value);
                        }
                    }
                    b"row" => {
                        if let Some(done) = row.take() {
                            rows.push(done);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if row.is_some() {
            return Err(ImportError::DecodeError(
                "工作表意外结束（<row> 未闭合）".to_string(),
            ));
        }

        Ok(rows)
    }

    fn resolve(&self, state: CellState) -> ImportResult<String> {
        match state.cell_type.as_deref() {
            Some("s") => {
                let raw = state.value.trim();
                let index: usize = raw.parse().map_err(|_| {
                    ImportError::DecodeError(format!("共享字符串下标无效: {:?}", raw))
                })?;
                self.shared_strings
                    .get(index)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ImportError::DecodeError(format!(
                            "共享字符串下标越界: {} (共 {} 项)",
                            index,
                            self.shared_strings.len()
                        ))
                    })
            }
            Some("inlineStr") => Ok(state.inline),
            _ => Ok(state.value),
        }
    }
}

fn push_text(cell: Option<&mut CellState>, capture: Capture, text: &str) {
    if let Some(state) = cell {
        match capture {
            Capture::Value => state.value.push_str(text),
            Capture::Inline => state.inline.push_str(text),
            Capture::None => {}
        }
    }
}

fn start_cell(e: &BytesStart<'_>) -> ImportResult<CellState> {
    let mut state = CellState::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ImportError::DecodeError(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"r" => {
                let value = attr
                    .unescape_value()
                    .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                state.column = bounded_column(&value)?;
            }
            b"t" => {
                let value = attr
                    .unescape_value()
                    .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                state.cell_type = Some(value.into_owned());
            }
            _ => {}
        }
    }
    Ok(state)
}

fn place_cell(row: &mut RawRow, column: Option<usize>, value: String) {
    match column {
        Some(col) if col < row.len() => row[col] = value,
        Some(col) => {
            row.resize(col, String::new());
            row.push(value);
        }
        None => row.push(value),
    }
}

/// 带字母前缀但超出 XFD（或溢出）的引用视为解码错误
fn bounded_column(reference: &str) -> ImportResult<Option<usize>> {
    let has_letters = reference
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic());
    match column_index_from_reference(reference) {
        Some(col) if col <= MAX_COLUMN_INDEX => Ok(Some(col)),
        None if !has_letters => Ok(None),
        _ => Err(ImportError::DecodeError(format!(
            "单元格列超出范围: {}",
            reference
        ))),
    }
}

/// 单元格引用转列下标（"C7" → 2, "AA1" → 26），无字母前缀时返回 None
pub fn column_index_from_reference(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }

    let mut index = 0usize;
    for b in letters {
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}
