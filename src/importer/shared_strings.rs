// ==========================================
// 护照草稿导入系统 - 共享字符串表
// ==========================================
// 来源: xl/sharedStrings.xml
// 规则: 每个 <si> 一项，拼接其下 <t> 文本，忽略 <rPh> 注音
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStringTable {
    strings: Vec<String>,
}

impl SharedStringTable {
    /// 解析共享字符串 XML，条目缺失时返回空表
    pub fn parse(xml: Option<&[u8]>) -> ImportResult<Self> {
        let Some(xml) = xml else {
            return Ok(Self::default());
        };

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        current.clear();
                        in_si = true;
                    }
                    b"rPh" if in_si => phonetic_depth += 1,
                    b"t" if in_si && phonetic_depth == 0 => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Event::Text(t) if in_t => {
                    let text = t
                        .unescape()
                        .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                    current.push_str(&text);
                }
                Event::CData(t) if in_t => {
                    let raw = t.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|e| ImportError::DecodeError(e.to_string()))?;
                    current.push_str(text);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_t = false,
                    b"rPh" if phonetic_depth > 0 => phonetic_depth -= 1,
                    b"si" if in_si => {
                        strings.push(std::mem::take(&mut current));
                        in_si = false;
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if in_si {
            return Err(ImportError::DecodeError(
                "共享字符串表意外结束（<si> 未闭合）".to_string(),
            ));
        }

        Ok(Self { strings })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_table_is_empty() {
        let table = SharedStringTable::parse(None).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn test_document_order_and_rich_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
  <si><t>Ali Hassan</t></si>
  <si><r><t>Bag</t></r><r><t xml:space="preserve">hdad </t></r><rPh sb="0" eb="1"><t>x</t></rPh></si>
  <si><t>A &amp; B</t></si>
  <si/>
</sst>"#;
        let table = SharedStringTable::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(0), Some("Ali Hassan"));
        assert_eq!(table.get(1), Some("Baghdad "));
        assert_eq!(table.get(2), Some("A & B"));
        assert_eq!(table.get(3), Some(""));
    }

    #[test]
    fn test_malformed_xml_is_decode_error() {
        let xml = b"<sst><si><t>x</t></sx></sst>";
        let result = SharedStringTable::parse(Some(xml.as_slice()));
        assert!(matches!(result, Err(ImportError::DecodeError(_))));
    }
}
