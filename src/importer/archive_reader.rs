// ==========================================
// 护照草稿导入系统 - 压缩包读取
// ==========================================
// xlsx 本质是 zip 容器，按条目路径读取原始字节
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

pub const SHARED_STRINGS_ENTRY: &str = "xl/sharedStrings.xml";
pub const FIRST_SHEET_ENTRY: &str = "xl/worksheets/sheet1.xml";

/// 预分配上限（条目声明大小不可信）
const MAX_PREALLOC_BYTES: u64 = 1 << 20;

pub struct ArchiveReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl ArchiveReader<File> {
    /// 打开文件为 zip 容器，失败返回 ArchiveOpenError
    pub fn open(path: &Path) -> ImportResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    pub fn from_reader(reader: R) -> ImportResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// 读取指定条目
    ///
    /// # 返回
    /// - Ok(None): 条目不存在
    pub fn read_entry(&mut self, name: &str) -> ImportResult<Option<Vec<u8>>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(ImportError::DecodeError(format!(
                    "读取条目 {} 失败: {}",
                    name, e
                )))
            }
        };

        let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
        entry
            .read_to_end(&mut buf)
            .map_err(|e| ImportError::DecodeError(format!("读取条目 {} 失败: {}", name, e)))?;
        Ok(Some(buf))
    }
}

fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC_BYTES) as usize
}
