// ==========================================
// 车队数据装载系统 - 文件读取与字段拆分
// ==========================================
// 阶段 0: 读取输入文件全文
// 阶段 1: 将逗号分隔的片段拆为字段（csv 解析，TRIM，不识别引号）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, Trim};
use std::fs;
use std::path::Path;

/// 读取输入文件全文
///
/// # 返回
/// - Err(FileNotFound): 文件不存在
/// - Err(FileReadError): 读取失败（权限、编码等）
pub fn read_text(path: &Path) -> ImportResult<String> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    if !path.is_file() {
        return Err(ImportError::FileReadError(format!(
            "{} 不是普通文件",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ImportError::FileReadError(format!("{}: {}", path.display(), e)))?;

    // 去掉 UTF-8 BOM
    Ok(content
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(content))
}

/// 拆分逗号分隔字段
///
/// # 说明
/// - 每个字段 TRIM
/// - 引号按普通字符处理，逗号总是分隔符
/// - 空片段返回空列表
/// - 行内不含换行，只取第一条记录
pub fn split_fields(segment: &str) -> ImportResult<Vec<String>> {
    if segment.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 允许字段数不一致，由解码器校验
        .trim(Trim::All)
        .quoting(false)
        .from_reader(segment.as_bytes());

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(str::to_string).collect()),
        None => Ok(Vec::new()),
    }
}
