use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// 读取文本文件的所有行
///
/// 读取失败、内容含空字节或不是合法 UTF-8 时返回 None，调用方按二进制处理。
pub fn read_text_lines(path: &Path) -> Option<Vec<String>> {
    let bytes = fs::read(path).ok()?;
    if bytes.contains(&0) {
        return None;
    }
    let content = String::from_utf8(bytes).ok()?;
    Some(content.lines().map(str::to_owned).collect())
}

/// 目录是否为空（不存在也视为空）
pub fn is_dir_empty(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(dir).with_context(|| format!("无法读取目录: {:?}", dir))?;
    Ok(entries.next().is_none())
}

/// 递归统计目录下所有文件占用的字节数
pub fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
