use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// 一棵目录树的快照：规范化相对路径 -> 文件信息
///
/// BTreeMap 保证键按字典序迭代，这正是差异输出要求的稳定顺序。
pub type TreeSnapshot = BTreeMap<String, FileEntry>;

/// 快照中的单个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub digest: String,
}

/// 递归枚举 root 下的所有普通文件，构建快照
///
/// 键统一使用正斜杠分隔，保证输出与宿主平台的路径分隔符无关；
/// root 不存在时返回空快照。
pub fn snapshot_tree(root: &Path) -> Result<TreeSnapshot> {
    let mut snapshot = TreeSnapshot::new();

    if !root.exists() {
        return Ok(snapshot);
    }

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("无法计算相对路径: {:?}", path))?;

        snapshot.insert(
            normalize_relative(relative),
            FileEntry {
                path: path.to_path_buf(),
                digest: file_digest(path)?,
            },
        );
    }

    Ok(snapshot)
}

/// 把相对路径规范化成正斜杠分隔的字符串
fn normalize_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// 文件内容的 SHA256 摘要，流式计算
fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("无法打开文件: {:?}", path))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("读取文件失败: {:?}", path))?;
    Ok(hex::encode(hasher.finalize()))
}
