use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use super::{DiffBackend, DiffOutcome, FileEntry, TreeSnapshot, snapshot_tree};
use crate::utils::read_text_lines;

/// 内置的行集合比较渲染器
///
/// 不做位置相关的 hunk 对齐，只报告一侧独有的行：
/// 旧文件独有的行前缀 `-`，新文件独有的行前缀 `+`。
/// 行集合相同（例如只是调换顺序）不算差异。
pub struct BuiltinDiff;

impl DiffBackend for BuiltinDiff {
    fn compare(&self, old_root: &Path, new_root: &Path) -> Result<DiffOutcome> {
        let old_snapshot = snapshot_tree(old_root)?;
        let new_snapshot = snapshot_tree(new_root)?;
        Ok(render_tree_diff(&old_snapshot, &new_snapshot))
    }
}

/// 按排序后的路径并集逐个渲染差异块
pub fn render_tree_diff(old_snapshot: &TreeSnapshot, new_snapshot: &TreeSnapshot) -> DiffOutcome {
    let paths: BTreeSet<&String> = old_snapshot.keys().chain(new_snapshot.keys()).collect();

    let mut outcome = DiffOutcome::default();

    for path in paths {
        match (old_snapshot.get(path), new_snapshot.get(path)) {
            (None, Some(new_entry)) => render_added(&mut outcome, path, new_entry),
            (Some(old_entry), None) => render_removed(&mut outcome, path, old_entry),
            (Some(old_entry), Some(new_entry)) => {
                // 摘要一致说明字节级相同，二进制文件也由此直接判等
                if old_entry.digest != new_entry.digest {
                    render_modified(&mut outcome, path, old_entry, new_entry);
                }
            }
            (None, None) => {}
        }
    }

    outcome
}

fn render_added(outcome: &mut DiffOutcome, path: &str, entry: &FileEntry) {
    match read_text_lines(&entry.path) {
        Some(lines) => {
            push_header(&mut outcome.text, path, "/dev/null", &format!("b/{path}"));
            for line in &lines {
                let _ = writeln!(outcome.text, "+{line}");
            }
        }
        None => {
            let _ = writeln!(outcome.text, "Binary file added: {path}");
        }
    }
    outcome.text.push('\n');
    outcome.has_differences = true;
}

fn render_removed(outcome: &mut DiffOutcome, path: &str, entry: &FileEntry) {
    match read_text_lines(&entry.path) {
        Some(lines) => {
            push_header(&mut outcome.text, path, &format!("a/{path}"), "/dev/null");
            for line in &lines {
                let _ = writeln!(outcome.text, "-{line}");
            }
        }
        None => {
            let _ = writeln!(outcome.text, "Binary file removed: {path}");
        }
    }
    outcome.text.push('\n');
    outcome.has_differences = true;
}

fn render_modified(
    outcome: &mut DiffOutcome,
    path: &str,
    old_entry: &FileEntry,
    new_entry: &FileEntry,
) {
    let (Some(old_lines), Some(new_lines)) =
        (read_text_lines(&old_entry.path), read_text_lines(&new_entry.path))
    else {
        let _ = writeln!(outcome.text, "Binary files differ: {path}");
        outcome.text.push('\n');
        outcome.has_differences = true;
        return;
    };

    let (removed, added) = line_set_diff(&old_lines, &new_lines);
    if removed.is_empty() && added.is_empty() {
        return;
    }

    push_header(
        &mut outcome.text,
        path,
        &format!("a/{path}"),
        &format!("b/{path}"),
    );
    for line in removed {
        let _ = writeln!(outcome.text, "-{line}");
    }
    for line in added {
        let _ = writeln!(outcome.text, "+{line}");
    }
    outcome.text.push('\n');
    outcome.has_differences = true;
}

fn push_header(text: &mut String, path: &str, old_target: &str, new_target: &str) {
    let _ = writeln!(text, "diff --git a/{path} b/{path}");
    let _ = writeln!(text, "--- {old_target}");
    let _ = writeln!(text, "+++ {new_target}");
}

/// 行级多重集合差：返回 (旧文件独有的行, 新文件独有的行)
///
/// 各自保持原文件内的出现顺序，重复行按出现次数配对抵销。
fn line_set_diff<'a>(
    old_lines: &'a [String],
    new_lines: &'a [String],
) -> (Vec<&'a str>, Vec<&'a str>) {
    (
        side_only(old_lines, new_lines),
        side_only(new_lines, old_lines),
    )
}

/// lines 中扣除 other 对应数量后剩下的行
fn side_only<'a>(lines: &'a [String], other: &[String]) -> Vec<&'a str> {
    let mut budget: HashMap<&str, usize> = HashMap::new();
    for line in other {
        *budget.entry(line.as_str()).or_insert(0) += 1;
    }

    let mut unique = Vec::new();
    for line in lines {
        match budget.get_mut(line.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => unique.push(line.as_str()),
        }
    }
    unique
}
