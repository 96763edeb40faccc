use std::path::Path;
use std::process::Command;

use anyhow::Result;

use super::{DiffBackend, DiffOutcome};
use crate::error::GemDiffError;

/// 委托系统 diff 命令的比较后端
///
/// 等价于 `diff -r -u -N old new`，输出逐行对齐的 hunk，
/// 信息量比内置渲染器更高，宿主具备时优先使用。
pub struct ExternalDiff;

/// 宿主是否有可用的 diff 命令
pub fn external_diff_available() -> bool {
    Command::new("diff")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

impl DiffBackend for ExternalDiff {
    fn compare(&self, old_root: &Path, new_root: &Path) -> Result<DiffOutcome> {
        let output = Command::new("diff")
            .args(["-r", "-u", "-N"])
            .arg(old_root)
            .arg(new_root)
            .output()
            .map_err(|e| GemDiffError::Comparison(format!("无法执行 diff 命令: {e}")))?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        // diff 的约定：0 无差异，1 有差异，其余为执行失败
        match output.status.code() {
            Some(0) => Ok(DiffOutcome {
                text,
                has_differences: false,
            }),
            Some(1) => Ok(DiffOutcome {
                text,
                has_differences: true,
            }),
            Some(code) => {
                Err(GemDiffError::Comparison(format!("diff 退出状态异常: {code}")).into())
            }
            None => Err(GemDiffError::Comparison("diff 被信号终止".to_string()).into()),
        }
    }
}
