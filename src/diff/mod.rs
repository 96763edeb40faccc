mod external;
mod render;
mod tree;

pub use external::{ExternalDiff, external_diff_available};
pub use render::{BuiltinDiff, render_tree_diff};
pub use tree::{FileEntry, TreeSnapshot, snapshot_tree};

use std::path::Path;

use anyhow::Result;

/// 一次目录比较的结果
#[derive(Debug, Default)]
pub struct DiffOutcome {
    pub text: String,
    pub has_differences: bool,
}

/// 目录比较后端
///
/// 外部 diff 委托与内置渲染器实现同一契约：无差异时 has_differences
/// 为 false，有差异为 true，执行失败直接返回错误。
pub trait DiffBackend {
    fn compare(&self, old_root: &Path, new_root: &Path) -> Result<DiffOutcome>;
}

/// 按宿主能力选择后端：系统 diff 可用就委托给它，否则用内置渲染器
pub fn select_backend() -> Box<dyn DiffBackend> {
    if external_diff_available() {
        Box::new(ExternalDiff)
    } else {
        Box::new(BuiltinDiff)
    }
}
