use std::path::PathBuf;

use anyhow::Result;

use crate::diff::{DiffOutcome, select_backend};
use crate::gem::{default_cache_root, resolve_gem};

/// 比较同一个 gem 的两个版本源码树
///
/// cache_root 为 None 时使用默认缓存位置（环境变量优先）。
/// 两个版本先后解析，全程串行阻塞，不做并发。
pub fn compare_gem_versions(
    gem_name: &str,
    old_version: &str,
    new_version: &str,
    cache_root: Option<PathBuf>,
) -> Result<DiffOutcome> {
    let cache_root = cache_root.unwrap_or_else(default_cache_root);

    println!("比较 {gem_name}: {old_version} -> {new_version}\n");

    let old_path = resolve_gem(&cache_root, gem_name, old_version)?;
    let new_path = resolve_gem(&cache_root, gem_name, new_version)?;

    println!("\n正在生成差异...\n");

    let backend = select_backend();
    backend.compare(&old_path, &new_path)
}
