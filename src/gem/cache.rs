use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::archive::extract_gem_archive;
use super::fetch::download_gem;
use crate::utils::{dir_size, is_dir_empty};

/// 覆盖缓存根目录的环境变量
pub const CACHE_DIR_ENV: &str = "GEM_DIFF_CACHE_DIR";

/// 默认缓存根目录：$GEM_DIFF_CACHE_DIR，否则 ~/.gem_diff_cache
///
/// 环境变量只在这里读取一次，其余代码都显式接收缓存根参数。
pub fn default_cache_root() -> PathBuf {
    if let Ok(dir) = env::var(CACHE_DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".gem_diff_cache"))
        .unwrap_or_else(|| PathBuf::from(".gem_diff_cache"))
}

/// 解析 (gem, 版本) 到缓存目录，缺失时下载并解包
///
/// 命中条件：cache_root/名称/版本 已存在且非空，此时不触发任何网络请求。
/// 解包失败会删掉残缺目录再报错，避免下次被误判为命中。
pub fn resolve_gem(cache_root: &Path, gem_name: &str, version: &str) -> Result<PathBuf> {
    let gem_dir = cache_root.join(gem_name).join(version);

    if gem_dir.exists() && !is_dir_empty(&gem_dir)? {
        println!("  使用缓存: {gem_name} {version}");
        return Ok(gem_dir);
    }

    println!("  正在下载: {gem_name} {version}");
    fs::create_dir_all(&gem_dir).with_context(|| format!("无法创建缓存目录: {:?}", gem_dir))?;

    let gem_file = download_gem(gem_name, version)?;

    if let Err(err) = extract_gem_archive(gem_file.path(), &gem_dir) {
        let _ = fs::remove_dir_all(&gem_dir); // 残缺目录不能留作缓存
        return Err(err).with_context(|| format!("解包 {gem_name} {version} 失败"));
    }

    Ok(gem_dir)
}

/// 清空缓存目录
pub fn clear_cache(cache_root: &Path) -> Result<()> {
    if cache_root.exists() {
        fs::remove_dir_all(cache_root)
            .with_context(|| format!("无法删除缓存目录: {:?}", cache_root))?;
        println!("缓存已清空: {}", cache_root.display());
    } else {
        println!("缓存目录不存在: {}", cache_root.display());
    }
    Ok(())
}

/// 汇总缓存目录的状态信息
pub fn cache_report(cache_root: &Path) -> String {
    let mut report = format!("缓存目录: {}\n", cache_root.display());

    if !cache_root.exists() {
        report.push_str("状态: 不存在\n");
        return report;
    }

    let mut versions = cached_versions(cache_root);
    versions.sort();

    report.push_str("状态: 存在\n");
    report.push_str(&format!("占用: {} 字节\n", dir_size(cache_root)));
    report.push_str(&format!("已缓存版本: {}\n", versions.len()));

    if !versions.is_empty() {
        report.push_str("\n已缓存的 gem:\n");
        for (name, version) in &versions {
            report.push_str(&format!("  {name} {version}\n"));
        }
    }

    report
}

/// 列出缓存里的 (名称, 版本) 目录对
fn cached_versions(cache_root: &Path) -> Vec<(String, String)> {
    WalkDir::new(cache_root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| {
            let version = e.file_name().to_str()?.to_string();
            let name = e.path().parent()?.file_name()?.to_str()?.to_string();
            Some((name, version))
        })
        .collect()
}
