use std::io;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tempfile::NamedTempFile;

use crate::error::GemDiffError;

/// 拼出 rubygems.org 的归档下载地址
fn gem_download_url(gem_name: &str, version: &str) -> String {
    format!("https://rubygems.org/downloads/{gem_name}-{version}.gem")
}

/// 下载 gem 归档到临时文件
///
/// 响应体流式写入，避免大归档占满内存；临时文件在 drop 时删除，
/// 因此无论后续解包成功与否都不会残留。只请求一次，失败不重试。
pub fn download_gem(gem_name: &str, version: &str) -> Result<NamedTempFile> {
    let url = gem_download_url(gem_name, version);

    let mut response = reqwest::blocking::get(&url).map_err(|e| GemDiffError::Retrieval {
        gem_name: gem_name.to_string(),
        version: version.to_string(),
        reason: e.to_string(),
    })?;

    if response.status() != StatusCode::OK {
        return Err(GemDiffError::Retrieval {
            gem_name: gem_name.to_string(),
            version: version.to_string(),
            reason: format!("HTTP {}", response.status().as_u16()),
        }
        .into());
    }

    let mut gem_file = NamedTempFile::new().context("无法创建临时文件")?;
    io::copy(&mut response, gem_file.as_file_mut())
        .with_context(|| format!("写入临时文件失败: {url}"))?;

    Ok(gem_file)
}
