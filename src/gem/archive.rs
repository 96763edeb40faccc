use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Component, Path};

use anyhow::Result;
use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::GemDiffError;

/// gzip 文件头魔数
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 内层源码包在外层 tar 中的条目名，按出现顺序取第一个命中的
const DATA_ENTRIES: [&str; 2] = ["data.tar.gz", "data.tar"];

fn archive_err(what: &str, err: impl std::fmt::Display) -> anyhow::Error {
    GemDiffError::Archive(format!("{what}: {err}")).into()
}

/// 探测输入是否带 gzip 包装，返回对应的读取器
///
/// gem 的内外两层 tar 都可能压缩也可能是裸 tar，必须按魔数探测，不能假定。
pub(crate) fn container_reader<'a, R: BufRead + 'a>(
    mut input: R,
) -> io::Result<Box<dyn Read + 'a>> {
    let head = input.fill_buf()?;
    if head.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(GzDecoder::new(input)))
    } else {
        Ok(Box::new(input))
    }
}

/// 解包 .gem 归档到目标目录
///
/// 外层 tar 只消费到第一个 data.tar.gz / data.tar 条目为止，
/// 其余条目（metadata.gz、签名、校验和等）一律跳过。
pub fn extract_gem_archive(gem_file: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(gem_file)
        .map_err(|e| archive_err(&format!("无法打开归档 {:?}", gem_file), e))?;
    let data = read_outer_entry(BufReader::new(file), &DATA_ENTRIES)?
        .ok_or_else(|| GemDiffError::Archive("未找到 data.tar 条目".to_string()))?;

    unpack_data_tar(&data, dest_dir)
}

/// 在外层容器中按名字查找条目，读出其完整内容
pub(crate) fn read_outer_entry<R: BufRead>(input: R, names: &[&str]) -> Result<Option<Vec<u8>>> {
    let reader = container_reader(input).map_err(|e| archive_err("读取归档头失败", e))?;
    let mut outer = Archive::new(reader);

    let entries = outer
        .entries()
        .map_err(|e| archive_err("外层 tar 解析失败", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_err("外层 tar 条目损坏", e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let matched = {
            let path = entry
                .path()
                .map_err(|e| archive_err("外层 tar 条目路径非法", e))?;
            names.iter().any(|name| path == Path::new(name))
        };
        if matched {
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| archive_err("读取内层数据失败", e))?;
            return Ok(Some(data));
        }
    }

    Ok(None)
}

/// 解包内层源码 tar：逐个写出普通文件并还原权限位
///
/// 目录条目跳过，目录结构由文件路径隐含；文件内容经定长缓冲流式落盘。
fn unpack_data_tar(data: &[u8], dest_dir: &Path) -> Result<()> {
    let reader = container_reader(data).map_err(|e| archive_err("读取内层数据头失败", e))?;
    let mut inner = Archive::new(reader);

    let entries = inner
        .entries()
        .map_err(|e| archive_err("内层 tar 解析失败", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_err("内层 tar 条目损坏", e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .map_err(|e| archive_err("内层 tar 条目路径非法", e))?
            .into_owned();
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(GemDiffError::Archive(format!("条目路径越界: {:?}", relative)).into());
        }

        let out_path = dest_dir.join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| archive_err(&format!("无法创建目录 {:?}", parent), e))?;
        }

        let mut out = File::create(&out_path)
            .map_err(|e| archive_err(&format!("无法创建文件 {:?}", out_path), e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| archive_err(&format!("写出文件失败 {:?}", out_path), e))?;

        if let Ok(mode) = entry.header().mode() {
            apply_entry_mode(&out_path, mode)
                .map_err(|e| archive_err(&format!("设置权限失败 {:?}", out_path), e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn apply_entry_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_entry_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
