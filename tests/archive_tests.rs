use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use gem_diff_tool::gem::{cache_report, clear_cache, extract_gem_archive, resolve_gem};
use tar::{Builder, Header};
use tempfile::TempDir;
use walkdir::WalkDir;

fn build_tar(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, contents, mode) in entries {
        let mut header = Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }
    builder.into_inner().unwrap()
}

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// 构造一个嵌套结构的 .gem 文件：外层 tar 包住 data.tar(.gz)
///
/// 外层额外放一个 metadata.gz 条目在最前面，解包时应被跳过。
fn build_gem_archive(out: &Path, files: &[(&str, &[u8], u32)], inner_gzip: bool, outer_gzip: bool) {
    let data_tar = build_tar(files);
    let (entry_name, payload) = if inner_gzip {
        ("data.tar.gz", gzip(&data_tar))
    } else {
        ("data.tar", data_tar)
    };

    let metadata = gzip(b"--- !ruby/object:Gem::Specification\nname: demo\n");
    let outer_tar = build_tar(&[
        ("metadata.gz", metadata.as_slice(), 0o644),
        (entry_name, payload.as_slice(), 0o644),
    ]);

    let bytes = if outer_gzip { gzip(&outer_tar) } else { outer_tar };
    fs::write(out, bytes).unwrap();
}

fn extracted_files(dest: &Path) -> Vec<PathBuf> {
    WalkDir::new(dest)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dest).unwrap().to_path_buf())
        .collect()
}

#[test]
fn extract_reproduces_paths_bytes_and_modes() -> Result<()> {
    let dir = TempDir::new()?;
    let gem_path = dir.path().join("demo-1.0.0.gem");
    build_gem_archive(
        &gem_path,
        &[
            ("lib/demo.rb", b"puts 'hi'\n".as_slice(), 0o644),
            ("bin/demo", b"#!/usr/bin/env ruby\n".as_slice(), 0o755),
        ],
        true,
        true,
    );

    let dest = TempDir::new()?;
    extract_gem_archive(&gem_path, dest.path())?;

    assert_eq!(fs::read(dest.path().join("lib/demo.rb"))?, b"puts 'hi'\n");
    assert_eq!(
        fs::read(dest.path().join("bin/demo"))?,
        b"#!/usr/bin/env ruby\n"
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(dest.path().join("bin/demo"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    // metadata.gz 等无关条目不应被解出来
    assert_eq!(extracted_files(dest.path()).len(), 2);
    Ok(())
}

#[test]
fn extract_accepts_all_compression_combinations() -> Result<()> {
    let files = [("lib/a.rb", b"a\n".as_slice(), 0o644)];

    for (inner_gzip, outer_gzip) in [(true, true), (true, false), (false, true), (false, false)] {
        let dir = TempDir::new()?;
        let gem_path = dir.path().join("demo.gem");
        build_gem_archive(&gem_path, &files, inner_gzip, outer_gzip);

        let dest = TempDir::new()?;
        extract_gem_archive(&gem_path, dest.path())?;
        assert_eq!(fs::read(dest.path().join("lib/a.rb"))?, b"a\n");
    }
    Ok(())
}

#[test]
fn extract_fails_without_data_entry() -> Result<()> {
    let dir = TempDir::new()?;
    let gem_path = dir.path().join("empty.gem");

    // 只有 metadata.gz，没有 data.tar 条目
    let metadata = gzip(b"--- {}\n");
    let outer_tar = build_tar(&[("metadata.gz", metadata.as_slice(), 0o644)]);
    fs::write(&gem_path, gzip(&outer_tar))?;

    let dest = TempDir::new()?;
    let err = extract_gem_archive(&gem_path, dest.path()).unwrap_err();
    assert!(err.to_string().contains("data.tar"));
    Ok(())
}

#[test]
fn extract_fails_on_corrupt_archive() -> Result<()> {
    let dir = TempDir::new()?;
    let gem_path = dir.path().join("bad.gem");
    fs::write(&gem_path, b"this is not a gem archive at all")?;

    let dest = TempDir::new()?;
    assert!(extract_gem_archive(&gem_path, dest.path()).is_err());
    Ok(())
}

#[test]
fn resolve_gem_hits_populated_cache_without_network() -> Result<()> {
    let cache_root = TempDir::new()?;
    let gem_dir = cache_root.path().join("demo").join("1.0.0");
    fs::create_dir_all(&gem_dir)?;
    fs::write(gem_dir.join("lib.rb"), "cached")?;

    // 目录已存在且非空：两次解析都应直接命中，不触发任何网络请求
    let first = resolve_gem(cache_root.path(), "demo", "1.0.0")?;
    let second = resolve_gem(cache_root.path(), "demo", "1.0.0")?;

    assert_eq!(first, gem_dir);
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(gem_dir.join("lib.rb"))?, "cached");
    Ok(())
}

#[test]
fn clear_cache_removes_the_root() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path().join("cache");
    fs::create_dir_all(root.join("demo").join("1.0.0"))?;
    fs::write(root.join("demo").join("1.0.0").join("a.rb"), "x")?;

    clear_cache(&root)?;
    assert!(!root.exists());

    // 再次清理不应报错
    clear_cache(&root)?;
    Ok(())
}

#[test]
fn cache_report_lists_cached_versions() -> Result<()> {
    let cache_root = TempDir::new()?;
    fs::create_dir_all(cache_root.path().join("demo").join("1.0.0"))?;
    fs::create_dir_all(cache_root.path().join("demo").join("1.1.0"))?;
    fs::create_dir_all(cache_root.path().join("other").join("0.2.0"))?;

    let report = cache_report(cache_root.path());

    assert!(report.contains("demo 1.0.0"));
    assert!(report.contains("demo 1.1.0"));
    assert!(report.contains("other 0.2.0"));
    assert!(report.contains("已缓存版本: 3"));
    Ok(())
}

#[test]
fn cache_report_handles_missing_root() {
    let report = cache_report(Path::new("/nonexistent/gem_diff_cache"));
    assert!(report.contains("不存在"));
}
