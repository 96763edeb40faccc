use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use anyhow::Result;

use super::spec::{GemDependency, GemSpec, fetch_gem_spec};

/// 拉取两个版本的元数据并渲染对比报告
pub fn compare_gem_metadata(gem_name: &str, old_version: &str, new_version: &str) -> Result<String> {
    println!("正在获取 {gem_name} 的元数据...");

    let old_spec = fetch_gem_spec(gem_name, old_version)?;
    let new_spec = fetch_gem_spec(gem_name, new_version)?;

    Ok(render_metadata_report(&old_spec, &new_spec))
}

/// 渲染元数据对比报告
pub fn render_metadata_report(old_spec: &GemSpec, new_spec: &GemSpec) -> String {
    let mut report = String::new();

    let _ = writeln!(
        report,
        "=== 元数据对比: {} {} -> {} ===\n",
        new_spec.name, old_spec.version.version, new_spec.version.version
    );

    render_basic_info(&mut report, old_spec, new_spec);
    render_dependencies(&mut report, old_spec, new_spec);
    render_files(&mut report, old_spec, new_spec);
    render_metadata_map(&mut report, old_spec, new_spec);

    report
}

fn render_basic_info(report: &mut String, old_spec: &GemSpec, new_spec: &GemSpec) {
    let _ = writeln!(report, "--- 基本信息 ---");

    compare_field(report, "名称", &old_spec.name, &new_spec.name);
    compare_field(
        report,
        "版本",
        &old_spec.version.version,
        &new_spec.version.version,
    );
    compare_field(
        report,
        "作者",
        &old_spec.authors.join(", "),
        &new_spec.authors.join(", "),
    );
    compare_field(report, "邮箱", &join_email(old_spec), &join_email(new_spec));
    compare_field(
        report,
        "主页",
        old_spec.homepage.as_deref().unwrap_or(""),
        new_spec.homepage.as_deref().unwrap_or(""),
    );
    compare_field(
        report,
        "许可证",
        &old_spec.licenses.join(", "),
        &new_spec.licenses.join(", "),
    );
    compare_field(
        report,
        "摘要",
        old_spec.summary.as_deref().unwrap_or(""),
        new_spec.summary.as_deref().unwrap_or(""),
    );
    compare_field(
        report,
        "描述",
        old_spec.description.as_deref().unwrap_or(""),
        new_spec.description.as_deref().unwrap_or(""),
    );
    compare_field(
        report,
        "Ruby 版本要求",
        &old_spec.required_ruby_version.to_string(),
        &new_spec.required_ruby_version.to_string(),
    );
    compare_field(
        report,
        "RubyGems 版本要求",
        &old_spec.required_rubygems_version.to_string(),
        &new_spec.required_rubygems_version.to_string(),
    );

    report.push('\n');
}

fn join_email(spec: &GemSpec) -> String {
    spec.email
        .as_ref()
        .map(|email| email.join(", "))
        .unwrap_or_default()
}

/// 单个字段的对比：变化时列出新旧两行，否则只显示当前值
fn compare_field(report: &mut String, label: &str, old_value: &str, new_value: &str) {
    let old_value = old_value.trim();
    let new_value = new_value.trim();

    if old_value != new_value && !old_value.is_empty() {
        let _ = writeln!(report, "  ~ {label}:");
        let _ = writeln!(report, "      {old_value}");
        let _ = writeln!(report, "    -> {new_value}");
    } else {
        let _ = writeln!(report, "    {label}: {new_value}");
    }
}

fn render_dependencies(report: &mut String, old_spec: &GemSpec, new_spec: &GemSpec) {
    let _ = writeln!(report, "--- 运行时依赖 ---");
    render_dependency_list(
        report,
        &deps_of_kind(old_spec, "runtime"),
        &deps_of_kind(new_spec, "runtime"),
    );

    let _ = writeln!(report, "\n--- 开发依赖 ---");
    render_dependency_list(
        report,
        &deps_of_kind(old_spec, "development"),
        &deps_of_kind(new_spec, "development"),
    );

    report.push('\n');
}

fn deps_of_kind<'a>(spec: &'a GemSpec, kind: &str) -> BTreeMap<&'a str, &'a GemDependency> {
    spec.dependencies
        .iter()
        .filter(|dep| dep.kind() == kind)
        .map(|dep| (dep.name.as_str(), dep))
        .collect()
}

fn render_dependency_list(
    report: &mut String,
    old_deps: &BTreeMap<&str, &GemDependency>,
    new_deps: &BTreeMap<&str, &GemDependency>,
) {
    let names: BTreeSet<&str> = old_deps.keys().chain(new_deps.keys()).copied().collect();

    if names.is_empty() {
        let _ = writeln!(report, "  (无)");
        return;
    }

    for name in names {
        match (old_deps.get(name), new_deps.get(name)) {
            (Some(old_dep), None) => {
                let _ = writeln!(report, "  - {name} {} (已移除)", old_dep.requirement);
            }
            (None, Some(new_dep)) => {
                let _ = writeln!(report, "  + {name} {} (新增)", new_dep.requirement);
            }
            (Some(old_dep), Some(new_dep)) if old_dep.requirement != new_dep.requirement => {
                let _ = writeln!(
                    report,
                    "  ~ {name}: {} -> {}",
                    old_dep.requirement, new_dep.requirement
                );
            }
            (Some(_), Some(new_dep)) => {
                let _ = writeln!(report, "    {name} {}", new_dep.requirement);
            }
            (None, None) => {}
        }
    }
}

fn render_files(report: &mut String, old_spec: &GemSpec, new_spec: &GemSpec) {
    let _ = writeln!(report, "--- 文件 ---");

    let old_files: BTreeSet<&String> = old_spec.files.iter().collect();
    let new_files: BTreeSet<&String> = new_spec.files.iter().collect();

    let added: Vec<&&String> = new_files.difference(&old_files).collect();
    let removed: Vec<&&String> = old_files.difference(&new_files).collect();
    let unchanged = old_files.intersection(&new_files).count();

    let _ = writeln!(
        report,
        "  文件总数: {} -> {}",
        old_files.len(),
        new_files.len()
    );

    if !added.is_empty() {
        let _ = writeln!(report, "\n  新增 ({}):", added.len());
        for file in added.iter().take(10) {
            let _ = writeln!(report, "    + {file}");
        }
        if added.len() > 10 {
            let _ = writeln!(report, "    ... 以及另外 {} 个", added.len() - 10);
        }
    }

    if !removed.is_empty() {
        let _ = writeln!(report, "\n  删除 ({}):", removed.len());
        for file in removed.iter().take(10) {
            let _ = writeln!(report, "    - {file}");
        }
        if removed.len() > 10 {
            let _ = writeln!(report, "    ... 以及另外 {} 个", removed.len() - 10);
        }
    }

    let _ = writeln!(report, "\n  未变化: {unchanged} 个文件");
    report.push('\n');
}

fn render_metadata_map(report: &mut String, old_spec: &GemSpec, new_spec: &GemSpec) {
    let _ = writeln!(report, "--- 附加元数据 ---");

    let keys: BTreeSet<&String> = old_spec
        .metadata
        .keys()
        .chain(new_spec.metadata.keys())
        .collect();

    if keys.is_empty() {
        let _ = writeln!(report, "  (无)");
        report.push('\n');
        return;
    }

    for key in keys {
        match (old_spec.metadata.get(key), new_spec.metadata.get(key)) {
            (Some(old_value), None) => {
                let _ = writeln!(report, "  - {key}: {old_value}");
            }
            (None, Some(new_value)) => {
                let _ = writeln!(report, "  + {key}: {new_value}");
            }
            (Some(old_value), Some(new_value)) if old_value != new_value => {
                let _ = writeln!(report, "  ~ {key}:");
                let _ = writeln!(report, "      {old_value}");
                let _ = writeln!(report, "    -> {new_value}");
            }
            (Some(_), Some(new_value)) => {
                let _ = writeln!(report, "    {key}: {new_value}");
            }
            (None, None) => {}
        }
    }

    report.push('\n');
}
