use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;

use super::archive::{container_reader, read_outer_entry};
use super::fetch::download_gem;
use crate::error::GemDiffError;

/// gemspec 元数据在外层 tar 中的条目名
const METADATA_ENTRIES: [&str; 2] = ["metadata.gz", "metadata"];

/// gemspec 元数据的精简模型
///
/// 只保留对比报告用得到的字段，其余字段解析时直接忽略。
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GemSpec {
    pub name: String,
    pub version: VersionField,
    pub authors: Vec<String>,
    pub email: Option<StringOrList>,
    pub homepage: Option<String>,
    pub licenses: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub required_ruby_version: RequirementField,
    pub required_rubygems_version: RequirementField,
    pub dependencies: Vec<GemDependency>,
    pub files: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Gem::Version 序列化后的形态：{ version: "x.y.z" }
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionField {
    pub version: String,
}

/// Gem::Requirement：[[运算符, 版本], ...]
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequirementField {
    pub requirements: Vec<(String, VersionField)>,
}

impl fmt::Display for RequirementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.requirements.is_empty() {
            return f.write_str(">= 0");
        }
        let clauses: Vec<String> = self
            .requirements
            .iter()
            .map(|(op, version)| format!("{op} {}", version.version))
            .collect();
        f.write_str(&clauses.join(", "))
    }
}

/// gemspec 里既可能是单个字符串也可能是列表的字段（如 email）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn join(&self, separator: &str) -> String {
        match self {
            StringOrList::One(value) => value.clone(),
            StringOrList::Many(values) => values.join(separator),
        }
    }
}

/// gemspec 声明的一条依赖
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GemDependency {
    pub name: String,
    pub requirement: RequirementField,
    #[serde(rename = "type")]
    pub dep_type: String,
    pub prerelease: bool,
}

impl GemDependency {
    /// 依赖类型，去掉 Ruby symbol 的冒号前缀（:runtime -> runtime）
    pub fn kind(&self) -> &str {
        self.dep_type.strip_prefix(':').unwrap_or(&self.dep_type)
    }
}

/// 下载 gem 并解析其 metadata 条目为 GemSpec
///
/// 元数据走独立下载，不经过源码缓存；条目本身可能再套一层 gzip，
/// 复用同一个探测逻辑处理。
pub fn fetch_gem_spec(gem_name: &str, version: &str) -> Result<GemSpec> {
    let gem_file = download_gem(gem_name, version)?;

    let file = File::open(gem_file.path())
        .map_err(|e| GemDiffError::Archive(format!("无法打开归档: {e}")))?;
    let raw = read_outer_entry(BufReader::new(file), &METADATA_ENTRIES)?
        .ok_or_else(|| GemDiffError::Archive("未找到 metadata 条目".to_string()))?;

    let mut reader = container_reader(raw.as_slice())
        .map_err(|e| GemDiffError::Archive(format!("读取 metadata 失败: {e}")))?;
    let mut yaml = String::new();
    reader
        .read_to_string(&mut yaml)
        .map_err(|e| GemDiffError::Archive(format!("解压 metadata 失败: {e}")))?;

    parse_gem_spec(&yaml).with_context(|| format!("解析 {gem_name} {version} 的元数据失败"))
}

/// 解析 gemspec YAML：先递归剥掉 !ruby/... 标签，再反序列化
pub fn parse_gem_spec(yaml: &str) -> Result<GemSpec> {
    let value: Value = serde_yaml::from_str(yaml).context("gemspec 不是合法的 YAML")?;
    let spec = serde_yaml::from_value(untag(value)).context("gemspec 字段结构不符合预期")?;
    Ok(spec)
}

/// 递归剥除 YAML 标签（!ruby/object:Gem::Specification 等）
fn untag(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => untag(tagged.value),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, val)| (untag(key), untag(val)))
                .collect(),
        ),
        Value::Sequence(sequence) => Value::Sequence(sequence.into_iter().map(untag).collect()),
        other => other,
    }
}
