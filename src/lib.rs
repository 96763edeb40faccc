//! # Gem Diff Tool
//!
//! Ruby gem 版本源码对比工具库
//!
//! ## 功能
//!
//! - 从 rubygems.org 下载任意版本的 gem 归档
//! - 解开 .gem 的嵌套 tar 结构，按 (名称, 版本) 缓存解包结果
//! - 以统一 diff 风格输出两个版本源码树的差异，自动识别二进制文件
//! - 可选对比 gemspec 元数据（依赖、许可证、文件列表等）
//!
//! ## 使用示例
//!
//! ```no_run
//! use gem_diff_tool::compare::compare_gem_versions;
//!
//! let outcome = compare_gem_versions("rails", "7.0.0", "7.1.0", None).unwrap();
//! print!("{}", outcome.text);
//! if outcome.has_differences {
//!     println!("两个版本存在差异");
//! }
//! ```

pub mod cli;
pub mod compare;
pub mod diff;
pub mod error;
pub mod gem;
pub mod utils;

// 重新导出常用类型
pub use diff::{BuiltinDiff, DiffBackend, DiffOutcome, ExternalDiff, select_backend};
pub use error::GemDiffError;
pub use gem::{extract_gem_archive, resolve_gem};
