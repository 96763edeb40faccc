use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ruby gem 版本源码对比工具
#[derive(Parser)]
#[command(name = "gdt")]
#[command(version)]
#[command(about = "对比同一个 Ruby gem 两个版本的源码", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 下载两个版本并对比源码树
    Compare {
        /// gem 名称
        gem_name: String,
        /// 旧版本号
        old_version: String,
        /// 新版本号
        new_version: String,
        /// 自定义缓存目录
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,
        /// 先输出元数据对比再输出源码差异
        #[arg(long)]
        metadata: bool,
    },
    /// 只对比两个版本的元数据
    Metadata {
        /// gem 名称
        gem_name: String,
        /// 旧版本号
        old_version: String,
        /// 新版本号
        new_version: String,
    },
    /// 管理缓存目录
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// 清空缓存目录
    Clear {
        /// 自定义缓存目录
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,
    },
    /// 查看缓存目录信息
    Info {
        /// 自定义缓存目录
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,
    },
}
