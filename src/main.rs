use std::process;

use anyhow::Result;
use clap::Parser;

use gem_diff_tool::cli::{CacheCommands, Cli, Commands};
use gem_diff_tool::compare::compare_gem_versions;
use gem_diff_tool::gem::{cache_report, clear_cache, compare_gem_metadata, default_cache_root};

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            gem_name,
            old_version,
            new_version,
            cache_dir,
            metadata,
        } => {
            if metadata {
                let report = compare_gem_metadata(&gem_name, &old_version, &new_version)?;
                print!("{report}");
                println!("{}", "=".repeat(60));
                println!("源码对比");
                println!("{}\n", "=".repeat(60));
            }

            let outcome = compare_gem_versions(&gem_name, &old_version, &new_version, cache_dir)?;
            print!("{}", outcome.text);

            // 退出码约定：0 无差异，1 有差异，致命错误走 main 里的 2
            Ok(if outcome.has_differences { 1 } else { 0 })
        }
        Commands::Metadata {
            gem_name,
            old_version,
            new_version,
        } => {
            let report = compare_gem_metadata(&gem_name, &old_version, &new_version)?;
            print!("{report}");
            Ok(0)
        }
        Commands::Cache { command } => {
            match command {
                CacheCommands::Clear { cache_dir } => {
                    clear_cache(&cache_dir.unwrap_or_else(default_cache_root))?;
                }
                CacheCommands::Info { cache_dir } => {
                    print!("{}", cache_report(&cache_dir.unwrap_or_else(default_cache_root)));
                }
            }
            Ok(0)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("错误: {:#}", err);
            process::exit(2);
        }
    }
}
