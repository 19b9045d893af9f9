//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use console::style;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::orchestrator::BatchStats;

/// 初始化 tracing
///
/// 终端输出受 `RUST_LOG` 控制（默认 `info`，`verbose` 时为 `debug`），
/// 同时以追加方式写入 `log_file_path`
///
/// # 参数
/// - `verbose`: 是否输出详细日志
/// - `log_file_path`: 日志文件路径，需先由 `init_log_file` 创建
pub fn init(verbose: bool, log_file_path: &str) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .context("日志系统初始化失败")?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n资料包上传日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path))?;
    Ok(())
}

/// 在终端打印本次运行的参数
pub fn print_banner(infile: &Path, open_access: bool, guest_edited: bool) {
    println!("\tUnzipping: {}", style(infile.display()).cyan());
    println!("\tOpen access: {}", flag(open_access));
    println!("\tGuest edited: {}", flag(guest_edited));
}

fn flag(value: bool) -> String {
    if value {
        style(value).green().to_string()
    } else {
        style(value).red().to_string()
    }
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 资料包上传模式");
    info!("🌐 CMS: {}", config.cms_base_url);
    info!(
        "🖥️ 浏览器: {}",
        if config.headless {
            "headless".to_string()
        } else {
            format!("调试端口 {}", config.browser_debug_port)
        }
    );
    info!("🛑 失败策略: {:?}", config.failure_policy);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 批次统计
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(stats: &BatchStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已发布: {}/{}", stats.published, stats.total);
    info!("📅 无上线日期: {}", stats.no_live_date);
    info!("💾 未保存: {}", stats.not_saved);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
