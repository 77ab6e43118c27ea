//! 日志工具模块
//!
//! 提供日志初始化以及运行横幅的输出函数

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志
///
/// 控制台输出 + 追加写入日志文件，级别由 `RUST_LOG` 决定，
/// 未设置时为 `info`（`verbose` 时为 `debug`）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `verbose`: 是否输出 debug 日志
pub fn init(log_file_path: &Path, verbose: bool) -> Result<()> {
    init_log_file(log_file_path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 在日志文件中写入本次运行的分隔头
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let log_header = format!(
        "{}\n解码运行日志 - {}\n{}\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path.display()))?;
    file.write_all(log_header.as_bytes())?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(source: &Path, destination: &Path, decoder: &str, batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 远端批量解码");
    info!("📁 源目录: {}", source.display());
    info!("📂 目标目录: {}", destination.display());
    info!("🔧 解码器: {} | 每批 {} 个文件", decoder, batch_size);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号（目录内，从 1 开始）
/// - `total_batches`: 目录内批次总数
/// - `size`: 本批文件数
pub fn log_batch_start(batch_num: usize, total_batches: usize, size: usize) {
    info!("{}", "─".repeat(60));
    info!("📦 上传第 {}/{} 批, 共 {} 个文件...", batch_num, total_batches, size);
}

/// 记录批次结果
pub fn log_batch_complete(succeeded: usize, failed: usize) {
    info!("✓ 完成: 成功 {} 个, 失败 {} 个", succeeded, failed);
}

/// 打印最终统计和失败列表
pub fn print_final_report(
    source: &Path,
    destination: &Path,
    log_file_path: &Path,
    failed: &[std::path::PathBuf],
) {
    info!("{}", "=".repeat(60));
    info!("✅ 处理完成 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("源目录: {}", source.display());
    info!("目标目录: {}", destination.display());
    info!("日志文件: {}", log_file_path.display());
    if !failed.is_empty() {
        tracing::error!("❌ 以下 {} 个文件解码失败:", failed.len());
        for path in failed {
            tracing::error!("failed to decode: {}", path.display());
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
