//! 整体运行处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和整棵目录树的遍历。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、登录远端（登录失败直接终止）
//! 2. **运行前清理**：清空远端队列，避免上一次运行的残留混入
//! 3. **遍历目录**：按自顶向下的顺序逐个目录交给 `DirectoryProcessor`
//! 4. **资源管理**：唯一持有 `RemoteSession` 和 `ReconciliationTracker`
//! 5. **最终报告**：输出未解码文件列表，可选写入 JSON 报告
//!
//! 所有远端调用严格串行，不并发

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::remote_session::SessionOptions;
use crate::infrastructure::RemoteSession;
use crate::models::DirectoryMirror;
use crate::orchestrator::directory_processor::{DirectoryProcessor, RunStats};
use crate::services::{Batcher, ReconciliationTracker, TreeClassifier};
use crate::utils::logging;
use crate::workflow::BatchFlow;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 运行报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub finished_at: String,
    pub stats: RunStats,
    /// 未确认解码的源文件，按发现顺序
    pub failed: Vec<PathBuf>,
}

/// 应用主结构
pub struct App {
    config: Config,
    session: RemoteSession,
    classifier: TreeClassifier,
    flow: BatchFlow,
}

impl App {
    /// 初始化应用：校验配置并登录
    ///
    /// 登录失败时返回 `AuthFailure`，此时不会访问任何目录
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        let destination = config.destination_root();
        logging::log_startup(&config.source, &destination, &config.decoder, config.batch_size);

        let username = config.username.as_deref().unwrap_or_default();
        let password = config.password.as_deref().unwrap_or_default();
        let options = SessionOptions::from_config(&config);
        let session = RemoteSession::authenticate(options, username, password).await?;

        Ok(Self {
            classifier: TreeClassifier::from_config(&config),
            flow: BatchFlow::from_config(&config),
            config,
            session,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 致命错误（远端队列清不掉）时也会先输出已收集的失败列表
    pub async fn run(&self) -> AppResult<RunReport> {
        let mut tracker = ReconciliationTracker::new();
        let mut stats = RunStats::default();

        let outcome = self.process_tree(&mut tracker, &mut stats).await;

        let report = RunReport {
            source: self.config.source.clone(),
            destination: self.config.destination_root(),
            finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            stats,
            failed: tracker.into_report(),
        };

        logging::print_final_report(
            &report.source,
            &report.destination,
            &self.config.log_file,
            &report.failed,
        );
        if let Some(path) = &self.config.report_file {
            write_report(&report, path).await;
        }

        match outcome {
            Ok(()) => Ok(report),
            Err(e) => {
                error!("❌ 运行中止: {}", e);
                Err(e)
            }
        }
    }

    async fn process_tree(
        &self,
        tracker: &mut ReconciliationTracker,
        stats: &mut RunStats,
    ) -> AppResult<()> {
        self.clear_queue().await?;

        let source = &self.config.source;
        let destination = self.config.destination_root();
        // 目标目录位于源目录之内时不进入
        let dirs = self.classifier.walk_directories(source, Some(&destination));
        info!("✓ 找到 {} 个目录", dirs.len());

        let processor = DirectoryProcessor {
            session: &self.session,
            classifier: &self.classifier,
            batcher: Batcher::new(self.config.batch_size),
            flow: &self.flow,
            overwrite: self.config.overwrite,
        };

        for (index, dir) in dirs.iter().enumerate() {
            let mirror = DirectoryMirror::new(source, &destination, dir);
            processor.process(&mirror, index + 1, tracker, stats).await?;
        }

        info!(
            "📊 目录 {} | 复制 {} | 跳过 {} | 上传 {} 批 / {} 个文件 | 确认解码 {}",
            stats.directories,
            stats.copied,
            stats.skipped_existing,
            stats.batches,
            stats.submitted_files,
            stats.decoded
        );
        Ok(())
    }

    /// 运行前清理：队列清不掉是致命错误，网络错误只记录警告
    async fn clear_queue(&self) -> AppResult<()> {
        match self.flow.clearer().clear(&self.session).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("⚠️ 运行前清理远端队列失败: {}", e);
                Ok(())
            }
        }
    }
}

async fn write_report(report: &RunReport, path: &Path) {
    let result = match serde_json::to_string_pretty(report) {
        Ok(json) => tokio::fs::write(path, json)
            .await
            .map_err(|e| AppError::io(path, e).to_string()),
        Err(e) => Err(e.to_string()),
    };
    match result {
        Ok(()) => info!("📝 报告已写入: {}", path.display()),
        Err(e) => warn!("⚠️ 写入报告失败: {}", e),
    }
}
