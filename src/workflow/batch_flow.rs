//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一批文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 上传 → 解析结果
//! 2. 有成功文件时下载压缩包
//! 3. 清理远端队列
//!
//! 状态：`Classified → Submitted → ResultParsed → (Downloading →
//! Downloaded | DownloadFailed) → QueueCleared → Done`

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::RemoteSession;
use crate::models::{Batch, DirectoryMirror};
use crate::services::{ArchiveRetriever, QueueClearer, ReconciliationTracker, UploadCoordinator};
use crate::utils::logging;
use crate::workflow::batch_ctx::BatchCtx;

/// 批次所经过的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Classified,
    Submitted,
    ResultParsed,
    Downloading,
    Downloaded,
    DownloadFailed,
    QueueCleared,
    Done,
}

/// 单批处理结果
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// 是否成功提交并拿到响应
    pub submitted: bool,
    /// 最终确认写出的文件数
    pub decoded: usize,
    /// 经过的状态，按顺序
    pub stages: Vec<BatchStage>,
}

impl BatchResult {
    fn enter(&mut self, ctx: &BatchCtx, stage: BatchStage) {
        debug!("{} -> {:?}", ctx, stage);
        self.stages.push(stage);
    }
}

/// 批次处理流程
///
/// - 编排上传 / 下载 / 清理
/// - 决定哪些文件记为失败
/// - 不持有会话，只借用
pub struct BatchFlow {
    uploader: UploadCoordinator,
    retriever: ArchiveRetriever,
    clearer: QueueClearer,
}

impl BatchFlow {
    pub fn new(
        uploader: UploadCoordinator,
        retriever: ArchiveRetriever,
        clearer: QueueClearer,
    ) -> Self {
        Self {
            uploader,
            retriever,
            clearer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            UploadCoordinator::from_config(config),
            ArchiveRetriever::default(),
            QueueClearer::new(config.decoder.clone(), config.max_clear_attempts),
        )
    }

    pub fn clearer(&self) -> &QueueClearer {
        &self.clearer
    }

    /// 处理一批文件
    ///
    /// 批次内的失败都记入 `tracker` 后返回 `Ok`；只有致命错误
    /// （远端队列清不掉）才返回 `Err`
    pub async fn run(
        &self,
        session: &RemoteSession,
        mirror: &DirectoryMirror,
        batch: &Batch,
        ctx: &BatchCtx,
        tracker: &mut ReconciliationTracker,
    ) -> AppResult<BatchResult> {
        let mut result = BatchResult::default();
        result.enter(ctx, BatchStage::Classified);

        logging::log_batch_start(ctx.batch_index, ctx.total_batches, batch.len());

        match self.uploader.submit(session, mirror, batch).await {
            Ok(outcome) => {
                result.submitted = true;
                result.enter(ctx, BatchStage::Submitted);
                result.enter(ctx, BatchStage::ResultParsed);
                logging::log_batch_complete(outcome.succeeded.len(), outcome.failed.len());

                for name in &outcome.failed {
                    tracker.record_failure(mirror.source_path(name));
                }
                for name in outcome.indeterminate(batch) {
                    warn!("{} ⚠️ 响应中没有 {} 的结果", ctx, name);
                    tracker.record_indeterminate(mirror.source_path(name));
                }

                if outcome.has_successes() {
                    result.enter(ctx, BatchStage::Downloading);
                    let written = self.retriever.retrieve(session, &mirror.destination).await;
                    if let Some(written) = written {
                        result.enter(ctx, BatchStage::Downloaded);
                        // 只认本次压缩包写出的文件，目标目录中的旧文件不算
                        for name in &outcome.succeeded {
                            if written.contains(&mirror.destination_path(name)) {
                                result.decoded += 1;
                            } else {
                                warn!("{} ⚠️ {} 报告成功但压缩包中没有", ctx, name);
                                tracker.record_indeterminate(mirror.source_path(name));
                            }
                        }
                    } else {
                        result.enter(ctx, BatchStage::DownloadFailed);
                        warn!("{} couldn't download, 本批文件全部记为未解码", ctx);
                        // 已记为失败 / 未知的文件不再重复记录
                        for name in &outcome.succeeded {
                            tracker.record_failure(mirror.source_path(name));
                        }
                    }
                }
            }
            Err(e) => {
                error!("{} ❌ 上传失败: {}", ctx, e);
                for name in batch.files() {
                    tracker.record_failure(mirror.source_path(name));
                }
            }
        }

        match self.clearer.clear(session).await {
            Ok(_) => result.enter(ctx, BatchStage::QueueCleared),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!("{} ⚠️ 清理远端队列失败: {}", ctx, e),
        }

        result.enter(ctx, BatchStage::Done);
        info!("{} 完成, 确认解码 {}/{}", ctx, result.decoded, batch.len());
        Ok(result)
    }
}
