//! 单个目录处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **分类**：把目录下的文件分为"需要解码"和"原样复制"
//! 2. **复制**：原样复制不需要解码的文件
//! 3. **续跑**：不覆盖模式下跳过目标目录中已存在的文件
//! 4. **分批**：按批次大小切分，逐批交给 `BatchFlow`

use crate::error::AppResult;
use crate::infrastructure::RemoteSession;
use crate::models::DirectoryMirror;
use crate::services::tree_classifier::drop_existing;
use crate::services::{mirror_copier, Batcher, ReconciliationTracker, TreeClassifier};
use crate::workflow::{BatchCtx, BatchFlow};
use serde::Serialize;
use tracing::{error, info};

/// 运行统计
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub directories: usize,
    pub copied: usize,
    pub skipped_existing: usize,
    pub batches: usize,
    pub submitted_files: usize,
    pub decoded: usize,
}

/// 目录处理所需的能力
pub struct DirectoryProcessor<'a> {
    pub session: &'a RemoteSession,
    pub classifier: &'a TreeClassifier,
    pub batcher: Batcher,
    pub flow: &'a BatchFlow,
    pub overwrite: bool,
}

impl DirectoryProcessor<'_> {
    /// 处理单个目录
    ///
    /// # 参数
    /// - `mirror`: 源目录与目标目录
    /// - `dir_index`: 目录序号（用于日志）
    /// - `tracker`: 失败汇总
    /// - `stats`: 运行统计
    ///
    /// # 返回
    /// 目录内的失败都已记入 `tracker`，只有致命错误返回 `Err`
    pub async fn process(
        &self,
        mirror: &DirectoryMirror,
        dir_index: usize,
        tracker: &mut ReconciliationTracker,
        stats: &mut RunStats,
    ) -> AppResult<()> {
        info!("📁 descended into {}", mirror.source.display());
        stats.directories += 1;

        let classified = match self.classifier.classify(&mirror.source).await {
            Ok(classified) => classified,
            Err(e) => {
                error!("❌ 无法读取目录: {}", e);
                return Ok(());
            }
        };

        if let Err(e) = mirror.ensure_destination() {
            error!("❌ 无法创建目标目录: {}", e);
            for name in classified.decode.iter().chain(classified.copy.iter()) {
                tracker.record_failure(mirror.source_path(name));
            }
            return Ok(());
        }

        let copied = mirror_copier::copy_files(mirror, &classified.copy).await;
        stats.copied += copied.copied;
        for path in copied.failed {
            tracker.record_failure(path);
        }

        let mut pending = classified.decode;
        if !self.overwrite {
            let before = pending.len();
            pending = drop_existing(pending, mirror);
            stats.skipped_existing += before - pending.len();
        }

        if pending.is_empty() {
            return Ok(());
        }

        let batches = self.batcher.split(&pending);
        let total_batches = batches.len();
        info!("🔍 {} 个文件需要解码, 分 {} 批上传", pending.len(), total_batches);

        for (index, batch) in batches.iter().enumerate() {
            let ctx = BatchCtx::new(dir_index, index + 1, total_batches);
            let result = self.flow.run(self.session, mirror, batch, &ctx, tracker).await?;

            stats.batches += 1;
            if result.submitted {
                stats.submitted_files += batch.len();
            }
            stats.decoded += result.decoded;
        }

        Ok(())
    }
}
