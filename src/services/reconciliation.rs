//! 失败汇总 - 业务能力层
//!
//! 整个运行只有一个实例，由编排层持有并按引用传递

use serde::Serialize;
use std::path::{Path, PathBuf};

/// 未确认解码成功的文件列表
///
/// 只追加，不去重，按发现顺序排列
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationTracker {
    failed: Vec<PathBuf>,
}

impl ReconciliationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 远端明确报告失败，或下载失败
    pub fn record_failure(&mut self, path: impl AsRef<Path>) {
        self.failed.push(path.as_ref().to_path_buf());
    }

    /// 结果未知（响应中没有该文件，或报告成功但未写出），与失败同等对待
    pub fn record_indeterminate(&mut self, path: impl AsRef<Path>) {
        self.record_failure(path);
    }

    pub fn report(&self) -> &[PathBuf] {
        &self.failed
    }

    pub fn into_report(self) -> Vec<PathBuf> {
        self.failed
    }
}
