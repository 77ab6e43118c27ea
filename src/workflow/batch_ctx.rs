//! 批次处理上下文
//!
//! 封装"我正在处理哪个目录的第几批"这一信息

use std::fmt::Display;

/// 批次处理上下文
#[derive(Debug, Clone)]
pub struct BatchCtx {
    /// 目录序号（仅用于日志显示，从 1 开始）
    pub dir_index: usize,

    /// 批次在目录中的序号（从 1 开始）
    pub batch_index: usize,

    /// 目录中的批次总数
    pub total_batches: usize,
}

impl BatchCtx {
    pub fn new(dir_index: usize, batch_index: usize, total_batches: usize) -> Self {
        Self {
            dir_index,
            batch_index,
            total_batches,
        }
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[目录 #{} 批次 {}/{}]",
            self.dir_index, self.batch_index, self.total_batches
        )
    }
}
