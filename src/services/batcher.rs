//! 分批服务 - 业务能力层

use crate::models::Batch;

/// 把文件名列表按顺序切成固定大小的批次
///
/// 第 i 批为 `files[i*max_size .. min((i+1)*max_size, len)]`，
/// 空输入得到零个批次。`max_size` 为 0 时按 1 处理（配置校验已禁止 0）
pub fn batch(files: &[String], max_size: usize) -> Vec<Batch> {
    files
        .chunks(max_size.max(1))
        .map(|chunk| Batch::new(chunk.to_vec()))
        .collect()
}

/// 持有批次大小的分批器
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    max_size: usize,
}

impl Batcher {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn split(&self, files: &[String]) -> Vec<Batch> {
        batch(files, self.max_size)
    }
}
