//! 上传批次

/// 一次上传请求中的文件名（不含目录），保持分类时的顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    files: Vec<String>,
}

impl Batch {
    /// 由 `Batcher` 创建，保证非空
    pub(crate) fn new(files: Vec<String>) -> Self {
        debug_assert!(!files.is_empty());
        Self { files }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }
}
