//! 单批上传结果

use crate::models::Batch;

/// 从上传响应中解析出的成功 / 失败文件名
///
/// 同一个文件名最多出现在其中一个列表里
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl UploadOutcome {
    pub fn new(succeeded: Vec<String>, failed: Vec<String>) -> Self {
        let succeeded = succeeded
            .into_iter()
            .filter(|name| !failed.contains(name))
            .collect();
        Self { succeeded, failed }
    }

    /// 只保留本批提交过的文件名
    pub fn restrict_to(self, batch: &Batch) -> Self {
        Self {
            succeeded: self.succeeded.into_iter().filter(|f| batch.contains(f)).collect(),
            failed: self.failed.into_iter().filter(|f| batch.contains(f)).collect(),
        }
    }

    /// 本批中既不在成功列表也不在失败列表的文件
    pub fn indeterminate<'a>(&'a self, batch: &'a Batch) -> impl Iterator<Item = &'a String> + 'a {
        batch
            .files()
            .iter()
            .filter(move |f| !self.succeeded.contains(f) && !self.failed.contains(f))
    }

    pub fn has_successes(&self) -> bool {
        !self.succeeded.is_empty()
    }
}
