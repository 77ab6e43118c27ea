//! 上传结果解析 - 业务能力层
//!
//! 远端返回的是 HTML 页面，成功 / 失败各自是一个提示框：
//! - `div.alert-success`: 文本第 2 个词是文件名
//! - `div.alert-danger`: 文本第 4 个词是文件名
//!
//! 这是对远端提示文案的位置约定，文案一变就会取到错误的词或取不到，
//! 不会报错。需要适配新页面时实现新的 [`ResultParser`] 即可

use crate::infrastructure::markup;
use crate::models::UploadOutcome;
use tracing::warn;

/// 上传响应解析器
pub trait ResultParser: Send + Sync {
    fn parse(&self, response: &str) -> UploadOutcome;
}

/// 按提示框位置取词的解析器（当前远端页面）
#[derive(Debug, Clone)]
pub struct NoticeResultParser {
    success_class: String,
    failure_class: String,
    success_token: usize,
    failure_token: usize,
}

impl Default for NoticeResultParser {
    fn default() -> Self {
        Self {
            success_class: "alert-success".to_string(),
            failure_class: "alert-danger".to_string(),
            success_token: 1,
            failure_token: 3,
        }
    }
}

impl NoticeResultParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn extract(&self, response: &str, class: &str, token: usize) -> Vec<String> {
        markup::div_texts_with_class(response, class)
            .into_iter()
            .filter_map(|text| {
                let name = text.split_whitespace().nth(token).map(str::to_string);
                if name.is_none() {
                    warn!("⚠️ 无法从提示中取出文件名 ({}): {}", class, text.trim());
                }
                name
            })
            .collect()
    }
}

impl ResultParser for NoticeResultParser {
    fn parse(&self, response: &str) -> UploadOutcome {
        let succeeded = self.extract(response, &self.success_class, self.success_token);
        let failed = self.extract(response, &self.failure_class, self.failure_token);
        UploadOutcome::new(succeeded, failed)
    }
}
