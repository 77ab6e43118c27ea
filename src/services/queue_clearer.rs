//! 远端队列清理服务 - 业务能力层
//!
//! 远端会保留已上传 / 已解码的文件，不清理就会混进下一次下载的压缩包

use crate::error::{AppError, AppResult};
use crate::infrastructure::remote_session::endpoints;
use crate::infrastructure::{markup, RemoteSession};
use tracing::{debug, info};

/// 队列页面中每个待处理文件对应的表单字段
pub const QUEUE_FIELD: &str = "file[]";

/// 队列清理服务
pub struct QueueClearer {
    decoder: String,
    max_attempts: usize,
}

impl QueueClearer {
    pub fn new(decoder: impl Into<String>, max_attempts: usize) -> Self {
        Self {
            decoder: decoder.into(),
            max_attempts,
        }
    }

    /// 反复读取队列并提交删除，直到队列为空
    ///
    /// # 返回
    /// 返回提交删除的轮数；`max_attempts` 轮删除后再读一次队列，
    /// 仍不为空时返回 `QueueStuck`
    pub async fn clear(&self, session: &RemoteSession) -> AppResult<usize> {
        let path = endpoints::queue(&self.decoder);
        info!("🧹 正在清理远端队列...");

        for attempt in 0..=self.max_attempts {
            let page = session.get_text(&path).await?;
            let queued = queued_values(&page);
            if queued.is_empty() {
                info!("✓ 远端队列已清空 (共 {} 轮)", attempt);
                return Ok(attempt);
            }
            if attempt == self.max_attempts {
                break;
            }

            debug!("第 {} 轮: 删除 {} 个文件", attempt + 1, queued.len());
            let form: Vec<(&str, String)> = queued.into_iter().map(|v| (QUEUE_FIELD, v)).collect();
            session.post_form(&path, &form).await?;
            info!("...{}", attempt + 1);
        }

        Err(AppError::QueueStuck {
            attempts: self.max_attempts,
        })
    }
}

/// 队列页面中的待处理文件标识
pub fn queued_values(page: &str) -> Vec<String> {
    markup::find_all_by_name(page, QUEUE_FIELD)
        .into_iter()
        .map(|tag| tag.attr("value").unwrap_or_default().to_string())
        .collect()
}
