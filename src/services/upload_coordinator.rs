//! 上传服务 - 业务能力层
//!
//! 只负责"把一批文件提交给远端并解析结果"，不关心下载和清理

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::remote_session::endpoints;
use crate::infrastructure::{markup, RemoteSession};
use crate::models::{Batch, DirectoryMirror, UploadOutcome};
use crate::services::result_parser::{NoticeResultParser, ResultParser};
use crate::utils::logging::truncate_text;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, warn};

/// 上传控件的 id，控件的 name 每次加载页面都会变
pub const UPLOAD_FIELD_ID: &str = "uploadfileblue";

/// 上传服务
pub struct UploadCoordinator {
    decoder: String,
    mime: String,
    parser: Box<dyn ResultParser>,
}

impl UploadCoordinator {
    pub fn new(
        decoder: impl Into<String>,
        mime: impl Into<String>,
        parser: Box<dyn ResultParser>,
    ) -> Self {
        Self {
            decoder: decoder.into(),
            mime: mime.into(),
            parser,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.decoder.clone(),
            config.upload_mime.clone(),
            Box::new(NoticeResultParser::new()),
        )
    }

    /// 读取上传页面，找到本次的上传字段名
    pub async fn discover_field(&self, session: &RemoteSession) -> AppResult<String> {
        let path = endpoints::decoder(&self.decoder);
        let page = session.get_text(&path).await?;

        let field = markup::find_by_id(&page, UPLOAD_FIELD_ID)
            .and_then(|tag| tag.attr("name").map(str::to_string));
        match field {
            Some(field) => {
                debug!("上传字段: {}", field);
                Ok(field)
            }
            None => {
                error!("页面内容: {}", truncate_text(&markup::page_text(&page), 300));
                Err(AppError::FormNotFound { url: session.url(&path) })
            }
        }
    }

    /// 提交一批文件
    ///
    /// # 参数
    /// - `session`: 已登录的会话
    /// - `mirror`: 批次所在目录
    /// - `batch`: 本批文件名
    ///
    /// # 返回
    /// 返回只包含本批文件的上传结果
    pub async fn submit(
        &self,
        session: &RemoteSession,
        mirror: &DirectoryMirror,
        batch: &Batch,
    ) -> AppResult<UploadOutcome> {
        let field = self.discover_field(session).await?;

        let mut form = Form::new();
        for name in batch.files() {
            let path = mirror.source_path(name);
            let content = tokio::fs::read(&path).await.map_err(|e| AppError::io(&path, e))?;
            let part = Part::bytes(content)
                .file_name(name.clone())
                .mime_str(&self.mime)
                .map_err(|e| AppError::transport("multipart", e))?;
            form = form.part(field.clone(), part);
        }
        let form = form.text("submit", "Decode");

        let response = session
            .post_multipart(&endpoints::decoder(&self.decoder), form)
            .await?;

        let outcome = self.parser.parse(&response);
        for name in outcome.succeeded.iter().chain(outcome.failed.iter()) {
            if !batch.contains(name) {
                warn!("⚠️ 响应中出现未提交的文件名: {}", name);
            }
        }
        Ok(outcome.restrict_to(batch))
    }
}
