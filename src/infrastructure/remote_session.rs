//! 远端会话 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端（cookie、默认请求头），只暴露"发请求"的能力，
//! 不认识批次 / 目录

use crate::config::Config;
use crate::error::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONNECTION, ORIGIN};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/90.0.4430.30 Safari/537.36";

/// 远端接口路径
pub mod endpoints {
    pub const LOGIN: &str = "/login";
    pub const DOWNLOAD_ALL: &str = "/download.php?id=all";

    /// 上传页面 / 上传接口
    pub fn decoder(profile: &str) -> String {
        format!("/decoder/{}", profile)
    }

    /// 队列页面 / 清理接口
    pub fn queue(profile: &str) -> String {
        format!("/decoder/{}/1", profile)
    }
}

/// 会话参数
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        }
    }
}

/// 已登录的远端会话
///
/// 只能通过 [`RemoteSession::authenticate`] 创建
pub struct RemoteSession {
    client: Client,
    options: SessionOptions,
    authenticated: bool,
}

impl RemoteSession {
    /// 登录远端服务
    ///
    /// 远端对失败的登录同样返回 200，所以只有跟随重定向后的最终地址
    /// 中包含 `/account` 才算成功
    ///
    /// # 参数
    /// - `options`: 会话参数
    /// - `username`: 用户名
    /// - `password`: 密码
    ///
    /// # 返回
    /// 返回已登录的会话；失败时返回 `AuthFailure` 或 `Transport`
    pub async fn authenticate(
        options: SessionOptions,
        username: &str,
        password: &str,
    ) -> AppResult<Self> {
        let client = build_client(&options)?;
        let url = format!("{}{}", options.base_url, endpoints::LOGIN);
        info!("🔐 正在登录: {}", url);

        let response = client
            .post(&url)
            .timeout(options.request_timeout)
            .form(&[("loginname", username), ("password", password)])
            .send()
            .await
            .map_err(|e| AppError::transport(endpoints::LOGIN, e))?;

        let final_url = response.url().clone();
        debug!("登录后地址: {} (状态码 {})", final_url, response.status());

        if !final_url.as_str().contains("/account") {
            return Err(AppError::AuthFailure {
                username: username.to_string(),
                final_url: final_url.to_string(),
            });
        }

        info!("✓ 登录成功");
        Ok(Self {
            client,
            options,
            authenticated: true,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// 拼接完整地址
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url, path)
    }

    /// GET 页面，返回文本
    pub async fn get_text(&self, path: &str) -> AppResult<String> {
        let request = self.client.get(self.url(path)).timeout(self.options.request_timeout);
        let response = send(request, path).await?;
        response.text().await.map_err(|e| AppError::transport(path, e))
    }

    /// GET 二进制内容（压缩包）
    pub async fn get_bytes(&self, path: &str) -> AppResult<Vec<u8>> {
        let request = self.client.get(self.url(path)).timeout(self.options.upload_timeout);
        let response = send(request, path).await?;
        let bytes = response.bytes().await.map_err(|e| AppError::transport(path, e))?;
        Ok(bytes.to_vec())
    }

    /// POST 表单，返回响应文本
    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
    ) -> AppResult<String> {
        let request = self
            .client
            .post(self.url(path))
            .timeout(self.options.request_timeout)
            .form(form);
        let response = send(request, path).await?;
        response.text().await.map_err(|e| AppError::transport(path, e))
    }

    /// POST multipart（上传），使用较长的超时
    pub async fn post_multipart(&self, path: &str, form: Form) -> AppResult<String> {
        let request = self
            .client
            .post(self.url(path))
            .timeout(self.options.upload_timeout)
            .multipart(form);
        let response = send(request, path).await?;
        response.text().await.map_err(|e| AppError::transport(path, e))
    }
}

async fn send(request: RequestBuilder, endpoint: &str) -> AppResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::transport(endpoint, e))?;
    debug!("{} -> {}", endpoint, response.status());
    response
        .error_for_status()
        .map_err(|e| AppError::transport(endpoint, e))
}

fn build_client(options: &SessionOptions) -> AppResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    let origin = HeaderValue::from_str(&options.base_url)
        .map_err(|_| AppError::Config(format!("无效的服务地址: {}", options.base_url)))?;
    headers.insert(ORIGIN, origin);

    Client::builder()
        .cookie_store(true)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .map_err(|e| AppError::transport("client", e))
}
