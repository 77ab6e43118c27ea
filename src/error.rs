use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
///
/// 按作用范围划分：
/// - 致命（终止整个运行）：`AuthFailure`、`QueueStuck`、`Config`
/// - 批次级（记录后继续下一批）：`FormNotFound`、`Transport`
/// - 压缩包级（视为下载失败）：`ArchiveExtraction`
/// - 文件级：`Io`
#[derive(Debug, Error)]
pub enum AppError {
    /// 登录失败
    #[error("登录失败 (用户: {username}): 未跳转到账户页面, 最终地址 {final_url}")]
    AuthFailure { username: String, final_url: String },

    /// 解码页面中找不到上传控件
    #[error("找不到上传表单 ({url})")]
    FormNotFound { url: String },

    /// 网络请求失败
    #[error("网络请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 压缩包解析失败
    #[error("压缩包解析失败: {reason}")]
    ArchiveExtraction { reason: String },

    /// 远端队列在限定次数内没有清空
    #[error("远端队列在 {attempts} 次清理后仍不为空")]
    QueueStuck { attempts: usize },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 本地文件操作失败
    #[error("文件错误 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建压缩包解析错误
    pub fn archive(reason: impl Into<String>) -> Self {
        AppError::ArchiveExtraction {
            reason: reason.into(),
        }
    }

    /// 创建文件操作错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否需要终止整个运行
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::AuthFailure { .. } | AppError::QueueStuck { .. } | AppError::Config(_)
        )
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::archive(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
