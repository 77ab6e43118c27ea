use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 默认解码器配置名
pub const DEFAULT_DECODER: &str = "ic10php72";
/// 默认每批文件数
pub const DEFAULT_BATCH_SIZE: usize = 25;
/// 需要远端解码的文件内容标记
pub const DEFAULT_MARKER: &str = "if(!extension_loaded('ionCube Loader'))";

/// 程序配置
///
/// 合并顺序：默认值 → 配置文件 → 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 账户 ---
    pub username: Option<String>,
    pub password: Option<String>,
    // --- 目录 ---
    pub source: PathBuf,
    /// 目标根目录，未设置时为 `<源目录名>_decoded`
    pub destination: Option<PathBuf>,
    /// 是否覆盖已存在的解码结果
    pub overwrite: bool,
    // --- 远端服务 ---
    pub base_url: String,
    /// 解码器配置名，拼在 `/decoder/{decoder}` 中
    pub decoder: String,
    pub batch_size: usize,
    /// 页面类请求超时（秒）
    pub request_timeout_secs: u64,
    /// 上传请求超时（秒）
    pub upload_timeout_secs: u64,
    /// 清理队列的最大轮数
    pub max_clear_attempts: usize,
    // --- 文件识别 ---
    pub marker: String,
    pub extension: String,
    pub upload_mime: String,
    // --- 输出 ---
    pub log_file: PathBuf,
    pub report_file: Option<PathBuf>,
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            source: PathBuf::new(),
            destination: None,
            overwrite: false,
            base_url: "https://easytoyou.eu".to_string(),
            decoder: DEFAULT_DECODER.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout_secs: 30,
            upload_timeout_secs: 300,
            max_clear_attempts: 50,
            marker: DEFAULT_MARKER.to_string(),
            extension: ".php".to_string(),
            upload_mime: "application/x-php".to_string(),
            log_file: PathBuf::from("decode-mirror.log"),
            report_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按完整优先级加载配置
    pub fn load(cli: &Cli) -> Result<Self> {
        let base = match &cli.config {
            Some(path) => Self::from_file(&expand_tilde(path))?,
            None => match default_config_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        let mut config = base.apply_env();
        config.apply_cli(cli);
        config.resolve_paths();
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失的键取默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        debug!("已加载配置文件: {}", path.display());
        Ok(config.drop_blank_credentials())
    }

    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    fn apply_env_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let default = self;
        Self {
            username: var("DECODER_USERNAME").or(default.username),
            password: var("DECODER_PASSWORD").or(default.password),
            base_url: var("DECODER_BASE_URL").unwrap_or(default.base_url),
            decoder: var("DECODER_PROFILE").unwrap_or(default.decoder),
            batch_size: var("DECODER_BATCH_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.batch_size),
            log_file: var("DECODER_LOG_FILE").map(PathBuf::from).unwrap_or(default.log_file),
            verbose_logging: var("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
            ..default
        }
    }

    /// 命令行参数覆盖已有配置
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(username) = non_blank(cli.username.as_deref()) {
            self.username = Some(username);
        }
        if let Some(password) = non_blank(cli.password.as_deref()) {
            self.password = Some(password);
        }
        if !cli.source.as_os_str().is_empty() {
            self.source = cli.source.clone();
        }
        if cli.destination.is_some() {
            self.destination = cli.destination.clone();
        }
        if let Some(decoder) = non_blank(cli.decoder.as_deref()) {
            self.decoder = decoder;
        }
        if let Some(base_url) = non_blank(cli.base_url.as_deref()) {
            self.base_url = base_url;
        }
        if let Some(batch_size) = cli.batch_size {
            self.batch_size = batch_size;
        }
        if cli.report.is_some() {
            self.report_file = cli.report.clone();
        }
        self.overwrite |= cli.overwrite;
        self.verbose_logging |= cli.verbose;
    }

    /// 展开 `~` 并补全默认目标目录
    pub fn resolve_paths(&mut self) {
        self.source = expand_tilde(&self.source);
        self.log_file = expand_tilde(&self.log_file);
        self.report_file = self.report_file.as_deref().map(expand_tilde);
        self.destination = Some(match self.destination.as_deref() {
            Some(dest) => expand_tilde(dest),
            None => default_destination(&self.source),
        });
    }

    /// 登录之前的前置检查
    pub fn validate(&self) -> AppResult<()> {
        if self.username.is_none() {
            return Err(AppError::Config(
                "缺少用户名，请在配置文件、DECODER_USERNAME 或 --username 中设置".to_string(),
            ));
        }
        if self.password.is_none() {
            return Err(AppError::Config(
                "缺少密码，请在配置文件、DECODER_PASSWORD 或 --password 中设置".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config("batch_size 必须大于 0".to_string()));
        }
        if self.max_clear_attempts == 0 {
            return Err(AppError::Config("max_clear_attempts 必须大于 0".to_string()));
        }
        if !self.source.is_dir() {
            return Err(AppError::Config(format!(
                "源目录不存在: {}",
                self.source.display()
            )));
        }
        Ok(())
    }

    /// 目标根目录
    pub fn destination_root(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| default_destination(&self.source))
    }

    fn drop_blank_credentials(mut self) -> Self {
        self.username = non_blank(self.username.as_deref());
        self.password = non_blank(self.password.as_deref());
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn default_destination(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "source".to_string());
    PathBuf::from(format!("{}_decoded", name))
}

/// 默认配置文件查找路径
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".decode-mirror.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".decode-mirror.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("decode-mirror").join("config.toml"));
    }
    paths
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
