//! 目录分类服务 - 业务能力层
//!
//! 只负责"遍历目录、判断哪些文件需要远端解码"，不关心上传流程

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Classification, DirectoryClassification, DirectoryMirror};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// 目录分类服务
///
/// 判定规则：
/// - 文件名以指定扩展名结尾，且
/// - 原始字节中包含标记串（逐字节、区分大小写）
///
/// 两者都满足才需要远端解码，其余文件一律原样复制
pub struct TreeClassifier {
    marker: Vec<u8>,
    extension: String,
}

impl TreeClassifier {
    pub fn new(marker: impl Into<Vec<u8>>, extension: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.marker.as_bytes(), config.extension.clone())
    }

    /// 自顶向下列出源树中的所有目录（父目录在前，同级按名称排序）
    ///
    /// 无法读取的目录记录警告后跳过
    ///
    /// # 参数
    /// - `root`: 源根目录
    /// - `skip`: 不进入的目录（目标目录位于源目录之内时使用），
    ///   按规范化后的真实路径比较，相对路径 / `..` 写法不影响结果
    pub fn walk_directories(&self, root: &Path, skip: Option<&Path>) -> Vec<PathBuf> {
        let skip = skip.and_then(|s| s.canonicalize().ok());
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match &skip {
                Some(s) if entry.file_type().is_dir() => {
                    entry.path().canonicalize().map_or(true, |p| &p != s)
                }
                _ => true,
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("⚠️ 无法读取目录项: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect()
    }

    /// 对目录下的直接子文件分类，按文件名排序
    ///
    /// # 参数
    /// - `dir`: 源目录
    ///
    /// # 返回
    /// 返回 (需要解码的文件名, 原样复制的文件名)
    pub async fn classify(&self, dir: &Path) -> AppResult<DirectoryClassification> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| AppError::io(dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::io(dir, e))? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        let mut result = DirectoryClassification::default();
        for name in names {
            // 读不了内容的文件按原样复制处理，复制失败时会被记录
            let class = match self.classify_file(&dir.join(&name)).await {
                Ok(class) => class,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    Classification::CopyVerbatim
                }
            };
            debug!("{} -> {:?}", name, class);
            result.push(name, class);
        }
        Ok(result)
    }

    /// 判断单个文件
    pub async fn classify_file(&self, path: &Path) -> AppResult<Classification> {
        let has_extension = path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(&self.extension))
            .unwrap_or(false);
        if !has_extension {
            return Ok(Classification::CopyVerbatim);
        }

        let content = tokio::fs::read(path).await.map_err(|e| AppError::io(path, e))?;
        Ok(self.classify_content(&content))
    }

    pub fn classify_content(&self, content: &[u8]) -> Classification {
        if contains_marker(content, &self.marker) {
            Classification::NeedsDecode
        } else {
            Classification::CopyVerbatim
        }
    }
}

/// 逐字节子串匹配
pub fn contains_marker(content: &[u8], marker: &[u8]) -> bool {
    if marker.is_empty() {
        return true;
    }
    content.windows(marker.len()).any(|w| w == marker)
}

/// 去掉目标目录中已经存在的文件（不覆盖模式下使重复运行可续跑）
pub fn drop_existing(files: Vec<String>, mirror: &DirectoryMirror) -> Vec<String> {
    files
        .into_iter()
        .filter(|name| {
            let exists = mirror.destination_path(name).exists();
            if exists {
                debug!("{} 已存在, 跳过", mirror.destination_path(name).display());
            }
            !exists
        })
        .collect()
}
