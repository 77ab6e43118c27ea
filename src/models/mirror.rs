//! 源目录与目标目录的对应关系

use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// 一个源目录及其在目标根目录下的镜像目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMirror {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl DirectoryMirror {
    /// 按相对路径计算镜像目录
    ///
    /// # 参数
    /// - `source_root`: 源根目录
    /// - `destination_root`: 目标根目录
    /// - `dir`: 正在访问的源目录（位于 `source_root` 之下）
    pub fn new(source_root: &Path, destination_root: &Path, dir: &Path) -> Self {
        let relative = dir.strip_prefix(source_root).unwrap_or(Path::new(""));
        Self {
            source: dir.to_path_buf(),
            destination: destination_root.join(relative),
        }
    }

    /// 目标目录不存在时创建
    pub fn ensure_destination(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.destination).map_err(|e| AppError::io(&self.destination, e))
    }

    pub fn source_path(&self, name: &str) -> PathBuf {
        self.source.join(name)
    }

    pub fn destination_path(&self, name: &str) -> PathBuf {
        self.destination.join(name)
    }
}
