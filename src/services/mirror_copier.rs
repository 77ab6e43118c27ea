//! 原样复制服务 - 业务能力层
//!
//! 不需要解码的文件直接复制到镜像目录

use crate::models::DirectoryMirror;
use std::path::PathBuf;
use tracing::{error, info};

/// 复制结果
#[derive(Debug, Default)]
pub struct CopyResult {
    pub copied: usize,
    /// 复制失败的源文件
    pub failed: Vec<PathBuf>,
}

/// 逐个复制文件（目标已存在时覆盖）
///
/// # 参数
/// - `mirror`: 源目录与目标目录
/// - `files`: 文件名
pub async fn copy_files(mirror: &DirectoryMirror, files: &[String]) -> CopyResult {
    let mut result = CopyResult::default();
    for name in files {
        let src = mirror.source_path(name);
        let dest = mirror.destination_path(name);
        match tokio::fs::copy(&src, &dest).await {
            Ok(_) => {
                info!("copied {} to {}", name, dest.display());
                result.copied += 1;
            }
            Err(e) => {
                error!("❌ 复制失败 {}: {}", src.display(), e);
                result.failed.push(src);
            }
        }
    }
    result
}
