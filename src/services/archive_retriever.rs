//! 解码结果下载服务 - 业务能力层
//!
//! 远端会累积所有已解码但未清理的文件，下载接口一次性打包返回全部，
//! 而不仅是当前批次

use crate::error::{AppError, AppResult};
use crate::infrastructure::remote_session::endpoints;
use crate::infrastructure::RemoteSession;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 远端在每个解码文件中插入的注释横幅
pub const BANNER: &str = "
/*
 * @ https://EasyToYou.eu - IonCube v10 Decoder Online
 * @ PHP 7.2
 * @ Decoder version: 1.0.4
 * @ Release: 01/09/2021
 */
";

/// 压缩包中的一个解码文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// 去掉目录部分后的文件名
    pub file_name: String,
    pub text: String,
}

/// 解码结果下载服务
pub struct ArchiveRetriever {
    banner: String,
}

impl Default for ArchiveRetriever {
    fn default() -> Self {
        Self::new(BANNER)
    }
}

impl ArchiveRetriever {
    pub fn new(banner: impl Into<String>) -> Self {
        Self { banner: banner.into() }
    }

    /// 下载并写入目标目录
    ///
    /// # 返回
    /// 返回本次实际写入的文件路径；任何一步失败都返回 `None`，
    /// 由调用方把文件记为未解码
    pub async fn retrieve(
        &self,
        session: &RemoteSession,
        destination: &Path,
    ) -> Option<Vec<PathBuf>> {
        match self.fetch_into(session, destination).await {
            Ok(written) => {
                info!("✓ 已写入 {} 个解码文件", written.len());
                Some(written)
            }
            Err(e) => {
                error!("❌ 下载解码结果失败: {}", e);
                None
            }
        }
    }

    /// 下载、解压并写入，返回写入的文件路径
    pub async fn fetch_into(
        &self,
        session: &RemoteSession,
        destination: &Path,
    ) -> AppResult<Vec<PathBuf>> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| AppError::io(destination, e))?;

        let bytes = session.get_bytes(endpoints::DOWNLOAD_ALL).await?;
        let entries = self.extract(&bytes)?;
        write_entries(&entries, destination).await
    }

    /// 解压全部条目并去掉横幅；全部成功才返回
    pub fn extract(&self, bytes: &[u8]) -> AppResult<Vec<DecodedEntry>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let Some(file_name) = Path::new(&name)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
            else {
                warn!("⚠️ 跳过无文件名的条目: {}", name);
                continue;
            };

            let mut text = String::new();
            file.read_to_string(&mut text)
                .map_err(|e| AppError::archive(format!("{} 无法按 UTF-8 读取: {}", name, e)))?;

            entries.push(DecodedEntry {
                file_name,
                text: strip_banner(&text, &self.banner),
            });
        }
        Ok(entries)
    }
}

/// 把横幅原文替换为一个换行
pub fn strip_banner(text: &str, banner: &str) -> String {
    if banner.is_empty() {
        return text.to_string();
    }
    text.replace(banner, "\n")
}

async fn write_entries(entries: &[DecodedEntry], destination: &Path) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = destination.join(&entry.file_name);
        tokio::fs::write(&path, entry.text.as_bytes())
            .await
            .map_err(|e| AppError::io(&path, e))?;
        info!("wrote {} bytes to {}", entry.text.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
