//! 命令行参数
//!
//! 所有参数都是可选覆盖项，最终由 `Config::load` 合并

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "decode-mirror")]
#[command(about = "通过远端解码服务批量解码目录树，并镜像到目标目录")]
#[command(version)]
pub struct Cli {
    /// 远端服务用户名
    #[arg(short, long)]
    pub username: Option<String>,

    /// 远端服务密码
    #[arg(short, long)]
    pub password: Option<String>,

    /// 源目录
    #[arg(short, long)]
    pub source: PathBuf,

    /// 目标目录（默认: <源目录名>_decoded）
    #[arg(short = 'o', long)]
    pub destination: Option<PathBuf>,

    /// 解码器配置名（默认: ic10php72）
    #[arg(short, long)]
    pub decoder: Option<String>,

    /// 覆盖目标目录中已存在的文件
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// 每批上传的文件数
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// 远端服务地址
    #[arg(long)]
    pub base_url: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 运行结束后写入 JSON 报告
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long)]
    pub verbose: bool,
}
