use anyhow::Result;
use clap::Parser;
use decode_mirror::utils::logging;
use decode_mirror::{App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(&cli)?;

    // 初始化日志
    logging::init(&config.log_file, config.verbose_logging)?;

    // 登录并运行
    let app = App::initialize(config).await?;
    app.run().await?;

    Ok(())
}
