use anyhow::Result;
use clap::Parser;

use daily_insp::utils::logging;
use daily_insp::{App, Cli, Config, FailurePolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.keep_going {
        config.failure_policy = FailurePolicy::Continue;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init_log_file(&config.output_log_file)?;
    logging::init(config.verbose_logging, &config.output_log_file)?;

    // 初始化并运行应用
    let _stats = App::initialize(config, &cli).await?.run().await?;

    Ok(())
}
