//! 批量资料包处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量资料包的处理和会话管理。
//!
//! ## 核心功能
//!
//! 1. **会话管理**：整个批次只登录一次，无论成功失败都在最后关闭一次会话
//! 2. **批量加载**：输入是目录时按文件名顺序处理其中所有压缩包（不递归），是文件时只处理它
//! 3. **顺序处理**：一次只处理一个资料包，委托 `PackageFlow`
//! 4. **失败策略**：单个资料包出错时按 `FailurePolicy` 中止或继续
//! 5. **全局统计**：汇总所有资料包的处理结果

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::cms::{CmsBot, CmsSession};
use crate::config::{Config, FailurePolicy};
use crate::utils::logging;
use crate::workflow::{PackageCtx, PackageFlow, PackageOutcome};

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub published: usize,
    pub no_live_date: usize,
    pub not_saved: usize,
    pub failed: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: &PackageOutcome) {
        match outcome {
            PackageOutcome::Published { .. } => self.published += 1,
            PackageOutcome::NoLiveDate { .. } => self.no_live_date += 1,
            PackageOutcome::NotSaved { .. } => self.not_saved += 1,
        }
    }
}

/// 批处理驱动
///
/// 持有整个批次唯一的 CMS 会话
pub struct BatchDriver<S: CmsSession> {
    session: S,
    flow: PackageFlow,
    policy: FailurePolicy,
    archive_extension: String,
    open_access: bool,
    guest_edited: bool,
}

impl<S: CmsSession> BatchDriver<S> {
    pub fn new(
        session: S,
        flow: PackageFlow,
        config: &Config,
        open_access: bool,
        guest_edited: bool,
    ) -> Self {
        Self {
            session,
            flow,
            policy: config.failure_policy,
            archive_extension: config.archive_extension.clone(),
            open_access,
            guest_edited,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// 登录 → 处理全部资料包 → 关闭会话
    ///
    /// 会话关闭恰好执行一次，登录失败或批次中止时也不例外
    pub async fn run(&mut self, input: &Path) -> Result<BatchStats> {
        let result = self.process_input(input).await;

        if let Err(e) = &result {
            println!("{}", style("\tError while running cms").red());
            error!("❌ 批处理中止: {:#}", e);
        }

        println!("Quit browser.");
        let quit_result = self.session.quit().await;

        match (result, quit_result) {
            (Ok(stats), Ok(())) => Ok(stats),
            (Ok(_), Err(e)) => Err(e).context("关闭 CMS 会话失败"),
            (Err(e), quit_result) => {
                if let Err(quit_err) = quit_result {
                    warn!("⚠️ 关闭 CMS 会话失败: {}", quit_err);
                }
                Err(e)
            }
        }
    }

    async fn process_input(&self, input: &Path) -> Result<BatchStats> {
        self.session.login().await.context("CMS 登录失败")?;

        let archives = if input.is_dir() {
            collect_archives(input, &self.archive_extension)?
        } else if input.is_file() {
            vec![input.to_path_buf()]
        } else {
            println!("Input must be a folder or a zip file.");
            return Ok(BatchStats::default());
        };

        let mut stats = BatchStats {
            total: archives.len(),
            ..Default::default()
        };
        info!("✓ 找到 {} 个待处理的资料包", stats.total);

        for (idx, archive) in archives.iter().enumerate() {
            println!("{}", archive.display());
            let ctx = PackageCtx::new(idx + 1, archive, self.open_access, self.guest_edited);

            match self.flow.run(&self.session, &ctx).await {
                Ok(outcome) => stats.record(&outcome),
                Err(e) => {
                    stats.failed += 1;
                    error!("{} ❌ 处理过程中发生错误: {:#}", ctx, e);
                    match self.policy {
                        FailurePolicy::Abort => {
                            return Err(e.context(format!("{} 处理失败", ctx)));
                        }
                        FailurePolicy::Continue => {
                            println!("\t{} {}", style("Skipped:").red(), ctx.name());
                        }
                    }
                }
            }
        }

        Ok(stats)
    }
}

/// 目录下所有指定扩展名的文件（不递归），按文件名排序
pub fn collect_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("无法读取文件夹: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(extension))
        })
        .collect();
    archives.sort();
    Ok(archives)
}

/// 应用主结构
pub struct App {
    config: Config,
    input: PathBuf,
    driver: BatchDriver<CmsBot>,
}

impl App {
    /// 初始化应用：连接浏览器并创建 CMS 会话
    pub async fn initialize(config: Config, cli: &Cli) -> Result<Self> {
        logging::print_banner(&cli.infile, cli.access, cli.guest);
        logging::log_startup(&config);

        let bot = CmsBot::connect(&config, cli.access, cli.guest)
            .await
            .context("无法创建 CMS 会话")?;
        let flow = PackageFlow::new(&config);
        let driver = BatchDriver::new(bot, flow, &config, cli.access, cli.guest);

        Ok(Self {
            config,
            input: cli.infile.clone(),
            driver,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<BatchStats> {
        let stats = self.driver.run(&self.input).await?;
        logging::print_final_stats(&stats, &self.config.output_log_file);
        Ok(stats)
    }
}
