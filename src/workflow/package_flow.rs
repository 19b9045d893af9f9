//! 资料包处理流程 - 流程层
//!
//! 核心职责：定义"一个资料包"的完整处理流程
//!
//! 流程顺序（严格按序）：
//! 1. 解压 → 工作目录
//! 2. 查找文档并转换为 HTML（失败即中止，不清理）
//! 3. 提取字段
//! 4. 查找图片（jpg 优先，其次 png；都没有则中止，不清理）
//! 5. 解析上线日期（失败则结束本包，不提交、不清理）
//! 6. 提交 inspiration
//! 7. 成功：获取地址 → 提交 campaign → 等待人工确认 → 清理
//! 8. 失败：结束本包，不清理
//!
//! 只有提交成功的路径会清理工作目录，其余路径都保留现场供人工检查。

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use console::style;
use tracing::{error, info, warn};

use crate::cms::CmsSession;
use crate::config::Config;
use crate::error::PackageError;
use crate::services::archive::{extract_zip, find_document, find_image};
use crate::services::cleanup::run_cleanup;
use crate::services::live_date::{get_live_date, live_date_from_text};
use crate::services::{
    Confirmation, DocumentConverter, FieldExtractor, HtmlFieldExtractor, PandocConverter,
    TerminalConfirmation,
};
use crate::workflow::package_ctx::PackageCtx;

/// 人工确认提示语
pub const CONFIRM_PROMPT: &str = "Finished?";

/// 资料包处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// 提交成功并已清理
    Published { live_date: NaiveDate, url: String },
    /// 无法解析上线日期，未提交
    NoLiveDate { requested: String },
    /// CMS 未保存
    NotSaved { live_date: NaiveDate },
}

impl PackageOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PackageOutcome::Published { .. })
    }
}

/// 资料包处理流程
///
/// - 编排单个资料包的完整处理流程
/// - 不持有 CMS 会话，由调用方传入
/// - 转换器、字段提取器、人工确认都可以替换
pub struct PackageFlow {
    converter: Box<dyn DocumentConverter>,
    extractor: Box<dyn FieldExtractor>,
    confirmation: Box<dyn Confirmation>,
    work_dir_name: String,
    document_extension: String,
    image_extensions: Vec<String>,
    reference_date: Option<NaiveDate>,
}

impl PackageFlow {
    /// 使用 pandoc + HTML 提取 + 终端确认创建流程
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config,
            Box::new(PandocConverter::new(&config.pandoc_bin)),
            Box::new(HtmlFieldExtractor),
            Box::new(TerminalConfirmation),
        )
    }

    /// 使用自定义组件创建流程
    pub fn with_parts(
        config: &Config,
        converter: Box<dyn DocumentConverter>,
        extractor: Box<dyn FieldExtractor>,
        confirmation: Box<dyn Confirmation>,
    ) -> Self {
        Self {
            converter,
            extractor,
            confirmation,
            work_dir_name: config.work_dir_name.clone(),
            document_extension: config.document_extension.clone(),
            image_extensions: config.image_extensions.clone(),
            reference_date: None,
        }
    }

    /// 固定计算上线日期的基准日（默认取运行时的本地日期）
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub async fn run<S>(&self, session: &S, ctx: &PackageCtx) -> Result<PackageOutcome>
    where
        S: CmsSession + ?Sized,
    {
        log_package_start(ctx);

        // ========== 1. 解压 ==========
        let work_dir = extract_zip(ctx.archive_path(), &self.work_dir_name)?;

        // ========== 2. 转换文档 ==========
        let document = find_document(&work_dir, &self.document_extension)?;
        let markup = match self.converter.convert(&document).await {
            Ok(markup) => markup,
            Err(e) => {
                println!("{}", conversion_failure_line(&document));
                error!("{} ❌ 文档转换失败: {}", ctx, e);
                return Err(e.into());
            }
        };

        // ========== 3. 提取字段 ==========
        let mut record = self.extractor.extract(&markup);
        info!("{} ✓ 提取到 {} 个字段", ctx, record.len());

        // ========== 4. 查找图片 ==========
        let image = find_image(&work_dir, &self.image_extensions)?;
        record.set_image_path(&image);

        // ========== 5. 上线日期 ==========
        let requested = record.insp_day().unwrap_or_default().to_string();
        let resolved = match self.reference_date {
            Some(today) => get_live_date(&requested, today),
            None => live_date_from_text(&requested),
        };

        let Some(live_date) = resolved else {
            println!("\tNo live date: {}", style("Exit").red());
            warn!(
                "{} ⚠️ 无法解析上线日期 {:?}，保留工作目录: {}",
                ctx,
                requested,
                work_dir.display()
            );
            return Ok(PackageOutcome::NoLiveDate { requested });
        };
        info!(
            "{} ✓ 上线日期: {} → {}",
            ctx,
            requested,
            live_date.format("%d-%m-%Y")
        );
        record.apply_live_date(live_date);

        // ========== 6. 提交 ==========
        let saved = session
            .inspiration_details(&record)
            .await
            .map_err(PackageError::from)?;

        if !saved {
            println!("Inspiration not saved");
            warn!(
                "{} ⚠️ CMS 未保存，保留工作目录: {}",
                ctx,
                work_dir.display()
            );
            return Ok(PackageOutcome::NotSaved { live_date });
        }

        // ========== 7. 成功路径 ==========
        let url = session.get_url().await.map_err(PackageError::from)?;
        session
            .campaign_details(&record)
            .await
            .map_err(PackageError::from)?;
        println!("{}", style("\tFinished correctly").green());

        self.confirmation.confirm(CONFIRM_PROMPT).await?;
        println!("Resolved url: {}", style(&url).yellow());

        // ========== 8. 清理 ==========
        run_cleanup(&work_dir)?;
        log_package_complete(ctx);

        Ok(PackageOutcome::Published { live_date, url })
    }
}

// ========== 日志辅助函数 ==========

fn conversion_failure_line(document: &Path) -> String {
    format!(
        "\t{} {}",
        style("problem converting file:").red(),
        document.display()
    )
}

fn log_package_start(ctx: &PackageCtx) {
    info!("{} 开始处理", ctx);
    info!("{} 路径: {}", ctx, ctx.archive_path().display());
    info!(
        "{} 开放访问: {} | 客座编辑: {}",
        ctx, ctx.open_access, ctx.guest_edited
    );
}

fn log_package_complete(ctx: &PackageCtx) {
    info!("{} ✅ 资料包处理完成\n", ctx);
}
