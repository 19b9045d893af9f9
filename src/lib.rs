//! # Daily Insp
//!
//! 把每日灵感资料包（压缩包：一份 docx 文档 + 一张配图）上传到 CMS 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / goto() / upload_file() 能力
//! - `cms/` - `CmsSession` 接口及基于浏览器的实现 `CmsBot`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个资料包
//! - `archive` - 解压、查找文档和配图
//! - `converter` - 文档转 HTML（pandoc）
//! - `field_extractor` - 从 HTML 中提取字段记录
//! - `live_date` - 上线日期解析
//! - `cleanup` - 清理工作目录
//! - `confirmation` - 人工确认
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个资料包"的完整处理流程
//! - `PackageCtx` - 上下文封装（序号 + 压缩包路径 + 标记）
//! - `PackageFlow` - 流程编排（解压 → 转换 → 提取 → 日期 → 提交 → 清理）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理驱动，持有 CMS 会话并执行失败策略
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod cms;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use cli::Cli;
pub use cms::{CmsBot, CmsSession};
pub use config::{Config, FailurePolicy};
pub use error::{CmsError, ConfigError, PackageError};
pub use infrastructure::JsExecutor;
pub use models::PackageRecord;
pub use orchestrator::{App, BatchDriver, BatchStats};
pub use workflow::{PackageCtx, PackageFlow, PackageOutcome};
