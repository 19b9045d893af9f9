//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<压缩包>，持有 CMS 会话)
//!     ↓
//! workflow::PackageFlow (处理单个资料包)
//!     ↓
//! services (能力层：解压 / 转换 / 字段提取 / 日期 / 清理 / 确认)
//!     ↓
//! cms + infrastructure (CMS 会话：JsExecutor)
//! ```

pub mod batch_processor;

pub use batch_processor::{collect_archives, App, BatchDriver, BatchStats};
