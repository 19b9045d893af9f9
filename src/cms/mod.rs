//! CMS 会话
//!
//! `CmsSession` 是流程层依赖的能力集合，整个批次共用一个会话。
//! 默认实现 `CmsBot` 通过 chromiumoxide 操作浏览器中的 CMS 后台。

pub mod cms_bot;

use async_trait::async_trait;

use crate::error::CmsResult;
use crate::models::PackageRecord;

pub use cms_bot::CmsBot;

/// CMS 会话能力
#[async_trait]
pub trait CmsSession: Send + Sync {
    /// 登录（整个批次只调用一次）
    async fn login(&self) -> CmsResult<()>;

    /// 提交 inspiration 记录，返回是否保存成功
    async fn inspiration_details(&self, record: &PackageRecord) -> CmsResult<bool>;

    /// 刚保存的记录的公开地址
    async fn get_url(&self) -> CmsResult<String>;

    /// 提交 campaign 信息
    async fn campaign_details(&self, record: &PackageRecord) -> CmsResult<()>;

    /// 结束会话
    async fn quit(&mut self) -> CmsResult<()>;
}
