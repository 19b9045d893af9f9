//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 执行 JS / 上传文件"的能力

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{CmsError, CmsResult};

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 不认识 PackageRecord
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航并等待页面加载
    pub async fn goto(&self, url: &str) -> CmsResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| CmsError::navigation_failed(url, e))?;
        Ok(())
    }

    /// 等待一次页面跳转（例如表单提交）完成
    pub async fn wait_for_navigation(&self) -> CmsResult<()> {
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// 当前页面地址
    pub async fn current_url(&self) -> CmsResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> CmsResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> CmsResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 给 `<input type="file">` 设置本地文件
    pub async fn upload_file(&self, selector: &str, path: &Path) -> CmsResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| CmsError::ElementNotFound {
                selector: selector.to_string(),
            })?;

        let params = SetFileInputFilesParams::builder()
            .file(path.to_string_lossy())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(CmsError::InvalidCommand)?;

        debug!("上传文件 {} → {}", path.display(), selector);
        self.page.execute(params).await?;
        Ok(())
    }
}
