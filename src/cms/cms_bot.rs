//! CMS 浏览器客户端
//!
//! 在浏览器中打开 CMS 后台表单，用 JS 填写字段并提交

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::Browser;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::browser;
use crate::cms::CmsSession;
use crate::config::Config;
use crate::error::{CmsError, CmsResult};
use crate::infrastructure::JsExecutor;
use crate::models::record::IMG_PATH;
use crate::models::PackageRecord;

const IMAGE_INPUT: &str = r#"input[type="file"]"#;
const OPEN_ACCESS_FIELD: &str = "open_access";
const GUEST_EDITED_FIELD: &str = "guest_edited";

/// 表单提交结果
#[derive(Debug, Deserialize)]
struct SubmitResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<String>,
}

/// CMS 浏览器客户端
pub struct CmsBot {
    browser: Browser,
    executor: JsExecutor,
    config: Config,
    open_access: bool,
    guest_edited: bool,
}

impl CmsBot {
    /// 连接（或启动）浏览器并打开 CMS 登录页
    pub async fn connect(config: &Config, open_access: bool, guest_edited: bool) -> CmsResult<Self> {
        let login_url = config.cms_url(&config.cms_login_path);

        let (browser, page) = if config.headless {
            let executable = config.chrome_executable.as_deref().map(Path::new);
            browser::launch_headless_browser(&login_url, executable).await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.cms_base_url),
            )
            .await?
        };

        Ok(Self {
            browser,
            executor: JsExecutor::new(page),
            config: config.clone(),
            open_access,
            guest_edited,
        })
    }

    /// 填写当前页面的表单并提交，等待跳转后读取结果
    async fn fill_and_submit(&self, record: &PackageRecord) -> CmsResult<SubmitResult> {
        let mut values = serde_json::to_value(record)?;
        values[OPEN_ACCESS_FIELD] = json!(self.open_access);
        values[GUEST_EDITED_FIELD] = json!(self.guest_edited);

        let filled: usize = self.executor.eval_as(build_fill_script(&values)).await?;
        debug!("已填写 {} 个表单字段", filled);

        if let Some(img_path) = record.get(IMG_PATH) {
            if let Err(e) = self.executor.upload_file(IMAGE_INPUT, Path::new(img_path)).await {
                warn!("⚠️ 图片上传失败: {}", e);
            }
        }

        self.executor.eval(SUBMIT_SCRIPT).await?;
        self.executor.wait_for_navigation().await?;

        self.executor.eval_as(RESULT_SCRIPT).await
    }
}

#[async_trait]
impl CmsSession for CmsBot {
    async fn login(&self) -> CmsResult<()> {
        let login_url = self.config.cms_url(&self.config.cms_login_path);
        self.executor.goto(&login_url).await?;

        // 已登录时后台会直接跳走
        if !self.executor.current_url().await?.contains(&self.config.cms_login_path) {
            info!("✓ CMS 已处于登录状态");
            return Ok(());
        }

        if self.config.cms_username.is_empty() || self.config.cms_password.is_empty() {
            return Err(CmsError::LoginFailed(
                "未配置 CMS_USERNAME / CMS_PASSWORD".to_string(),
            ));
        }

        info!("🔑 正在登录 CMS: {}", self.config.cms_username);
        let credentials = json!({
            "username": self.config.cms_username,
            "password": self.config.cms_password,
        });
        self.executor.eval(build_fill_script(&credentials)).await?;
        self.executor.eval(SUBMIT_SCRIPT).await?;
        self.executor.wait_for_navigation().await?;

        let url = self.executor.current_url().await?;
        if url.contains(&self.config.cms_login_path) {
            return Err(CmsError::LoginFailed(format!("仍停留在登录页: {}", url)));
        }

        info!("✓ CMS 登录成功");
        Ok(())
    }

    async fn inspiration_details(&self, record: &PackageRecord) -> CmsResult<bool> {
        let url = self.config.cms_url(&self.config.cms_inspiration_path);
        info!("📤 正在提交 inspiration: {}", url);
        self.executor.goto(&url).await?;

        let result = self.fill_and_submit(record).await?;
        if !result.success {
            warn!("⚠️ inspiration 保存失败: {:?}", result.errors);
        }
        Ok(result.success)
    }

    async fn get_url(&self) -> CmsResult<String> {
        let url: Option<String> = self.executor.eval_as(PUBLIC_URL_SCRIPT).await?;
        match url {
            Some(url) => Ok(url),
            None => self.executor.current_url().await,
        }
    }

    async fn campaign_details(&self, record: &PackageRecord) -> CmsResult<()> {
        let url = self.config.cms_url(&self.config.cms_campaign_path);
        info!("📤 正在提交 campaign: {}", url);
        self.executor.goto(&url).await?;

        let result = self.fill_and_submit(record).await?;
        if !result.success {
            warn!("⚠️ campaign 保存失败: {:?}", result.errors);
        }
        Ok(())
    }

    async fn quit(&mut self) -> CmsResult<()> {
        info!("关闭 CMS 会话");
        if self.config.headless {
            self.browser.close().await?;
            self.browser.wait().await.ok();
        } else {
            // 连接的是操作人员自己的浏览器，只关闭本程序打开的页面
            self.executor.page().clone().close().await?;
        }
        Ok(())
    }
}

// ========== 页面脚本 ==========

/// 按 name 填写表单字段，返回填写成功的数量
fn build_fill_script(values: &serde_json::Value) -> String {
    format!(
        r#"
        (() => {{
            const values = {};
            let filled = 0;
            for (const [name, value] of Object.entries(values)) {{
                const el = document.querySelector(`[name="${{CSS.escape(name)}}"]`);
                if (!el || el.type === 'file') continue;
                if (el.type === 'checkbox') {{
                    el.checked = value === true || value === 'true';
                }} else {{
                    el.value = String(value);
                }}
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                filled += 1;
            }}
            return filled;
        }})()
        "#,
        values
    )
}

const SUBMIT_SCRIPT: &str = r#"
    (() => {
        const button = document.querySelector('form [type="submit"][name="_save"], form [type="submit"]');
        if (button) { button.click(); return true; }
        const form = document.querySelector('form');
        if (form) { form.submit(); return true; }
        return false;
    })()
"#;

const RESULT_SCRIPT: &str = r#"
    (() => {
        const errors = Array.from(document.querySelectorAll('.errorlist li, .errornote, .alert-danger'))
            .map(el => el.textContent.trim());
        const success = errors.length === 0
            && !!document.querySelector('.messagelist .success, .alert-success');
        return { success, errors };
    })()
"#;

const PUBLIC_URL_SCRIPT: &str = r#"
    (() => {
        const link = document.querySelector('.messagelist .success a, a.viewsitelink, a[data-public-url]');
        return link ? link.href : null;
    })()
"#;
