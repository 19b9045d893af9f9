use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 批处理中单个资料包出错时的策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 立即中止整个批次（默认）
    #[default]
    Abort,
    /// 记录错误后继续处理下一个资料包
    Continue,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(format!("未知的失败策略: {}", other)),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 是否自行启动无头浏览器（否则连接已打开的调试端口）
    pub headless: bool,
    /// 无头模式下的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// CMS 根地址
    pub cms_base_url: String,
    /// 登录页路径
    pub cms_login_path: String,
    /// 新建 inspiration 页路径
    pub cms_inspiration_path: String,
    /// 新建 campaign 页路径
    pub cms_campaign_path: String,
    pub cms_username: String,
    pub cms_password: String,
    /// pandoc 可执行文件
    pub pandoc_bin: String,
    /// 解压目录名（位于压缩包同级）
    pub work_dir_name: String,
    /// 文档扩展名
    pub document_extension: String,
    /// 图片扩展名，按优先级排列
    pub image_extensions: Vec<String>,
    /// 压缩包扩展名
    pub archive_extension: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 单个资料包出错时的策略
    pub failure_policy: FailurePolicy,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            headless: false,
            chrome_executable: None,
            cms_base_url: "http://localhost:8000".to_string(),
            cms_login_path: "/admin/login/".to_string(),
            cms_inspiration_path: "/admin/inspiration/add/".to_string(),
            cms_campaign_path: "/admin/campaign/add/".to_string(),
            cms_username: String::new(),
            cms_password: String::new(),
            pandoc_bin: "pandoc".to_string(),
            work_dir_name: "tmp".to_string(),
            document_extension: "docx".to_string(),
            image_extensions: vec!["jpg".to_string(), "png".to_string()],
            archive_extension: "zip".to_string(),
            output_log_file: "output.txt".to_string(),
            failure_policy: FailurePolicy::Abort,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 读取可选的 TOML 配置文件，再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 仅从环境变量读取（其余使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "u16")?
                .unwrap_or(self.browser_debug_port),
            headless: env_parse("HEADLESS", "bool")?.unwrap_or(self.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE")
                .ok()
                .or(self.chrome_executable),
            cms_base_url: std::env::var("CMS_BASE_URL").unwrap_or(self.cms_base_url),
            cms_login_path: std::env::var("CMS_LOGIN_PATH").unwrap_or(self.cms_login_path),
            cms_inspiration_path: std::env::var("CMS_INSPIRATION_PATH")
                .unwrap_or(self.cms_inspiration_path),
            cms_campaign_path: std::env::var("CMS_CAMPAIGN_PATH")
                .unwrap_or(self.cms_campaign_path),
            cms_username: std::env::var("CMS_USERNAME").unwrap_or(self.cms_username),
            cms_password: std::env::var("CMS_PASSWORD").unwrap_or(self.cms_password),
            pandoc_bin: std::env::var("PANDOC_BIN").unwrap_or(self.pandoc_bin),
            work_dir_name: std::env::var("WORK_DIR_NAME").unwrap_or(self.work_dir_name),
            document_extension: self.document_extension,
            image_extensions: self.image_extensions,
            archive_extension: self.archive_extension,
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            failure_policy: env_parse("FAILURE_POLICY", "abort|continue")?
                .unwrap_or(self.failure_policy),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    /// 拼接 CMS 页面地址
    pub fn cms_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.cms_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
