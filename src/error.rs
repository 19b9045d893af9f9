use std::path::PathBuf;

use thiserror::Error;

/// 单个资料包处理错误
///
/// 这些错误都会中止当前资料包，且不会清理工作目录
#[derive(Debug, Error)]
pub enum PackageError {
    /// 解压失败
    #[error("解压失败 ({path}): {source}")]
    Archive {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 工作目录中没有文档
    #[error("未找到 .{extension} 文档: {dir}")]
    DocumentNotFound { dir: PathBuf, extension: String },

    /// 文档转换失败
    #[error("文档转换失败 ({path}): {message}")]
    Conversion { path: PathBuf, message: String },

    /// 工作目录中没有图片
    #[error("未找到图片 ({extensions}): {dir}")]
    ImageNotFound { dir: PathBuf, extensions: String },

    /// 清理工作目录失败
    #[error("清理失败 ({path}): {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CMS 调用失败
    #[error(transparent)]
    Cms(#[from] CmsError),
}

/// CMS 会话错误
#[derive(Debug, Error)]
pub enum CmsError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),

    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptExecutionFailed(#[from] chromiumoxide::error::CdpError),

    /// 页面元素不存在
    #[error("页面元素不存在: {selector}")]
    ElementNotFound { selector: String },

    /// 构建浏览器命令失败
    #[error("构建浏览器命令失败: {0}")]
    InvalidCommand(String),

    /// 登录失败
    #[error("登录失败: {0}")]
    LoginFailed(String),

    /// 返回数据无法解析
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl PackageError {
    /// 创建解压错误
    pub fn archive(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PackageError::Archive {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl CmsError {
    /// 创建浏览器连接错误
    pub fn connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CmsError::ConnectionFailed {
            port,
            source: Box::new(source),
        }
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CmsError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 资料包处理结果类型
pub type PackageResult<T> = Result<T, PackageError>;

/// CMS 调用结果类型
pub type CmsResult<T> = Result<T, CmsError>;
