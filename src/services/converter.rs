//! 文档转换服务 - 业务能力层
//!
//! 把 Word 文档转换成 HTML 标记

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::{PackageError, PackageResult};

/// 文档 → 标记文本
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, path: &Path) -> PackageResult<String>;
}

/// 调用 pandoc 转换为 html5
pub struct PandocConverter {
    pandoc_bin: String,
}

impl PandocConverter {
    pub fn new(pandoc_bin: impl Into<String>) -> Self {
        Self {
            pandoc_bin: pandoc_bin.into(),
        }
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn convert(&self, path: &Path) -> PackageResult<String> {
        debug!("pandoc 转换: {}", path.display());

        let output = Command::new(&self.pandoc_bin)
            .arg(path)
            .arg("-t")
            .arg("html5")
            .output()
            .await
            .map_err(|e| {
                error!("无法执行 {}: {}", self.pandoc_bin, e);
                PackageError::Conversion {
                    path: path.to_path_buf(),
                    message: format!("无法执行 {}: {}", self.pandoc_bin, e),
                }
            })?;

        if !output.status.success() {
            return Err(PackageError::Conversion {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| PackageError::Conversion {
            path: path.to_path_buf(),
            message: format!("输出不是有效的 UTF-8: {}", e),
        })
    }
}
