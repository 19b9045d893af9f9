//! 资料包处理上下文
//!
//! 封装"我正在处理第几个资料包、它在哪"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 资料包处理上下文
#[derive(Debug, Clone)]
pub struct PackageCtx {
    /// 资料包索引（从1开始，仅用于日志显示）
    pub package_index: usize,

    /// 压缩包路径
    pub archive_path: PathBuf,

    /// 是否需要开放访问链接
    pub open_access: bool,

    /// 是否为客座编辑
    pub guest_edited: bool,
}

impl PackageCtx {
    /// 创建新的资料包上下文
    pub fn new(
        package_index: usize,
        archive_path: impl Into<PathBuf>,
        open_access: bool,
        guest_edited: bool,
    ) -> Self {
        Self {
            package_index,
            archive_path: archive_path.into(),
            open_access,
            guest_edited,
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// 压缩包文件名
    pub fn name(&self) -> String {
        self.archive_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

impl Display for PackageCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[资料包 #{} {}]", self.package_index, self.name())
    }
}
