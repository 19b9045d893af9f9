//! 清理服务 - 业务能力层
//!
//! 删除工作目录下的所有文件，再删除目录本身。不递归。

use std::fs;
use std::path::Path;

use console::style;
use tracing::debug;

use crate::error::{PackageError, PackageResult};

/// 清理工作目录
///
/// 工作目录由解压直接填充，只包含文件。遇到子目录时最终的 `remove_dir` 会失败并返回错误。
pub fn run_cleanup(dir: &Path) -> PackageResult<()> {
    let cleanup_err = |source| PackageError::Cleanup {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(cleanup_err)? {
        let path = entry.map_err(cleanup_err)?.path();
        if path.is_dir() {
            debug!("跳过子目录: {}", path.display());
            continue;
        }
        fs::remove_file(&path).map_err(cleanup_err)?;
        println!("\tRemoved files: {}", style(path.display()).cyan());
    }

    fs::remove_dir(dir).map_err(cleanup_err)?;
    println!("\tRemoved temp dir: {}", style(dir.display()).cyan());

    Ok(())
}
