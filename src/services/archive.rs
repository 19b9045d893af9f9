//! 解压服务 - 业务能力层
//!
//! 负责把资料包解压到同级的临时目录，并在目录中查找文档和图片

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{PackageError, PackageResult};

/// 解压资料包到 `<压缩包所在目录>/<work_dir_name>`
///
/// 如果目标目录已存在且非空，直接复用其中的文件（用于失败后重跑）。
/// 注意这些文件可能是上一次失败留下的旧文件，不会做任何校验。
pub fn extract_zip(archive_path: &Path, work_dir_name: &str) -> PackageResult<PathBuf> {
    let parent = archive_path.parent().unwrap_or_else(|| Path::new("."));
    let work_dir = parent.join(work_dir_name);

    if !is_empty_dir(&work_dir) {
        warn!(
            "⚠️ 工作目录非空，跳过解压并复用已有文件: {}",
            work_dir.display()
        );
        return Ok(work_dir);
    }

    info!("📦 解压 {} → {}", archive_path.display(), work_dir.display());

    let file = File::open(archive_path).map_err(|e| PackageError::archive(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| PackageError::archive(archive_path, e))?;
    archive
        .extract(&work_dir)
        .map_err(|e| PackageError::archive(archive_path, e))?;

    debug!("解压完成，共 {} 个条目", archive.len());
    Ok(work_dir)
}

/// 查找第一个指定扩展名的文档
pub fn find_document(dir: &Path, extension: &str) -> PackageResult<PathBuf> {
    first_with_extension(dir, extension).ok_or_else(|| PackageError::DocumentNotFound {
        dir: dir.to_path_buf(),
        extension: extension.to_string(),
    })
}

/// 按优先级查找图片，前一个扩展名找不到时才尝试下一个
pub fn find_image(dir: &Path, extensions: &[String]) -> PackageResult<PathBuf> {
    extensions
        .iter()
        .find_map(|ext| first_with_extension(dir, ext))
        .ok_or_else(|| PackageError::ImageNotFound {
            dir: dir.to_path_buf(),
            extensions: extensions.join("/"),
        })
}

/// 目录不存在也视为空
fn is_empty_dir(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

/// 按文件名排序后取第一个匹配项，保证结果稳定
fn first_with_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(extension))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}
