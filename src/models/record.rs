use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// 日期字段名
pub const INSP_DAY: &str = "insp_day";
pub const LIVE_DAY: &str = "live_day";
pub const LIVE_MONTH: &str = "live_month";
pub const LIVE_YEAR: &str = "live_year";
/// 图片路径字段名
pub const IMG_PATH: &str = "img_path";

/// 资料包记录
///
/// 由字段提取器填充，之后补上上线日期和图片路径，最终整体提交给 CMS。
/// 只在一次处理中存在，不做持久化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageRecord {
    fields: BTreeMap<String, String>,
}

impl PackageRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// 原始的日期描述，例如 `"Day 15"`
    pub fn insp_day(&self) -> Option<&str> {
        self.get(INSP_DAY)
    }

    pub fn set_image_path(&mut self, path: &Path) {
        self.insert(IMG_PATH, path.to_string_lossy());
    }

    /// 写入 live_day / live_month / live_year
    pub fn apply_live_date(&mut self, date: NaiveDate) {
        self.insert(LIVE_DAY, date.day().to_string());
        self.insert(LIVE_MONTH, date.month().to_string());
        self.insert(LIVE_YEAR, date.year().to_string());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
