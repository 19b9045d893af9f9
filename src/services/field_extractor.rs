//! 字段提取服务 - 业务能力层
//!
//! 从转换后的 HTML 中提取命名字段。
//!
//! 默认实现约定：文档中每个带 `id` 的标题就是一个字段名（pandoc 会为标题自动生成 id），
//! 该标题到下一个标题之间的纯文本就是字段值。id 中的 `-` 会转换为 `_`，
//! 因此标题 `insp_day` / `Insp Day` 都会得到 `insp_day` 字段。

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::PackageRecord;

/// 标记文本 → 字段
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> PackageRecord;
}

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h[1-6]\b[^>]*\bid\s*=\s*"([^"]+)"[^>]*>.*?</h[1-6]\s*>"#)
        .expect("heading regex")
});
static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|li|div|tr|h[1-6]|blockquote|figcaption)\s*>")
        .expect("block regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n\s*").expect("blank lines regex"));

/// 基于标题 id 的 HTML 字段提取器
#[derive(Debug, Default)]
pub struct HtmlFieldExtractor;

impl FieldExtractor for HtmlFieldExtractor {
    fn extract(&self, markup: &str) -> PackageRecord {
        let headings: Vec<_> = HEADING_RE
            .captures_iter(markup)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let id = caps.get(1)?.as_str();
                Some((normalize_key(id), whole.start(), whole.end()))
            })
            .collect();

        let mut record = PackageRecord::new();
        for (i, (key, _, body_start)) in headings.iter().enumerate() {
            let body_end = headings
                .get(i + 1)
                .map(|(_, next_start, _)| *next_start)
                .unwrap_or(markup.len());
            let value = html_to_text(&markup[*body_start..body_end]);
            debug!("字段 {} = {:?}", key, value);
            record.insert(key.clone(), value);
        }
        record
    }
}

fn normalize_key(id: &str) -> String {
    id.trim().to_lowercase().replace('-', "_")
}

/// 去掉标签，块级元素之间换行，解码常见实体
fn html_to_text(html: &str) -> String {
    let with_breaks = BLOCK_END_RE.replace_all(html, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);
    BLANK_LINES_RE
        .replace_all(decoded.trim(), "\n")
        .into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&amp;", "&")
}
