//! 上线日期解析 - 业务能力层
//!
//! 把 `"Day 15"` 这类描述解析成今天之后最近的、日期号等于 15 的那一天。
//!
//! 按天向后扫描（而不是按月计算），因此某个月不存在的日期号（例如 30 天月份的 31 号）
//! 会自然顺延到下一个存在该日期号的月份。

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

/// 最长扫描天数
///
/// 同一个日期号两次出现之间最长的间隔是 1 月 31 日到 3 月 31 日（60 天）
pub const MAX_SCAN_DAYS: u64 = 62;

/// 查找 `reference` 之后最近的、日期号等于 `day_of_month` 的日期
///
/// 从 `reference + 1` 天开始，永远不会返回 `reference` 本身。
/// `day_of_month` 不在 1..=31 范围内时返回 `None`。
pub fn resolve(reference: NaiveDate, day_of_month: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&day_of_month) {
        return None;
    }

    (1..=MAX_SCAN_DAYS)
        .filter_map(|offset| reference.checked_add_days(Days::new(offset)))
        .find(|candidate| candidate.day() == day_of_month)
}

/// 解析 `"<label> <N>"` 形式的文本并计算上线日期
///
/// 任何解析或计算失败都返回 `None`，并记录日志供操作人员排查
pub fn get_live_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let label = title_case(text.trim());
    let Some(requested) = parse_day(&label) else {
        warn!("无法解析日期描述: {:?}", text);
        return None;
    };

    let Some(found) = resolve(today, requested) else {
        warn!("{} 无法匹配任何日期 (基准: {})", label, today.format("%d-%m-%Y"));
        return None;
    };
    debug!("{} → {}", label, found.format("%d-%m-%Y"));

    if found.day() == requested {
        Some(found)
    } else {
        warn!("{} 匹配失败: {}", label, found.format("%d-%m-%Y"));
        None
    }
}

/// 以本地时间的今天为基准计算上线日期
pub fn live_date_from_text(text: &str) -> Option<NaiveDate> {
    get_live_date(text, chrono::Local::now().date_naive())
}

/// 取第二个词作为日期号
fn parse_day(label: &str) -> Option<u32> {
    label.split_whitespace().nth(1)?.parse().ok()
}

/// 每个单词首字母大写，其余小写
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
