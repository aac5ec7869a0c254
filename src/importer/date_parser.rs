// ==========================================
// 零售销售数据导入 - 日期解析
// ==========================================
// 格式: DD/MM/YYYY（日/月 1-2 位，年 4 位）
// 范围: 1900 ≤ 年 ≤ 2100
// 失败返回 None，不 panic
// ==========================================

use chrono::{Datelike, NaiveDate};

pub const SALES_DATE_FORMAT: &str = "DD/MM/YYYY";

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// 解析 dd/mm/yyyy 日期
///
/// 拒绝: 形状不符、月份 ∉ 1..=12、日 ∉ 1..=31、年份越界、日历上不存在的日期（如 31/04）
pub fn parse_sales_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.trim().split('/');
    let day = parse_digits(parts.next()?, 1, 2)?;
    let month = parse_digits(parts.next()?, 1, 2)?;
    let year = parse_digits(parts.next()?, 4, 4)?;
    if parts.next().is_some() {
        return None;
    }

    let year = year as i32;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }

    // from_ymd_opt 已拒绝不存在的日期，这里再比对一次回推的年月日
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.day() != day || date.month() != month || date.year() != year {
        return None;
    }
    Some(date)
}

/// 格式化为 dd/mm/yyyy
pub fn format_sales_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn parse_digits(segment: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if segment.len() < min_len
        || segment.len() > max_len
        || !segment.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    segment.parse().ok()
}
