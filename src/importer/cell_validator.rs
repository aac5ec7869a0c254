// ==========================================
// 零售销售数据导入 - 单元格校验器
// ==========================================
// 职责: 单个单元格的类型校验（日期 / 数值 / 编码）
// 返回: Result<(), CellErrorKind>，坏数据不 panic
// ==========================================

use crate::domain::CellValue;
use crate::importer::date_parser::parse_sales_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 门店编号默认最大长度
pub const DEFAULT_BRANCH_NUMBER_MAX_LEN: usize = 10;
/// 员工代码默认最大长度
pub const DEFAULT_STAFF_CODE_MAX_LEN: usize = 20;
/// 金额最多小数位
pub const MAX_DECIMAL_PLACES: usize = 2;

// ==========================================
// CellErrorKind - 单元格错误类型（闭集）
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellErrorKind {
    #[error("is required")]
    Required,

    #[error("is not a valid date")]
    InvalidDate,

    #[error("cannot be in the future")]
    FutureDate,

    #[error("must be a valid number")]
    InvalidNumber,

    #[error("must be a whole number")]
    InvalidInteger,

    #[error("cannot have more than 2 decimal places")]
    InvalidDecimals,

    #[error("must be at most {max} characters")]
    TooLong { max: usize },

    #[error("may only contain letters, numbers and hyphens")]
    InvalidFormat,
}

impl CellErrorKind {
    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            CellErrorKind::Required => "REQUIRED",
            CellErrorKind::InvalidDate => "INVALID_DATE",
            CellErrorKind::FutureDate => "FUTURE_DATE",
            CellErrorKind::InvalidNumber => "INVALID_NUMBER",
            CellErrorKind::InvalidInteger => "INVALID_INTEGER",
            CellErrorKind::InvalidDecimals => "INVALID_DECIMALS",
            CellErrorKind::TooLong { .. } => "TOO_LONG",
            CellErrorKind::InvalidFormat => "INVALID_FORMAT",
        }
    }
}

pub type CellCheck = Result<(), CellErrorKind>;

// ==========================================
// ValidationContext - 校验上下文
// ==========================================
// today: 未来日期判定的参照日（默认取本地当天）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
    pub branch_number_max_len: usize,
    pub staff_code_max_len: usize,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            branch_number_max_len: DEFAULT_BRANCH_NUMBER_MAX_LEN,
            staff_code_max_len: DEFAULT_STAFF_CODE_MAX_LEN,
        }
    }

    /// 以本地当天为参照日
    pub fn wall_clock() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// 数值解析（空白 → None；非数值/非有限 → Err）
fn numeric_value(value: &CellValue) -> Result<Option<f64>, CellErrorKind> {
    let number = match value {
        v if v.is_blank() => return Ok(None),
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CellErrorKind::InvalidNumber)?,
        CellValue::Bool(_) | CellValue::Empty => return Err(CellErrorKind::InvalidNumber),
    };
    if !number.is_finite() {
        return Err(CellErrorKind::InvalidNumber);
    }
    Ok(Some(number))
}

/// 数值的小数位数（按最短十进制表示）
pub fn decimal_places(number: f64) -> usize {
    let repr = number.abs().to_string();
    repr.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// 校验数值单元格
///
/// - 空白视为合法（下游补 0）
/// - 允许负数（退货）
pub fn validate_number(value: &CellValue, require_integer: bool) -> CellCheck {
    let Some(number) = numeric_value(value)? else {
        return Ok(());
    };
    if require_integer {
        if number.fract() != 0.0 {
            return Err(CellErrorKind::InvalidInteger);
        }
    } else if decimal_places(number) > MAX_DECIMAL_PLACES {
        return Err(CellErrorKind::InvalidDecimals);
    }
    Ok(())
}

/// 校验日期单元格（必填，dd/mm/yyyy，不晚于 today）
pub fn validate_date(value: &CellValue, today: NaiveDate) -> CellCheck {
    if value.is_blank() {
        return Err(CellErrorKind::Required);
    }
    let date = parse_sales_date(&value.to_trimmed_string()).ok_or(CellErrorKind::InvalidDate)?;
    if date > today {
        return Err(CellErrorKind::FutureDate);
    }
    Ok(())
}

/// 校验门店编号
pub fn validate_branch_number(value: &CellValue, max_len: usize) -> CellCheck {
    validate_code(value, max_len)
}

/// 校验员工代码
pub fn validate_staff_code(value: &CellValue, max_len: usize) -> CellCheck {
    validate_code(value, max_len)
}

// 编码规则: 必填，长度上限，仅 [A-Za-z0-9-]
fn validate_code(value: &CellValue, max_len: usize) -> CellCheck {
    let code = value.to_trimmed_string();
    if code.is_empty() {
        return Err(CellErrorKind::Required);
    }
    if code.chars().count() > max_len {
        return Err(CellErrorKind::TooLong { max: max_len });
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CellErrorKind::InvalidFormat);
    }
    Ok(())
}
