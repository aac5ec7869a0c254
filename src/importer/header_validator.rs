// ==========================================
// 零售销售数据导入 - 表头校验
// ==========================================
// 1. 列数不等于 16 → 单条错误，跳过逐列比对
// 2. 逐列比对（TRIM 后区分大小写），收集全部不匹配
// ==========================================

use crate::domain::{CellValue, ValidationError};
use crate::importer::column_schema::{COLUMN_COUNT, SALES_COLUMNS};

/// 表头所在行号
pub const HEADER_ROW: usize = 1;

/// 校验表头行
pub fn validate_headers(headers: &[CellValue]) -> Vec<ValidationError> {
    if headers.len() != COLUMN_COUNT {
        return vec![ValidationError::row_level(
            HEADER_ROW,
            format!(
                "Invalid number of columns. Expected {}, found {}",
                COLUMN_COUNT,
                headers.len()
            ),
        )];
    }

    SALES_COLUMNS
        .iter()
        .zip(headers)
        .enumerate()
        .filter_map(|(idx, (column, cell))| {
            let actual = cell.to_trimmed_string();
            if actual == column.name {
                return None;
            }
            Some(ValidationError {
                row: HEADER_ROW,
                column: Some(format!("Column {}", idx + 1)),
                message: format!(
                    "Invalid header. Expected \"{}\", found \"{}\"",
                    column.name, actual
                ),
                value: Some(actual),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::column_schema::expected_headers;

    fn headers() -> Vec<CellValue> {
        expected_headers().map(CellValue::from).collect()
    }

    #[test]
    fn test_exact_headers_pass() {
        assert!(validate_headers(&headers()).is_empty());
    }

    #[test]
    fn test_headers_are_trimmed() {
        let mut row = headers();
        row[0] = CellValue::from("  Date ");
        assert!(validate_headers(&row).is_empty());
    }

    #[test]
    fn test_count_mismatch_short_circuits() {
        let mut row = headers();
        row.pop();
        let errors = validate_headers(&row);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 1);
        assert!(errors[0].column.is_none());
        assert!(errors[0].message.contains("Expected 16, found 15"));

        row.push(CellValue::from("Likewize Device Quantity"));
        row.push(CellValue::from("Extra"));
        assert_eq!(validate_headers(&row).len(), 1);
    }

    #[test]
    fn test_collects_every_mismatch() {
        let mut row = headers();
        row[0] = CellValue::from("date");
        row[4] = CellValue::from("Cellnet Revenue");
        let errors = validate_headers(&row);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].column.as_deref(), Some("Column 1"));
        assert!(errors[0].message.contains("\"Date\""));
        assert!(errors[0].message.contains("\"date\""));
        assert_eq!(errors[1].column.as_deref(), Some("Column 5"));
    }
}
