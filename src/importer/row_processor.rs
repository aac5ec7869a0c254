// ==========================================
// 零售销售数据导入 - 行处理
// ==========================================
// 职责: 已校验的原始行 → SalesDataRow
// 规则: 第 0 列日期重新解析（防御性复核）
//       第 1-2 列 TRIM 为字符串
//       其余 13 列经 coerce_number 转换（空/非法 → 0，不做舍入）
// 任一行失败即中止整批
// ==========================================

use crate::domain::{is_blank_row, CellValue, SalesDataRow};
use crate::importer::column_schema::{
    BRANCH_NUMBER_COLUMN, DATE_COLUMN, FIRST_FIGURE_COLUMN, STAFF_CODE_COLUMN,
};
use crate::importer::date_parser::parse_sales_date;
use crate::importer::error::{ImportError, ImportResult};
use tracing::{debug, error, instrument};

/// 宽松数值转换（业务规则：空白/无法解析/非有限值一律记为 0）
pub fn coerce_number(value: &CellValue) -> f64 {
    let number = match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        CellValue::Empty | CellValue::Bool(_) => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn cell(row: &[CellValue], idx: usize) -> CellValue {
    row.get(idx).cloned().unwrap_or_default()
}

fn figure(row: &[CellValue], offset: usize) -> f64 {
    coerce_number(&cell(row, FIRST_FIGURE_COLUMN + offset))
}

/// 处理单行
///
/// # 参数
/// - row: 已通过校验的原始行
/// - row_number: 表格行号（从 1 开始，表头为 1）
pub fn process_row(row: &[CellValue], row_number: usize) -> ImportResult<SalesDataRow> {
    let raw_date = cell(row, DATE_COLUMN).to_trimmed_string();
    let date = parse_sales_date(&raw_date).ok_or_else(|| ImportError::RowProcessing {
        row: row_number,
        message: format!("Invalid date format \"{}\". Expected DD/MM/YYYY", raw_date),
    })?;

    Ok(SalesDataRow {
        date,
        branch_number: cell(row, BRANCH_NUMBER_COLUMN).to_trimmed_string(),
        staff_code: cell(row, STAFF_CODE_COLUMN).to_trimmed_string(),
        cellnet_quantity: figure(row, 0),
        cellnet_sales: figure(row, 1),
        cellnet_margin: figure(row, 2),
        likewize_acc_quantity: figure(row, 3),
        likewize_acc_sales: figure(row, 4),
        likewize_acc_margin: figure(row, 5),
        pacificomm_quantity: figure(row, 6),
        pacificomm_sales: figure(row, 7),
        pacificomm_margin: figure(row, 8),
        studiotech_quantity: figure(row, 9),
        studiotech_sales: figure(row, 10),
        studiotech_margin: figure(row, 11),
        likewize_device_quantity: figure(row, 12),
    })
}

/// 处理整表（跳过表头与全空行），首个失败即返回错误
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn process_rows(rows: &[Vec<CellValue>]) -> ImportResult<Vec<SalesDataRow>> {
    process_rows_with(rows, |_, _| {})
}

/// 处理整表，每处理一行回调 (已处理行数, 待处理总行数)
pub fn process_rows_with<F>(rows: &[Vec<CellValue>], mut on_row: F) -> ImportResult<Vec<SalesDataRow>>
where
    F: FnMut(usize, usize),
{
    let pending: Vec<(usize, &Vec<CellValue>)> = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !is_blank_row(row))
        .collect();
    let total = pending.len();

    let mut processed = Vec::with_capacity(total);
    for (idx, row) in pending {
        let row_number = idx + 1;
        match process_row(row, row_number) {
            Ok(record) => processed.push(record),
            Err(e) => {
                error!(row_number, error = %e, "行处理失败");
                return Err(e);
            }
        }
        on_row(processed.len(), total);
    }

    debug!(count = processed.len(), "行处理完成");
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    fn sample() -> Vec<CellValue> {
        row(&[
            "11/12/2024", "5", "S100", "10", "500", "100", "0", "0", "0", "0", "0", "0", "0", "0",
            "0", "20",
        ])
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&CellValue::Empty), 0.0);
        assert_eq!(coerce_number(&CellValue::from("")), 0.0);
        assert_eq!(coerce_number(&CellValue::from("abc")), 0.0);
        assert_eq!(coerce_number(&CellValue::from("NaN")), 0.0);
        assert_eq!(coerce_number(&CellValue::from(" -12.5 ")), -12.5);
        assert_eq!(coerce_number(&CellValue::Number(3.333)), 3.333);
        assert_eq!(coerce_number(&CellValue::Bool(true)), 0.0);
    }

    #[test]
    fn test_process_sample_row() {
        let record = process_row(&sample(), 2).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 12, 11).unwrap());
        assert_eq!(record.midnight().to_string(), "2024-12-11 00:00:00");
        assert_eq!(record.branch_number, "5");
        assert_eq!(record.staff_code, "S100");
        assert_eq!(record.cellnet_quantity, 10.0);
        assert_eq!(record.cellnet_sales, 500.0);
        assert_eq!(record.cellnet_margin, 100.0);
        assert_eq!(record.studiotech_margin, 0.0);
        assert_eq!(record.likewize_device_quantity, 20.0);
    }

    #[test]
    fn test_trailing_blank_figures_default_to_zero() {
        let record = process_row(&row(&["11/12/2024", " BR-1 ", "S100", "4"]), 2).unwrap();
        assert_eq!(record.branch_number, "BR-1");
        assert_eq!(record.cellnet_quantity, 4.0);
        assert_eq!(record.likewize_device_quantity, 0.0);
    }

    #[test]
    fn test_bad_date_names_the_row() {
        let mut cells = sample();
        cells[0] = CellValue::from("31/04/2024");
        let err = process_row(&cells, 9).unwrap_err();
        match err {
            ImportError::RowProcessing { row, .. } => assert_eq!(row, 9),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_process_rows_skips_header_and_blank_rows() {
        let rows = vec![row(&["Date"]), sample(), vec![CellValue::Empty; 16], sample()];
        let mut ticks = Vec::new();
        let records = process_rows_with(&rows, |done, total| ticks.push((done, total))).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(ticks, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_process_rows_aborts_on_first_failure() {
        let mut bad = sample();
        bad[0] = CellValue::from("not a date");
        let rows = vec![row(&["Date"]), sample(), bad, sample()];
        let err = process_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }
}
