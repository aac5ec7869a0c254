// ==========================================
// 零售销售数据导入 - 行校验 / 整表校验
// ==========================================
// 行内: 按列定义逐列校验，收集全部错误（不在首错处停止）
// 整表: 表头 → 逐行；行与行之间互不阻断
// 校验错误以数据返回，不抛出
// ==========================================

use crate::domain::{is_blank_row, CellValue, ValidationError, ValidationReport};
use crate::importer::cell_validator::ValidationContext;
use crate::importer::column_schema::{ColumnDefinition, SALES_COLUMNS};
use crate::importer::header_validator::{validate_headers, HEADER_ROW};
use tracing::{debug, instrument};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 校验单个数据行
///
/// # 参数
/// - row: 原始单元格（缺失的尾部单元格视为空）
/// - row_number: 表格行号（从 1 开始，表头为 1）
/// - ctx: 校验上下文
///
/// # 返回
/// - 该行全部错误；全空行返回空列表
pub fn validate_row(
    row: &[CellValue],
    row_number: usize,
    ctx: &ValidationContext,
) -> Vec<ValidationError> {
    if is_blank_row(row) {
        return Vec::new();
    }

    let mut errors = Vec::new();
    for (idx, column) in SALES_COLUMNS.iter().enumerate() {
        let cell = row.get(idx).unwrap_or(&EMPTY_CELL);

        if cell.is_blank() {
            if column.required {
                errors.push(ValidationError {
                    row: row_number,
                    column: Some(column.name.to_string()),
                    message: format!("{} is required", column.name),
                    value: None,
                });
            }
            continue;
        }

        if let Err(kind) = column.rule.check(cell, ctx) {
            errors.push(ValidationError {
                row: row_number,
                column: Some(column.name.to_string()),
                message: cell_message(column, &kind.to_string()),
                value: Some(cell.to_string()),
            });
        }
    }
    errors
}

fn cell_message(column: &ColumnDefinition, reason: &str) -> String {
    match column.format {
        Some(format) => format!("{} {} (expected format: {})", column.name, reason, format),
        None => format!("{} {}", column.name, reason),
    }
}

/// 校验整表（第 0 行为表头）
///
/// 表头有误时直接返回表头错误，不做行校验
#[instrument(skip(rows, ctx), fields(rows = rows.len()))]
pub fn validate_sheet(rows: &[Vec<CellValue>], ctx: &ValidationContext) -> ValidationReport {
    let Some(headers) = rows.first() else {
        return ValidationReport::from_errors(vec![ValidationError::row_level(
            HEADER_ROW,
            "The file is empty. Expected a header row",
        )]);
    };

    let header_errors = validate_headers(headers);
    if !header_errors.is_empty() {
        debug!(errors = header_errors.len(), "表头校验失败");
        return ValidationReport::from_errors(header_errors);
    }

    let errors: Vec<ValidationError> = rows
        .iter()
        .enumerate()
        .skip(1)
        .flat_map(|(idx, row)| validate_row(row, idx + 1, ctx))
        .collect();

    debug!(errors = errors.len(), "行校验完成");
    ValidationReport::from_errors(errors)
}
