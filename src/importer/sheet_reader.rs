// ==========================================
// 零售销售数据导入 - 表格读取器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// 只读首个工作表；日期单元格输出为 dd/mm/yyyy 文本
// ==========================================

use crate::domain::{CellValue, SourceFile};
use crate::importer::date_parser::format_sales_date;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sales_importer_trait::{SheetReadResult, SheetReader};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::{debug, warn};

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn into_read_result(file: &SourceFile, result: ImportResult<Vec<Vec<CellValue>>>) -> SheetReadResult {
    match result {
        Ok(rows) => {
            debug!(file_name = %file.name, rows = rows.len(), "表格读取完成");
            SheetReadResult::success(rows)
        }
        Err(e) => {
            warn!(file_name = %file.name, error = %e, "表格读取失败");
            SheetReadResult::failure(e)
        }
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct ExcelSheetReader;

impl ExcelSheetReader {
    fn read_rows(file: &SourceFile) -> ImportResult<Vec<Vec<CellValue>>> {
        // 按内容自动识别 xlsx/xls/ods
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.content.clone()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ImportError::NoWorksheet)??;

        // Range 从首个非空单元格开始，上方补齐空行、左侧补齐空列以保持行号与列位置
        let (leading_rows, leading_cols) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); leading_rows];
        rows.extend(range.rows().map(|row| {
            let mut cells: Vec<CellValue> = std::iter::repeat(CellValue::Empty)
                .take(leading_cols)
                .chain(row.iter().map(data_to_cell))
                .collect();
            trim_trailing_blanks(&mut cells);
            cells
        }));

        Ok(rows)
    }
}

/// 去掉行尾空单元格（Range 宽度取最宽行，短行会被补空）
fn trim_trailing_blanks(cells: &mut Vec<CellValue>) {
    while cells.last().is_some_and(|cell| *cell == CellValue::Empty) {
        cells.pop();
    }
}

impl SheetReader for ExcelSheetReader {
    fn read_sheet(&self, file: &SourceFile) -> SheetReadResult {
        into_read_result(file, Self::read_rows(file))
    }
}

/// calamine 单元格 → CellValue
fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => CellValue::Text(format_sales_date(date)),
            None => CellValue::Text(cell.to_string()),
        },
        _ => CellValue::Text(cell.to_string()),
    }
}

// ==========================================
// CSV Reader 实现
// ==========================================
pub struct CsvSheetReader;

impl CsvSheetReader {
    fn read_rows(file: &SourceFile) -> ImportResult<Vec<Vec<CellValue>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file.content.as_slice());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|value| {
                        if value.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(value.to_string())
                        }
                    })
                    .collect::<Vec<_>>(),
            );
        }
        Ok(rows)
    }
}

impl SheetReader for CsvSheetReader {
    fn read_sheet(&self, file: &SourceFile) -> SheetReadResult {
        into_read_result(file, Self::read_rows(file))
    }
}

// ==========================================
// 通用读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalSheetReader;

impl SheetReader for UniversalSheetReader {
    fn read_sheet(&self, file: &SourceFile) -> SheetReadResult {
        let ext = file.extension();
        match ext.as_str() {
            "csv" => CsvSheetReader.read_sheet(file),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelSheetReader.read_sheet(file),
            _ => into_read_result(file, Err(ImportError::UnsupportedFormat(ext))),
        }
    }
}
