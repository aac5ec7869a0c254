// ==========================================
// 零售销售数据导入 - 导入层
// ==========================================
// 职责: 表格读取、校验、行处理、批量落库、流程编排
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod batch_importer;
pub mod cell_validator;
pub mod column_schema;
pub mod date_parser;
pub mod error;
pub mod header_validator;
pub mod row_processor;
pub mod row_validator;
pub mod sales_importer_impl;
pub mod sales_importer_trait;
pub mod sheet_reader;

// 重导出核心类型
pub use batch_importer::{BatchImporter, FractionCallback};
pub use cell_validator::{CellCheck, CellErrorKind, ValidationContext};
pub use column_schema::{CellRule, ColumnDefinition, ColumnType, COLUMN_COUNT, SALES_COLUMNS};
pub use date_parser::{format_sales_date, parse_sales_date};
pub use error::{ImportError, ImportResult};
pub use header_validator::validate_headers;
pub use row_processor::{coerce_number, process_row, process_rows};
pub use row_validator::{validate_row, validate_sheet};
pub use sales_importer_impl::SalesImporterImpl;
pub use sheet_reader::{CsvSheetReader, ExcelSheetReader, UniversalSheetReader};

// 重导出 Trait 接口
pub use sales_importer_trait::{ProgressSink, SalesImporter, SheetReadResult, SheetReader};

use crate::domain::{CellValue, SalesDataRow, SourceFile, ValidationReport};
use crate::repository::SalesImportRepository;

// ==========================================
// 单步入口（不经编排器，不写导入历史）
// ==========================================

/// 读取首个工作表（按扩展名选择读取器）
pub fn read_sheet(file: &SourceFile) -> SheetReadResult {
    UniversalSheetReader.read_sheet(file)
}

/// 以本地当天为参照日校验整表
pub fn validate(rows: &[Vec<CellValue>]) -> ValidationReport {
    validate_sheet(rows, &ValidationContext::wall_clock())
}

/// 以新批次 ID 整批落库，返回 (批次 ID, 写入指标数)
pub async fn import_rows<R>(
    repo: &R,
    rows: &[SalesDataRow],
    on_progress: Option<FractionCallback<'_>>,
) -> ImportResult<(String, usize)>
where
    R: SalesImportRepository + ?Sized,
{
    let batch_id = uuid::Uuid::new_v4().to_string();
    let committed = BatchImporter::new(repo)
        .import_rows(rows, &batch_id, on_progress)
        .await?;
    Ok((batch_id, committed))
}
