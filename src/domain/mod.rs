// ==========================================
// 零售销售数据导入 - 领域模型层
// ==========================================
// 职责: 定义导入管道的领域实体与值对象
// 红线: 不含数据访问逻辑,不含校验逻辑
// ==========================================

pub mod import;
pub mod sales;

// 重导出核心类型
pub use import::{
    ImportHistoryEntry, ImportOutcome, ImportProgress, ImportStage, SourceFile, ValidationError,
    ValidationReport,
};
pub use sales::{is_blank_row, CellValue, SalesDataRow, Supplier, SupplierFigures, SupplierMetric};
