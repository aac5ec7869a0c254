// ==========================================
// 零售销售数据导入 - 核心库
// ==========================================
// 功能: 供应商销售表（Excel/CSV）校验、转换与事务化落库
// 技术栈: Rust + SQLite
// 流程: 读取 → 校验 → 行处理 → 批量落库 → 导入历史
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CellValue, ImportHistoryEntry, ImportOutcome, ImportProgress, ImportStage, SalesDataRow,
    SourceFile, Supplier, SupplierMetric, ValidationError, ValidationReport,
};

// 导入管道入口
pub use importer::{
    import_rows, process_rows, read_sheet, validate, ImportError, ImportResult, SalesImporter,
    SalesImporterImpl,
};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零售销售数据导入";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
