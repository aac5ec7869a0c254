// ==========================================
// 零售销售数据导入 - 应用层
// ==========================================
// 职责: 组装共享状态（连接、仓储、配置、API）
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
