// ==========================================
// 零售销售数据导入 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行及其他前端调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
