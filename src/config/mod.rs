// ==========================================
// 零售销售数据导入 - 配置层
// ==========================================
// 职责: 导入相关配置读取（global scope）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, DEFAULT_HISTORY_LIMIT};
pub use import_config_trait::ImportConfigReader;
