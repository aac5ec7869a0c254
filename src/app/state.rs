// ==========================================
// 零售销售数据导入 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 启动时构造一次，显式传递给各调用方（无全局单例）
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, ImportApi};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::importer::SalesImporterImpl;
use crate::repository::SalesImportRepositoryImpl;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SALES_IMPORT_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 导入仓储（共享连接）
    pub import_repo: Arc<SalesImportRepositoryImpl>,

    /// 销售数据导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 仓储与配置共享同一个连接；建表幂等
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let import_repo = Arc::new(SalesImportRepositoryImpl::from_connection(conn.clone())?);
        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);

        let importer = SalesImporterImpl::new(
            import_repo.clone(),
            ConfigManager::from_connection(conn)?,
        );
        let import_api = Arc::new(ImportApi::new(Arc::new(importer), config.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            config,
            import_repo,
            import_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: SALES_IMPORT_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./sales_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("sales-import");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("sales_import.db"),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "数据目录创建失败，使用当前目录");
            }
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SalesImportRepository;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[tokio::test]
    async fn test_app_state_bootstraps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.import_repo.count_metrics().await.unwrap(), 0);
        assert!(state.import_api.list_import_history().await.unwrap().is_empty());
    }
}
