// ==========================================
// 零售销售数据导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope，目前只用 global)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::importer::cell_validator::{DEFAULT_BRANCH_NUMBER_MAX_LEN, DEFAULT_STAFF_CODE_MAX_LEN};
use crate::importer::date_parser::parse_sales_date;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// 导入历史默认展示条数
pub const DEFAULT_HISTORY_LIMIT: usize = 7;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "<connection>".to_string(),
            message: e.to_string(),
        })?;
        init_schema(&conn).map_err(|e| ImportError::ConfigReadError {
            key: "<schema>".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
            configure_sqlite_connection(&guard)
                .and_then(|_| init_schema(&guard))
                .map_err(|e| ImportError::ConfigReadError {
                    key: "<schema>".to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ImportResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global 配置（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ImportResult<HashMap<String, String>> {
        let conn = self.lock()?;
        let to_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "<snapshot>".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")
            .map_err(to_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(to_err)?;

        let mut snapshot = HashMap::new();
        for row in rows {
            let (key, value) = row.map_err(to_err)?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取正整数配置；缺失或格式错误时回退默认值
    fn get_usize_or_default(&self, key: &str, default: usize) -> ImportResult<usize> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                warn!(config_key = key, raw_value = %raw, default, "配置值无效，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_history_limit(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT)
    }

    async fn get_reference_date(&self) -> ImportResult<Option<NaiveDate>> {
        let Some(raw) = self.get_config_value(config_keys::REFERENCE_DATE)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        // 参照日格式错误不回退默认值
        parse_sales_date(&raw)
            .map(Some)
            .ok_or_else(|| ImportError::ConfigValueError {
                key: config_keys::REFERENCE_DATE.to_string(),
                value: raw.clone(),
                message: "expected a DD/MM/YYYY date".to_string(),
            })
    }

    async fn get_branch_number_max_len(&self) -> ImportResult<usize> {
        self.get_usize_or_default(
            config_keys::BRANCH_NUMBER_MAX_LEN,
            DEFAULT_BRANCH_NUMBER_MAX_LEN,
        )
    }

    async fn get_staff_code_max_len(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::STAFF_CODE_MAX_LEN, DEFAULT_STAFF_CODE_MAX_LEN)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入历史
    pub const HISTORY_LIMIT: &str = "import.history_limit";

    // 校验
    pub const REFERENCE_DATE: &str = "import.reference_date"; // DD/MM/YYYY，缺省取本地当天
    pub const BRANCH_NUMBER_MAX_LEN: &str = "import.branch_number_max_len";
    pub const STAFF_CODE_MAX_LEN: &str = "import.staff_code_max_len";
}
