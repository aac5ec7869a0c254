// ==========================================
// 零售销售数据导入 - 导入 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::{ImportHistoryEntry, Supplier, SupplierMetric};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sales_import_repo::SalesImportRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SalesImportRepositoryImpl
// ==========================================
pub struct SalesImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl SalesImportRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 为内存库）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中批量插入指标
    fn insert_metrics_tx(tx: &Transaction, metrics: &[SupplierMetric]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO sales_metric (
                metric_id, batch_id, supplier, sale_date, branch_number,
                staff_code, quantity, sales, margin, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )?;

        let now = Utc::now();
        let mut count = 0;
        for metric in metrics {
            stmt.execute(params![
                metric.metric_id,
                metric.batch_id,
                metric.supplier.as_str(),
                metric.date,
                metric.branch_number,
                metric.staff_code,
                metric.quantity,
                metric.sales,
                metric.margin,
                now,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    /// 查询指定批次的指标（按写入顺序）
    pub fn metrics_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<SupplierMetric>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT metric_id, batch_id, supplier, sale_date, branch_number,
                   staff_code, quantity, sales, margin
            FROM sales_metric
            WHERE batch_id = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![batch_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, NaiveDate>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, f64>(8)?,
            ))
        })?;

        let mut metrics = Vec::new();
        for row in rows {
            let (metric_id, batch_id, supplier, date, branch_number, staff_code, quantity, sales, margin) =
                row?;
            let supplier = Supplier::parse(&supplier).ok_or_else(|| RepositoryError::FieldValueError {
                field: "supplier".to_string(),
                message: format!("unknown supplier code {}", supplier),
            })?;
            metrics.push(SupplierMetric {
                metric_id,
                batch_id,
                supplier,
                date,
                branch_number,
                staff_code,
                quantity,
                sales,
                margin,
            });
        }
        Ok(metrics)
    }
}

#[async_trait]
impl SalesImportRepository for SalesImportRepositoryImpl {
    /// 批量插入指标（单事务，失败整体回滚）
    async fn commit_metrics(&self, metrics: Vec<SupplierMetric>) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 出错时 tx 被 drop，自动回滚
        let count = Self::insert_metrics_tx(&tx, &metrics)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn count_metrics(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sales_metric", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn append_history(&self, entry: ImportHistoryEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_history (
                entry_id, file_name, imported_at, success, rows_processed, error
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.entry_id,
                entry.file_name,
                entry.timestamp,
                entry.success,
                entry.rows_processed as i64,
                entry.error,
            ],
        )?;
        Ok(())
    }

    async fn recent_history(&self, limit: usize) -> RepositoryResult<Vec<ImportHistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT entry_id, file_name, imported_at, success, rows_processed, error
            FROM import_history
            ORDER BY imported_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ImportHistoryEntry {
                entry_id: row.get(0)?,
                file_name: row.get(1)?,
                timestamp: row.get::<_, DateTime<Utc>>(2)?,
                success: row.get(3)?,
                rows_processed: row.get::<_, i64>(4)? as usize,
                error: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}
