// ==========================================
// 零售销售数据导入 - 导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{ImportHistoryEntry, SupplierMetric};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// SalesImportRepository Trait
// ==========================================
// 实现者: SalesImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait SalesImportRepository: Send + Sync {
    // ===== 批量写入（事务化）=====

    /// 原子提交一批供应商指标
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 数据库错误（整个事务回滚，不存在部分写入）
    async fn commit_metrics(&self, metrics: Vec<SupplierMetric>) -> RepositoryResult<usize>;

    /// 统计 sales_metric 表记录数
    async fn count_metrics(&self) -> RepositoryResult<usize>;

    // ===== 导入历史（只追加）=====

    /// 追加一条导入历史
    async fn append_history(&self, entry: ImportHistoryEntry) -> RepositoryResult<()>;

    /// 查询最近的导入历史（新的在前）
    ///
    /// # 参数
    /// - limit: 返回记录数上限
    async fn recent_history(&self, limit: usize) -> RepositoryResult<Vec<ImportHistoryEntry>>;
}
