// ==========================================
// 零售销售数据导入 - 批量落库
// ==========================================
// 职责: SalesDataRow → 5 条供应商指标，整批原子提交
// 进度: 每入队一行回调一次（0..1，单调不减，最后一次恰为 1.0）
// ==========================================

use crate::domain::{SalesDataRow, Supplier, SupplierMetric};
use crate::importer::error::ImportResult;
use crate::repository::SalesImportRepository;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 入队进度回调（已入队行数 / 总行数）
pub type FractionCallback<'a> = &'a mut (dyn FnMut(f64) + Send);

pub struct BatchImporter<'r, R: ?Sized> {
    repo: &'r R,
}

impl<'r, R> BatchImporter<'r, R>
where
    R: SalesImportRepository + ?Sized,
{
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// 单行展开为 5 条供应商指标
    pub fn expand_row(row: &SalesDataRow, batch_id: &str) -> Vec<SupplierMetric> {
        Supplier::ALL
            .iter()
            .map(|supplier| {
                let figures = row.figures(*supplier);
                SupplierMetric {
                    metric_id: Uuid::new_v4().to_string(),
                    batch_id: batch_id.to_string(),
                    supplier: *supplier,
                    date: row.date,
                    branch_number: row.branch_number.clone(),
                    staff_code: row.staff_code.clone(),
                    quantity: figures.quantity,
                    sales: figures.sales,
                    margin: figures.margin,
                }
            })
            .collect()
    }

    /// 整批导入
    ///
    /// # 参数
    /// - rows: 已处理的销售数据行
    /// - batch_id: 导入批次 ID（写入每条指标）
    /// - on_progress: 入队进度回调（可选）
    ///
    /// # 返回
    /// - Ok(usize): 提交的指标条数（空输入为 0，不提交）
    /// - Err: 落库失败（整批回滚）
    #[instrument(skip(self, rows, on_progress), fields(rows = rows.len()))]
    pub async fn import_rows(
        &self,
        rows: &[SalesDataRow],
        batch_id: &str,
        mut on_progress: Option<FractionCallback<'_>>,
    ) -> ImportResult<usize> {
        if rows.is_empty() {
            debug!("无数据行，跳过提交");
            return Ok(0);
        }

        let total = rows.len();
        let mut batch = Vec::with_capacity(total * Supplier::ALL.len());
        for (idx, row) in rows.iter().enumerate() {
            batch.extend(Self::expand_row(row, batch_id));
            if let Some(callback) = on_progress.as_mut() {
                callback((idx + 1) as f64 / total as f64);
            }
        }

        let queued = batch.len();
        match self.repo.commit_metrics(batch).await {
            Ok(committed) => {
                info!(batch_id, rows = total, metrics = committed, "批量提交完成");
                Ok(committed)
            }
            Err(e) => {
                error!(batch_id, metrics = queued, error = %e, "批量提交失败");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SalesImportRepositoryImpl;
    use chrono::NaiveDate;

    fn sales_row(staff: &str) -> SalesDataRow {
        SalesDataRow {
            date: NaiveDate::from_ymd_opt(2024, 12, 11).unwrap(),
            branch_number: "5".to_string(),
            staff_code: staff.to_string(),
            cellnet_quantity: 10.0,
            cellnet_sales: 500.0,
            cellnet_margin: 100.0,
            likewize_acc_quantity: 1.0,
            likewize_acc_sales: 20.0,
            likewize_acc_margin: 5.0,
            pacificomm_quantity: 0.0,
            pacificomm_sales: 0.0,
            pacificomm_margin: 0.0,
            studiotech_quantity: -1.0,
            studiotech_sales: -30.0,
            studiotech_margin: -3.5,
            likewize_device_quantity: 20.0,
        }
    }

    #[test]
    fn test_expand_row_produces_five_metrics() {
        let metrics = BatchImporter::<SalesImportRepositoryImpl>::expand_row(&sales_row("S1"), "b1");
        assert_eq!(metrics.len(), 5);
        let suppliers: Vec<_> = metrics.iter().map(|m| m.supplier).collect();
        assert_eq!(suppliers, Supplier::ALL.to_vec());

        let device = &metrics[4];
        assert_eq!(device.quantity, 20.0);
        assert_eq!(device.sales, 0.0);
        assert_eq!(device.margin, 0.0);

        let studiotech = &metrics[3];
        assert_eq!(studiotech.sales, -30.0);
        assert!(metrics.iter().all(|m| m.batch_id == "b1"));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        let repo = SalesImportRepositoryImpl::new(":memory:").unwrap();
        let importer = BatchImporter::new(&repo);
        let rows: Vec<_> = (0..7).map(|i| sales_row(&format!("S{}", i))).collect();

        let mut fractions = Vec::new();
        let mut record = |f: f64| fractions.push(f);
        let committed = importer
            .import_rows(&rows, "batch-7", Some(&mut record))
            .await
            .unwrap();

        assert_eq!(committed, 35);
        assert_eq!(fractions.len(), 7);
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*fractions.last().unwrap(), 1.0);
        assert_eq!(repo.count_metrics().await.unwrap(), 35);
    }

    #[tokio::test]
    async fn test_empty_input_commits_nothing() {
        let repo = SalesImportRepositoryImpl::new(":memory:").unwrap();
        let importer = BatchImporter::new(&repo);
        let committed = importer.import_rows(&[], "batch-0", None).await.unwrap();
        assert_eq!(committed, 0);
        assert_eq!(repo.count_metrics().await.unwrap(), 0);
    }
}
