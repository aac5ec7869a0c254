// ==========================================
// 零售销售数据导入 - 导入编排器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 读取 → 表头校验 → 行校验 → 行处理 → 批量落库 → 导入历史
// 进度: 读取 0-10% / 校验 10-40% / 处理 40-50% / 落库 50-100%
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::{
    is_blank_row, ImportHistoryEntry, ImportOutcome, ImportProgress, ImportStage, SourceFile,
};
use crate::importer::batch_importer::BatchImporter;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_processor::process_rows_with;
use crate::importer::row_validator::validate_sheet;
use crate::importer::sales_importer_trait::{ProgressSink, SalesImporter, SheetReader};
use crate::importer::sheet_reader::UniversalSheetReader;
use crate::repository::SalesImportRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportRun - 单次导入的状态与进度
// ==========================================
struct ImportRun<'a> {
    progress: ImportProgress,
    sink: ProgressSink<'a>,
}

impl<'a> ImportRun<'a> {
    fn new(sink: ProgressSink<'a>) -> Self {
        Self {
            progress: ImportProgress::default(),
            sink,
        }
    }

    fn stage(&self) -> ImportStage {
        self.progress.stage
    }

    /// 状态迁移（非法迁移视为内部错误）
    fn enter(&mut self, next: ImportStage) -> ImportResult<()> {
        let current = self.progress.stage;
        if !current.can_transition_to(next) {
            return Err(ImportError::InternalError(format!(
                "illegal import stage transition {:?} -> {:?}",
                current, next
            )));
        }
        debug!(from = ?current, to = ?next, "导入状态迁移");
        self.progress.stage = next;
        Ok(())
    }

    /// 终止于 Failed（终态下不再迁移）
    fn fail(&mut self) {
        if !self.progress.stage.is_terminal() {
            self.progress.stage = ImportStage::Failed;
        }
    }

    fn report(&mut self, step: &str, percent: f64) {
        self.progress.advance(step, percent);
        (self.sink)(&self.progress);
    }
}

// ==========================================
// SalesImporterImpl - 销售数据导入器实现
// ==========================================
pub struct SalesImporterImpl<R, C>
where
    R: SalesImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: Arc<R>,

    // 配置读取器
    config: C,

    // 表格读取器
    sheet_reader: Box<dyn SheetReader>,
}

impl<R, C> SalesImporterImpl<R, C>
where
    R: SalesImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 SalesImporter 实例（按扩展名自动选择读取器）
    pub fn new(repo: Arc<R>, config: C) -> Self {
        Self::with_sheet_reader(repo, config, Box::new(UniversalSheetReader))
    }

    /// 使用指定的表格读取器
    pub fn with_sheet_reader(repo: Arc<R>, config: C, sheet_reader: Box<dyn SheetReader>) -> Self {
        Self {
            repo,
            config,
            sheet_reader,
        }
    }

    /// 导入中止（校验未通过除外）：写失败历史后原样返回错误
    async fn fail_run(&self, run: &mut ImportRun<'_>, file_name: &str, err: ImportError) -> ImportError {
        run.fail();
        error!(file_name, error = %err, "导入失败");
        let entry = ImportHistoryEntry::failed(file_name, err.to_string());
        if let Err(history_err) = self.repo.append_history(entry).await {
            warn!(file_name, error = %history_err, "失败历史写入失败");
        }
        err
    }
}

#[async_trait]
impl<R, C> SalesImporter for SalesImporterImpl<R, C>
where
    R: SalesImportRepository,
    C: ImportConfigReader,
{
    #[instrument(skip(self, file, progress), fields(file_name = %file.name))]
    async fn import_file(
        &self,
        file: &SourceFile,
        progress: ProgressSink<'_>,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let file_name = file.name.as_str();
        let mut run = ImportRun::new(progress);
        info!(file_name, "开始导入销售数据");

        // === 阶段 1: 读取 + 校验 ===
        run.enter(ImportStage::Validating)?;
        run.report("Reading file", 0.0);

        let ctx = match self.config.validation_context().await {
            Ok(ctx) => ctx,
            Err(e) => return Err(self.fail_run(&mut run, file_name, e).await),
        };

        let rows = match self.sheet_reader.read_sheet(file).into_result() {
            Ok(rows) => rows,
            Err(message) => {
                let e = ImportError::SheetRead(message);
                return Err(self.fail_run(&mut run, file_name, e).await);
            }
        };
        run.progress.total_rows = rows.iter().skip(1).filter(|row| !is_blank_row(row)).count();
        info!(file_name, total_rows = run.progress.total_rows, "文件读取完成");
        run.report("Validating data", 10.0);

        let report = validate_sheet(&rows, &ctx);
        if !report.is_valid {
            run.enter(ImportStage::Invalid)?;
            run.report("Validation failed", 40.0);
            info!(file_name, errors = report.errors.len(), "校验未通过，未写入任何数据");
            return Ok(ImportOutcome::Invalid {
                errors: report.errors,
            });
        }
        run.report("Validation complete", 40.0);

        // === 阶段 2: 行处理 ===
        run.enter(ImportStage::Processing)?;
        let processed = process_rows_with(&rows, |done, total| {
            run.progress.processed_rows = done;
            run.report("Processing rows", 40.0 + 10.0 * done as f64 / total as f64);
        });
        let processed = match processed {
            Ok(processed) => processed,
            Err(e) => return Err(self.fail_run(&mut run, file_name, e).await),
        };
        debug!(file_name, rows = processed.len(), "行处理完成");

        // === 阶段 3: 批量落库 ===
        run.enter(ImportStage::Importing)?;
        run.report("Importing data", 50.0);
        let batch_id = Uuid::new_v4().to_string();
        let importer = BatchImporter::new(self.repo.as_ref());
        let committed = {
            let mut on_fraction = |fraction: f64| run.report("Importing data", 50.0 + 50.0 * fraction);
            importer
                .import_rows(&processed, &batch_id, Some(&mut on_fraction))
                .await
        };
        let metrics = match committed {
            Ok(metrics) => metrics,
            Err(e) => return Err(self.fail_run(&mut run, file_name, e).await),
        };

        // === 阶段 4: 导入历史 ===
        run.enter(ImportStage::Succeeded)?;
        run.report("Complete", 100.0);
        let rows_processed = processed.len();
        if let Err(e) = self
            .repo
            .append_history(ImportHistoryEntry::succeeded(file_name, rows_processed))
            .await
        {
            // 数据已提交，历史写入失败不回滚
            warn!(file_name, error = %e, "导入历史写入失败");
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            file_name,
            batch_id = %batch_id,
            rows = rows_processed,
            metrics,
            elapsed_ms,
            stage = ?run.stage(),
            "销售数据导入完成"
        );

        Ok(ImportOutcome::Imported {
            batch_id,
            rows_processed,
            elapsed_ms,
        })
    }

    async fn recent_history(&self) -> ImportResult<Vec<ImportHistoryEntry>> {
        let limit = self.config.get_history_limit().await?;
        Ok(self.repo.recent_history(limit).await?)
    }
}
