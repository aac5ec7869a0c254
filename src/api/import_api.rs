// ==========================================
// 销售数据导入API
// ==========================================
// 职责: 封装销售数据导入相关功能（文件路径 → 导入器）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::{ImportHistoryEntry, ImportOutcome, SourceFile, ValidationError, ValidationReport};
use crate::importer::{validate_sheet, ImportError, ProgressSink, SalesImporter, SheetReader, UniversalSheetReader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 导入API响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportApiResponse {
    /// 文件名
    pub file_name: String,
    /// 是否已落库
    pub success: bool,
    /// 导入批次ID（校验未通过时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// 导入的数据行数
    pub rows_processed: usize,
    /// 校验错误明细
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ValidationError>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u64,
}

impl ImportApiResponse {
    fn from_outcome(file_name: String, outcome: ImportOutcome) -> Self {
        match outcome {
            ImportOutcome::Invalid { errors } => Self {
                file_name,
                success: false,
                batch_id: None,
                rows_processed: 0,
                errors,
                elapsed_ms: 0,
            },
            ImportOutcome::Imported {
                batch_id,
                rows_processed,
                elapsed_ms,
            } => Self {
                file_name,
                success: true,
                batch_id: Some(batch_id),
                rows_processed,
                errors: Vec::new(),
                elapsed_ms,
            },
        }
    }
}

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn SalesImporter>,
    config: Arc<dyn ImportConfigReader>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(importer: Arc<dyn SalesImporter>, config: Arc<dyn ImportConfigReader>) -> Self {
        Self { importer, config }
    }

    fn load_file(file_path: &str) -> ApiResult<SourceFile> {
        let trimmed = file_path.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("file path must not be empty".to_string()));
        }
        let path = Path::new(trimmed);
        if !path.is_file() {
            return Err(ImportError::FileNotFound(trimmed.to_string()).into());
        }
        SourceFile::from_path(path).map_err(|e| ImportError::from(e).into())
    }

    /// 导入销售数据文件
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果（校验未通过时 success=false 并携带错误明细）
    /// - Err(ApiError): 文件读取/行处理/落库失败
    pub async fn import_file(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        let mut ignore = |_: &crate::domain::ImportProgress| {};
        self.import_file_with_progress(file_path, &mut ignore).await
    }

    /// 导入销售数据文件，并回调进度
    #[instrument(skip(self, progress))]
    pub async fn import_file_with_progress(
        &self,
        file_path: &str,
        progress: ProgressSink<'_>,
    ) -> ApiResult<ImportApiResponse> {
        let file = Self::load_file(file_path)?;
        let outcome = self.importer.import_file(&file, progress).await?;
        let response = ImportApiResponse::from_outcome(file.name, outcome);
        info!(
            file_name = %response.file_name,
            success = response.success,
            errors = response.errors.len(),
            "导入请求完成"
        );
        Ok(response)
    }

    /// 仅校验文件（不落库、不写历史）
    #[instrument(skip(self))]
    pub async fn validate_file(&self, file_path: &str) -> ApiResult<ValidationReport> {
        let file = Self::load_file(file_path)?;
        let rows = UniversalSheetReader
            .read_sheet(&file)
            .into_result()
            .map_err(|message| {
                warn!(file_name = %file.name, error = %message, "文件读取失败");
                ApiError::from(ImportError::SheetRead(message))
            })?;
        let ctx = self.config.validation_context().await?;
        Ok(validate_sheet(&rows, &ctx))
    }

    /// 最近的导入历史（新的在前）
    pub async fn list_import_history(&self) -> ApiResult<Vec<ImportHistoryEntry>> {
        Ok(self.importer.recent_history().await?)
    }
}
