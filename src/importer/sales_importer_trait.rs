// ==========================================
// 零售销售数据导入 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::{CellValue, ImportHistoryEntry, ImportOutcome, ImportProgress, SourceFile};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 进度回调（导入全程百分比快照）
pub type ProgressSink<'a> = &'a mut (dyn FnMut(&ImportProgress) + Send);

// ==========================================
// SalesImporter Trait
// ==========================================
// 用途: 销售数据导入主接口
// 实现者: SalesImporterImpl
#[async_trait]
pub trait SalesImporter: Send + Sync {
    /// 导入一个销售数据文件
    ///
    /// # 流程
    /// 1. 读取首个工作表
    /// 2. 校验表头、逐行校验（错误全部收集）
    /// 3. 有任何校验错误 → 返回 Invalid，不触达持久化
    /// 4. 行处理（首个失败即中止）
    /// 5. 事务化落库（进度 50%-100%）
    /// 6. 记录导入历史
    ///
    /// # 返回
    /// - Ok(ImportOutcome::Invalid): 校验未通过
    /// - Ok(ImportOutcome::Imported): 落库成功
    /// - Err: 读取失败、行处理失败、落库失败（后两者已记录失败历史）
    async fn import_file(
        &self,
        file: &SourceFile,
        progress: ProgressSink<'_>,
    ) -> ImportResult<ImportOutcome>;

    /// 最近的导入历史（条数受配置限制，新的在前）
    async fn recent_history(&self) -> ImportResult<Vec<ImportHistoryEntry>>;
}

// ==========================================
// SheetReadResult - 表格读取结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetReadResult {
    Success { success: bool, data: Vec<Vec<CellValue>> },
    Failure { success: bool, error: String },
}

impl SheetReadResult {
    pub fn success(data: Vec<Vec<CellValue>>) -> Self {
        SheetReadResult::Success {
            success: true,
            data,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        SheetReadResult::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SheetReadResult::Success { .. })
    }

    pub fn into_result(self) -> Result<Vec<Vec<CellValue>>, String> {
        match self {
            SheetReadResult::Success { data, .. } => Ok(data),
            SheetReadResult::Failure { error, .. } => Err(error),
        }
    }
}

// ==========================================
// SheetReader Trait
// ==========================================
// 用途: 表格解析接口
// 实现者: ExcelSheetReader, CsvSheetReader, UniversalSheetReader
pub trait SheetReader: Send + Sync {
    /// 解析首个工作表为行优先的二维单元格数组（第 0 行为表头）
    ///
    /// 不 panic；损坏文件/无工作表等全部转为 Failure
    fn read_sheet(&self, file: &SourceFile) -> SheetReadResult;
}
