// ==========================================
// 零售销售数据导入 - 导入过程领域模型
// ==========================================
// 职责: 源文件、校验错误、导入进度、导入历史、导入结果
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// SourceFile - 待导入文件（文件名 + 二进制内容）
// ==========================================
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// 从磁盘读取文件
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self { name, content })
    }

    /// 小写扩展名（无扩展名时为空串）
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}

// ==========================================
// ValidationError - 校验错误
// ==========================================
// 行号从 1 开始，表头为第 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    /// 行级错误（无列信息）
    pub fn row_level(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            message: message.into(),
            value: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "Row {}, {}: {}", self.row, column, self.message),
            None => write!(f, "Row {}: {}", self.row, self.message),
        }
    }
}

// ==========================================
// ValidationReport - 校验结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

// ==========================================
// ImportStage - 导入状态机
// ==========================================
// idle → validating → invalid
//                   → processing → importing → succeeded | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    Idle,
    Validating,
    Invalid,
    Processing,
    Importing,
    Succeeded,
    Failed,
}

impl ImportStage {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportStage::Invalid | ImportStage::Succeeded | ImportStage::Failed
        )
    }

    /// 状态迁移是否合法
    pub fn can_transition_to(&self, next: ImportStage) -> bool {
        use ImportStage::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Invalid)
                | (Validating, Processing)
                | (Validating, Failed)
                | (Processing, Importing)
                | (Processing, Failed)
                | (Importing, Succeeded)
                | (Importing, Failed)
        )
    }
}

// ==========================================
// ImportProgress - 导入进度（每次导入独立持有）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub stage: ImportStage,
    pub current_step: String,
    pub progress: u8, // 0..=100
    pub total_rows: usize,
    pub processed_rows: usize,
}

impl Default for ImportProgress {
    fn default() -> Self {
        Self {
            stage: ImportStage::Idle,
            current_step: String::new(),
            progress: 0,
            total_rows: 0,
            processed_rows: 0,
        }
    }
}

impl ImportProgress {
    /// 更新当前步骤与百分比（百分比截断到 100）
    pub fn advance(&mut self, step: &str, progress: f64) {
        self.current_step = step.to_string();
        self.progress = progress.clamp(0.0, 100.0).round() as u8;
    }
}

// ==========================================
// ImportHistoryEntry - 导入历史（只追加）
// ==========================================
// 对齐: import_history 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistoryEntry {
    pub entry_id: String,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub rows_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportHistoryEntry {
    pub fn succeeded(file_name: &str, rows_processed: usize) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            timestamp: Utc::now(),
            success: true,
            rows_processed,
            error: None,
        }
    }

    pub fn failed(file_name: &str, error: impl Into<String>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            timestamp: Utc::now(),
            success: false,
            rows_processed: 0,
            error: Some(error.into()),
        }
    }
}

// ==========================================
// ImportOutcome - 单次导入的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    /// 校验未通过（未触达持久化）
    Invalid { errors: Vec<ValidationError> },
    /// 落库成功
    Imported {
        batch_id: String,
        rows_processed: usize,
        elapsed_ms: u64,
    },
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported { .. })
    }
}
