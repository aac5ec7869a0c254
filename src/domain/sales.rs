// ==========================================
// 零售销售数据导入 - 销售数据领域模型
// ==========================================
// 职责: 原始单元格、销售数据行、供应商指标
// 红线: 不含校验逻辑，不含数据访问逻辑
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// 用途: 表格解析后的统一单元格表示
// 说明: 日期单元格在解析阶段已转为 dd/mm/yyyy 文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// 是否为空白（Empty 或 TRIM 后为空的文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// TRIM 后的文本表示（数值 5.0 → "5"）
    pub fn to_trimmed_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// 行是否完全空白（所有单元格为空）
pub fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_blank)
}

// ==========================================
// Supplier - 供应商
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Supplier {
    Cellnet,
    LikewizeAcc,
    Pacificomm,
    Studiotech,
    LikewizeDevice,
}

impl Supplier {
    /// 全部供应商（与落库顺序一致）
    pub const ALL: [Supplier; 5] = [
        Supplier::Cellnet,
        Supplier::LikewizeAcc,
        Supplier::Pacificomm,
        Supplier::Studiotech,
        Supplier::LikewizeDevice,
    ];

    /// 数据库存储代码
    pub fn as_str(&self) -> &'static str {
        match self {
            Supplier::Cellnet => "CELLNET",
            Supplier::LikewizeAcc => "LIKEWIZE_ACC",
            Supplier::Pacificomm => "PACIFICOMM",
            Supplier::Studiotech => "STUDIOTECH",
            Supplier::LikewizeDevice => "LIKEWIZE_DEVICE",
        }
    }

    pub fn parse(raw: &str) -> Option<Supplier> {
        Supplier::ALL
            .into_iter()
            .find(|s| s.as_str() == raw.trim().trim_matches('"'))
    }

    /// 表头中的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Supplier::Cellnet => "Cellnet",
            Supplier::LikewizeAcc => "Likewize Acc",
            Supplier::Pacificomm => "Pacificomm",
            Supplier::Studiotech => "Studiotech",
            Supplier::LikewizeDevice => "Likewize Device",
        }
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ==========================================
// SupplierFigures - 单个供应商的数量/销售额/毛利
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplierFigures {
    pub quantity: f64,
    pub sales: f64,
    pub margin: f64,
}

// ==========================================
// SalesDataRow - 处理后的销售数据行
// ==========================================
// 不变量: 数值字段不为 NaN，空值已补 0；允许负数（退货）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesDataRow {
    pub date: NaiveDate,
    pub branch_number: String,
    pub staff_code: String,
    pub cellnet_quantity: f64,
    pub cellnet_sales: f64,
    pub cellnet_margin: f64,
    pub likewize_acc_quantity: f64,
    pub likewize_acc_sales: f64,
    pub likewize_acc_margin: f64,
    pub pacificomm_quantity: f64,
    pub pacificomm_sales: f64,
    pub pacificomm_margin: f64,
    pub studiotech_quantity: f64,
    pub studiotech_sales: f64,
    pub studiotech_margin: f64,
    pub likewize_device_quantity: f64,
}

impl SalesDataRow {
    /// 销售日期（本地零点）
    pub fn midnight(&self) -> NaiveDateTime {
        self.date.and_time(chrono::NaiveTime::MIN)
    }

    /// 指定供应商的指标
    pub fn figures(&self, supplier: Supplier) -> SupplierFigures {
        match supplier {
            Supplier::Cellnet => SupplierFigures {
                quantity: self.cellnet_quantity,
                sales: self.cellnet_sales,
                margin: self.cellnet_margin,
            },
            Supplier::LikewizeAcc => SupplierFigures {
                quantity: self.likewize_acc_quantity,
                sales: self.likewize_acc_sales,
                margin: self.likewize_acc_margin,
            },
            Supplier::Pacificomm => SupplierFigures {
                quantity: self.pacificomm_quantity,
                sales: self.pacificomm_sales,
                margin: self.pacificomm_margin,
            },
            Supplier::Studiotech => SupplierFigures {
                quantity: self.studiotech_quantity,
                sales: self.studiotech_sales,
                margin: self.studiotech_margin,
            },
            // 设备只有数量
            Supplier::LikewizeDevice => SupplierFigures {
                quantity: self.likewize_device_quantity,
                ..SupplierFigures::default()
            },
        }
    }
}

// ==========================================
// SupplierMetric - 单供应商指标记录（落库单元）
// ==========================================
// 对齐: sales_metric 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierMetric {
    pub metric_id: String,     // 记录 ID（UUID）
    pub batch_id: String,      // 导入批次 ID
    pub supplier: Supplier,    // 供应商
    pub date: NaiveDate,       // 销售日期
    pub branch_number: String, // 门店编号
    pub staff_code: String,    // 员工代码
    pub quantity: f64,
    pub sales: f64,
    pub margin: f64,
}
