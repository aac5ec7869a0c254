// ==========================================
// 零售销售数据导入 - 列定义（固定 16 列）
// ==========================================
// 顺序: Date, Branch Number, Staff Code,
//       4 家供应商 × (Quantity, Sales, Margin),
//       Likewize Device Quantity
// 校验与处理共用此定义
// ==========================================

use crate::domain::CellValue;
use crate::importer::cell_validator::{
    validate_branch_number, validate_date, validate_number, validate_staff_code, CellCheck,
    ValidationContext,
};
use crate::importer::date_parser::SALES_DATE_FORMAT;
use serde::Serialize;

pub const COLUMN_COUNT: usize = 16;

// 列下标
pub const DATE_COLUMN: usize = 0;
pub const BRANCH_NUMBER_COLUMN: usize = 1;
pub const STAFF_CODE_COLUMN: usize = 2;
pub const FIRST_FIGURE_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Date,
    String,
    Number,
}

// ==========================================
// CellRule - 列绑定的校验规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellRule {
    Date,
    BranchNumber,
    StaffCode,
    Quantity,
    Money,
}

impl CellRule {
    pub fn check(&self, value: &CellValue, ctx: &ValidationContext) -> CellCheck {
        match self {
            CellRule::Date => validate_date(value, ctx.today),
            CellRule::BranchNumber => validate_branch_number(value, ctx.branch_number_max_len),
            CellRule::StaffCode => validate_staff_code(value, ctx.staff_code_max_len),
            CellRule::Quantity => validate_number(value, true),
            CellRule::Money => validate_number(value, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
    pub rule: CellRule,
    pub format: Option<&'static str>,
}

const fn date(name: &'static str) -> ColumnDefinition {
    ColumnDefinition {
        name,
        column_type: ColumnType::Date,
        required: true,
        rule: CellRule::Date,
        format: Some(SALES_DATE_FORMAT),
    }
}

const fn code(name: &'static str, rule: CellRule) -> ColumnDefinition {
    ColumnDefinition {
        name,
        column_type: ColumnType::String,
        required: true,
        rule,
        format: Some("letters, numbers and hyphens"),
    }
}

const fn quantity(name: &'static str) -> ColumnDefinition {
    ColumnDefinition {
        name,
        column_type: ColumnType::Number,
        required: false,
        rule: CellRule::Quantity,
        format: Some("whole number"),
    }
}

const fn money(name: &'static str) -> ColumnDefinition {
    ColumnDefinition {
        name,
        column_type: ColumnType::Number,
        required: false,
        rule: CellRule::Money,
        format: Some("number with up to 2 decimal places"),
    }
}

/// 销售数据表的列定义
pub const SALES_COLUMNS: [ColumnDefinition; COLUMN_COUNT] = [
    date("Date"),
    code("Branch Number", CellRule::BranchNumber),
    code("Staff Code", CellRule::StaffCode),
    quantity("Cellnet Quantity"),
    money("Cellnet Sales"),
    money("Cellnet Margin"),
    quantity("Likewize Acc Quantity"),
    money("Likewize Acc Sales"),
    money("Likewize Acc Margin"),
    quantity("Pacificomm Quantity"),
    money("Pacificomm Sales"),
    money("Pacificomm Margin"),
    quantity("Studiotech Quantity"),
    money("Studiotech Sales"),
    money("Studiotech Margin"),
    quantity("Likewize Device Quantity"),
];

/// 期望的表头文本
pub fn expected_headers() -> impl Iterator<Item = &'static str> {
    SALES_COLUMNS.iter().map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Supplier;

    #[test]
    fn test_schema_shape() {
        assert_eq!(SALES_COLUMNS.len(), COLUMN_COUNT);
        assert_eq!(SALES_COLUMNS[DATE_COLUMN].name, "Date");
        assert_eq!(SALES_COLUMNS[BRANCH_NUMBER_COLUMN].name, "Branch Number");
        assert_eq!(SALES_COLUMNS[STAFF_CODE_COLUMN].name, "Staff Code");
        assert_eq!(SALES_COLUMNS[15].name, "Likewize Device Quantity");
        let required: Vec<_> = SALES_COLUMNS.iter().filter(|c| c.required).map(|c| c.name).collect();
        assert_eq!(required, vec!["Date", "Branch Number", "Staff Code"]);
    }

    #[test]
    fn test_supplier_triples_follow_display_names() {
        for (i, supplier) in Supplier::ALL[..4].iter().enumerate() {
            let base = FIRST_FIGURE_COLUMN + i * 3;
            let name = supplier.display_name();
            assert_eq!(SALES_COLUMNS[base].name, format!("{} Quantity", name));
            assert_eq!(SALES_COLUMNS[base + 1].name, format!("{} Sales", name));
            assert_eq!(SALES_COLUMNS[base + 2].name, format!("{} Margin", name));
            assert_eq!(SALES_COLUMNS[base].rule, CellRule::Quantity);
            assert_eq!(SALES_COLUMNS[base + 1].rule, CellRule::Money);
        }
    }
}
