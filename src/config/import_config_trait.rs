// ==========================================
// 零售销售数据导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::cell_validator::ValidationContext;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 导入历史展示条数
    ///
    /// # 默认值
    /// - 7
    async fn get_history_limit(&self) -> ImportResult<usize>;

    /// 未来日期判定的固定参照日
    ///
    /// # 返回
    /// - None: 使用本地当天（默认）
    /// - Some(date): 固定参照日（测试夹具/回放历史数据）
    async fn get_reference_date(&self) -> ImportResult<Option<NaiveDate>>;

    /// 门店编号最大长度
    ///
    /// # 默认值
    /// - 10
    async fn get_branch_number_max_len(&self) -> ImportResult<usize>;

    /// 员工代码最大长度
    ///
    /// # 默认值
    /// - 20
    async fn get_staff_code_max_len(&self) -> ImportResult<usize>;

    /// 按当前配置构建校验上下文（参照日缺省取本地当天）
    async fn validation_context(&self) -> ImportResult<ValidationContext> {
        let today = match self.get_reference_date().await? {
            Some(date) => date,
            None => chrono::Local::now().date_naive(),
        };
        Ok(ValidationContext {
            today,
            branch_number_max_len: self.get_branch_number_max_len().await?,
            staff_code_max_len: self.get_staff_code_max_len().await?,
        })
    }
}
