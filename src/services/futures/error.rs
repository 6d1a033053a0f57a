//! 库存数据错误类型

use thiserror::Error;

/// 上期所库存数据获取过程中的错误
///
/// `Transport` 和 `Decode` 属于可恢复错误，区间遍历时记录为跳过日期；
/// 其余错误说明页面结构与预期不符，需要直接向上抛出。
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("无效的日期格式: {0}，支持 YYYYMMDD 或 YYYY-MM-DD")]
    InvalidDate(String),

    #[error("请求失败: {0}")]
    Transport(String),

    #[error("JSON解析失败: {0}")]
    Decode(String),

    #[error("表格结构异常: {0}")]
    StructuralParse(String),

    #[error("字段 {field} 的值无法解析为整数: {value}")]
    MalformedValue { field: String, value: String },

    #[error("未找到品种 {0} 对应的英文代码")]
    UnmappedCommodity(String),

    #[error("交易日历加载失败: {0}")]
    Calendar(String),
}

impl InventoryError {
    /// 单日失败是否可以跳过而不中断区间遍历
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }
}

impl From<reqwest::Error> for InventoryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
