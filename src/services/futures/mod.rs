//! 期货数据服务
//!
//! 提供上海期货交易所注册仓单与库存数据的获取和处理逻辑，参考 akshare 实现
//!
//! ## 数据来源
//! - 上期所旧版库存周报（HTML 表格，20081006 至 20140516）
//! - 上期所库存日报接口（JSON，20140516 之后）
//!
//! ## 主要功能
//! - 交易日历与最近数据日期
//! - 品种代码映射和交易所品种列表
//! - 单日/日期区间库存数据

#![allow(dead_code)]
#![allow(unused_imports)]

mod calendar;
mod common;
mod error;
mod fetch;
mod shfe_inventory;
mod symbols;

pub use calendar::TradingCalendar;
pub use common::{
    beijing_today, chinese_to_english, compact_date, convert_date, get_beijing_time, ToTradeDate,
    SHFE_BASE_URL,
};
pub use error::InventoryError;
pub use fetch::{HttpFetcher, PageFetcher, TableRows};
pub use shfe_inventory::{
    CommodityGroup, ColumnLayout, LegacyCommodity, ShfeInventoryService, SourceFormat,
    KNOWN_CORRUPT_DATES,
};
pub use symbols::{contract_symbols, parse_vars, Exchange};

#[cfg(test)]
pub(crate) use fetch::testing;
