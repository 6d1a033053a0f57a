//! 上海期货交易所注册仓单与库存数据
//!
//! 对应 akshare 的 get_shfe_inv() 系列函数。交易所网站前后有两种格式：
//! - 20081006 至 20140516：HTML 周报表格，见 [`legacy`]
//! - 20140516 之后：JSON 日报接口，见 [`modern`]
//!
//! 区间查询逐日进行：交易日历 -> 格式选择 -> 对应解析器 -> 按日期顺序拼接。

mod legacy;
mod modern;

pub use legacy::{CommodityGroup, ColumnLayout, LegacyCommodity, KNOWN_CORRUPT_DATES};

use chrono::NaiveDate;
use std::sync::Arc;

use super::calendar::TradingCalendar;
use super::common::{beijing_now, compact_date, ToTradeDate, SHFE_INV_PATH_1, SHFE_INV_PATH_2};
use super::error::InventoryError;
use super::fetch::PageFetcher;
use super::symbols::Exchange;
use crate::models::{DayOutcome, InventoryReport, SkipReason};

/// 适用的数据格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Legacy,
    Modern,
}

impl SourceFormat {
    /// 上期所从该日起每交易日发布仓单数据
    pub fn first_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2008, 10, 6).expect("常量日期有效")
    }

    /// 旧版表格的最后一个交易日（含）
    pub fn legacy_last_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 5, 16).expect("常量日期有效")
    }

    /// 早于数据起始日期时返回 None
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        if date < Self::first_date() {
            None
        } else if date <= Self::legacy_last_date() {
            Some(SourceFormat::Legacy)
        } else {
            Some(SourceFormat::Modern)
        }
    }
}

/// 解析库存数量，兼容千分位逗号与 "1200.0" 这类整数值浮点写法
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u64>().ok().or_else(|| {
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

/// 上期所库存数据服务
///
/// 交易日历与抓取实现在启动时构造后注入，服务本身不持有可变状态。
pub struct ShfeInventoryService {
    calendar: Arc<TradingCalendar>,
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl ShfeInventoryService {
    pub fn new(
        calendar: Arc<TradingCalendar>,
        fetcher: Arc<dyn PageFetcher>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            calendar,
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    fn legacy_url(&self, day: &str) -> String {
        format!("{}{}", self.base_url, SHFE_INV_PATH_1.replace("{date}", day))
    }

    fn modern_url(&self, day: &str) -> String {
        format!("{}{}", self.base_url, SHFE_INV_PATH_2.replace("{date}", day))
    }

    /// 获取单个交易日的库存数据
    ///
    /// date: YYYYMMDD、YYYY-MM-DD 或 `NaiveDate`
    /// vars: 品种代码列表，只用于判断是否包含上期所品种
    pub async fn daily(
        &self,
        date: impl ToTradeDate,
        vars: &[String],
    ) -> Result<DayOutcome, InventoryError> {
        let date = date.to_trade_date()?;
        if !self.calendar.is_trading_day(date) {
            log::warn!("{}非交易日", compact_date(date));
            return Ok(DayOutcome::Skipped(SkipReason::NonTradingDay));
        }
        self.dispatch(date, vars).await
    }

    /// 按日期选择数据格式并调用对应解析器（不检查交易日历）
    pub async fn dispatch(
        &self,
        date: NaiveDate,
        vars: &[String],
    ) -> Result<DayOutcome, InventoryError> {
        let Some(format) = SourceFormat::for_date(date) else {
            log::info!(
                "20081006起，上期所每交易日更新仓单数据，{} 无数据",
                compact_date(date)
            );
            return Ok(DayOutcome::Skipped(SkipReason::UnsupportedDateRange));
        };

        let shfe_vars = Exchange::Shfe.filter_symbols(vars);
        if shfe_vars.is_empty() {
            log::debug!("{} 请求的品种中没有上期所品种，跳过", compact_date(date));
            return Ok(DayOutcome::Skipped(SkipReason::NoValidSymbols));
        }

        match format {
            SourceFormat::Legacy => self.legacy_inventory(date).await,
            SourceFormat::Modern => self.modern_inventory(date).await,
        }
    }

    /// 大宗商品注册仓单数量（日期区间，首尾均包含）
    /// 对应 akshare 的 get_shfe_inv() 函数
    ///
    /// start: 为空时为当天（北京时间）
    /// end: 为空时为最近有数据的交易日
    ///
    /// 请求失败的日期记为跳过并继续；表格结构异常等错误直接返回。
    pub async fn range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        vars: &[String],
    ) -> Result<InventoryReport, InventoryError> {
        let now = beijing_now();
        let start = start.unwrap_or_else(|| now.date_naive());
        let end = match end {
            Some(end) => end,
            None => match self.calendar.latest_data_date(now.naive_local()) {
                Some(end) => end,
                None => return Ok(InventoryReport::default()),
            },
        };

        log::info!(
            "📡 获取上期所库存数据: {} 至 {}",
            compact_date(start),
            compact_date(end)
        );

        let mut report = InventoryReport::default();
        let mut current = start;
        while current <= end {
            let outcome = match self.daily(current, vars).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_recoverable() => {
                    log::warn!("⚠️ {} 数据获取失败: {}", compact_date(current), e);
                    DayOutcome::Skipped(SkipReason::FetchFailed(e.to_string()))
                }
                Err(e) => return Err(e),
            };
            report.push(current, outcome);

            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        log::info!(
            "📊 共获取 {} 条库存数据，跳过 {} 天",
            report.records.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
