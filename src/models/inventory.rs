//! 上期所库存数据模型
//!
//! 输出列与 akshare 的 get_shfe_inv() 保持一致：
//! var, var_label, spot_inventory, warrant_inventory, warehouse_stocks, date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单个品种在单个交易日的库存记录
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryRecord {
    /// 品种代码，如 CU
    #[serde(rename = "var")]
    pub commodity_code: String,
    /// 品种中文名称，如 铜
    #[serde(rename = "var_label")]
    pub commodity_label: String,
    /// 现货库存（期货库存中未注册仓单的部分）
    pub spot_inventory: u64,
    /// 仓单库存
    pub warrant_inventory: u64,
    /// 库存总量
    pub warehouse_stocks: u64,
    /// 交易日期 YYYYMMDD
    #[serde(rename = "date")]
    pub trading_date: String,
}

/// 某日未产出数据的原因
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 非交易日
    NonTradingDay,
    /// 交易所源数据缺失或损坏
    KnownDataCorruption,
    /// 早于数据起始日期
    UnsupportedDateRange,
    /// 请求的品种中没有上期所品种
    NoValidSymbols,
    /// 请求失败
    FetchFailed(String),
}

/// 单日处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    Records(Vec<InventoryRecord>),
    Skipped(SkipReason),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SkippedDate {
    pub date: String,
    pub reason: SkipReason,
}

/// 日期区间的库存数据
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct InventoryReport {
    pub records: Vec<InventoryRecord>,
    pub skipped: Vec<SkippedDate>,
}

impl InventoryReport {
    pub fn push(&mut self, date: NaiveDate, outcome: DayOutcome) {
        match outcome {
            DayOutcome::Records(records) => self.records.extend(records),
            DayOutcome::Skipped(reason) => self.skipped.push(SkippedDate {
                date: date.format("%Y%m%d").to_string(),
                reason,
            }),
        }
    }

    /// 拼接后续日期区间的结果
    pub fn append(&mut self, other: InventoryReport) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }
}

/// 上期所库存查询参数
#[derive(Debug, Deserialize)]
pub struct ShfeInventoryQuery {
    pub start_date: Option<String>,          // 开始日期 YYYYMMDD 或 YYYY-MM-DD，为空时为当天
    pub end_date: Option<String>,            // 结束日期，为空时为最近有数据的交易日
    pub vars: Option<String>,                // 品种代码列表，逗号分隔，如"CU,AL"，为空时为所有品种
}

/// 单日库存查询参数
#[derive(Debug, Deserialize)]
pub struct ShfeInventoryDailyQuery {
    pub vars: Option<String>,
}

/// 旧版周报中的品种及其列布局
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LegacyCommodityInfo {
    pub var: String,
    pub var_label: String,
    pub group: String,
    pub spot_column: Option<usize>,
    pub warrant_column: usize,
    pub stocks_column: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> InventoryRecord {
        InventoryRecord {
            commodity_code: code.to_string(),
            commodity_label: "铜".to_string(),
            spot_inventory: 1,
            warrant_inventory: 2,
            warehouse_stocks: 3,
            trading_date: "20140102".to_string(),
        }
    }

    #[test]
    fn test_record_column_names() {
        let value = serde_json::to_value(record("CU")).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "date",
                "spot_inventory",
                "var",
                "var_label",
                "warehouse_stocks",
                "warrant_inventory"
            ]
        );
    }

    #[test]
    fn test_report_push_and_append() {
        let day = NaiveDate::from_ymd_opt(2014, 1, 2).unwrap();
        let mut report = InventoryReport::default();
        report.push(day, DayOutcome::Records(vec![record("CU")]));
        report.push(day, DayOutcome::Skipped(SkipReason::NonTradingDay));

        let mut other = InventoryReport::default();
        other.push(day, DayOutcome::Records(vec![]));
        other.push(day, DayOutcome::Skipped(SkipReason::FetchFailed("404".into())));
        report.append(other);

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].date, "20140102");

        let json = serde_json::to_value(&report.skipped).unwrap();
        assert_eq!(json[0]["reason"], "non_trading_day");
        assert_eq!(json[1]["reason"]["fetch_failed"], "404");
    }
}
