//! 交易日历
//!
//! 启动时从 JSON 文件加载一次（YYYYMMDD 字符串数组），之后以只读方式注入各服务。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::common::convert_date;
use super::error::InventoryError;

/// 交易所每日数据的发布时间（北京时间 17:00）
const DATA_PUBLISH_HOUR: u32 = 17;

/// 预先计算好的交易日集合
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    days: BTreeSet<NaiveDate>,
}

impl TradingCalendar {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            days: dates.into_iter().collect(),
        }
    }

    /// 从 JSON 数组解析，如 `["20240102", "20240103"]`
    pub fn from_json_str(content: &str) -> Result<Self, InventoryError> {
        let raw: Vec<String> =
            serde_json::from_str(content).map_err(|e| InventoryError::Calendar(e.to_string()))?;
        let days = raw
            .iter()
            .map(|s| convert_date(s))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { days })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| InventoryError::Calendar(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// 日历需从 `from` 起覆盖，否则更早的日期都会被当作非交易日
    pub fn ensure_covers(&self, from: NaiveDate) -> Result<(), InventoryError> {
        match self.first_day() {
            Some(first) if first <= from => Ok(()),
            Some(first) => Err(InventoryError::Calendar(format!(
                "交易日历从 {} 开始，未覆盖 {}",
                first.format("%Y%m%d"),
                from.format("%Y%m%d")
            ))),
            None => Err(InventoryError::Calendar("交易日历为空".to_string())),
        }
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// 严格早于 `date` 的最近一个交易日
    pub fn previous_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.days.range(..date).next_back().copied()
    }

    /// 截至 `now`（北京时间）已发布数据的最近交易日
    ///
    /// 当天为交易日时，17:00 之前取上一交易日；非交易日取此前最近的交易日。
    pub fn latest_data_date(&self, now: NaiveDateTime) -> Option<NaiveDate> {
        let today = now.date();
        if self.is_trading_day(today) {
            let publish = NaiveTime::from_hms_opt(DATA_PUBLISH_HOUR, 0, 0)?;
            if now.time() < publish {
                self.previous_trading_day(today)
            } else {
                Some(today)
            }
        } else {
            self.previous_trading_day(today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        convert_date(s).unwrap()
    }

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        day(date).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn sample() -> TradingCalendar {
        TradingCalendar::from_json_str(r#"["20240102", "20240103", "2024-01-05"]"#).unwrap()
    }

    #[test]
    fn test_from_json_str() {
        let calendar = sample();
        assert_eq!(calendar.len(), 3);
        assert!(calendar.is_trading_day(day("20240105")));
        assert!(!calendar.is_trading_day(day("20240104")));
    }

    #[test]
    fn test_from_json_str_rejects_bad_input() {
        assert!(matches!(
            TradingCalendar::from_json_str("{}"),
            Err(InventoryError::Calendar(_))
        ));
        assert!(matches!(
            TradingCalendar::from_json_str(r#"["2024/01/02"]"#),
            Err(InventoryError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_previous_trading_day() {
        let calendar = sample();
        assert_eq!(calendar.previous_trading_day(day("20240105")), Some(day("20240103")));
        assert_eq!(calendar.previous_trading_day(day("20240102")), None);
    }

    #[test]
    fn test_latest_data_date() {
        let calendar = sample();
        // 交易日，数据尚未发布
        assert_eq!(calendar.latest_data_date(at("20240103", 10)), Some(day("20240102")));
        // 交易日，数据已发布
        assert_eq!(calendar.latest_data_date(at("20240103", 18)), Some(day("20240103")));
        // 非交易日
        assert_eq!(calendar.latest_data_date(at("20240104", 10)), Some(day("20240103")));
        assert_eq!(calendar.latest_data_date(at("20240106", 9)), Some(day("20240105")));
        assert_eq!(calendar.latest_data_date(at("20240101", 20)), None);
    }

    #[test]
    fn test_ensure_covers() {
        let calendar = sample();
        assert!(calendar.ensure_covers(day("20240101")).is_err());
        assert!(calendar.ensure_covers(day("20240102")).is_ok());
        assert!(TradingCalendar::default()
            .ensure_covers(day("20240102"))
            .is_err());
    }

    #[test]
    fn test_bundled_calendar_covers_both_formats() {
        let calendar =
            TradingCalendar::from_json_str(include_str!("../../../data/calendar.json")).unwrap();

        assert_eq!(calendar.first_day(), Some(day("20081006")));
        assert!(calendar.ensure_covers(day("20081006")).is_ok());
        // 旧版周报区间
        for d in ["20081006", "20100416", "20130821", "20140102", "20140516"] {
            assert!(calendar.is_trading_day(day(d)), "{}", d);
        }
        // 新版日报区间
        for d in ["20140519", "20150105", "20230104", "20240102"] {
            assert!(calendar.is_trading_day(day(d)), "{}", d);
        }
        // 周末与节假日
        for d in ["20140104", "20140131", "20151001", "20240212"] {
            assert!(!calendar.is_trading_day(day(d)), "{}", d);
        }
        assert!(calendar.last_day().unwrap() >= day("20241231"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = TradingCalendar::from_file("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("exist.json"));
    }
}
