//! 新版库存日报（2014-05-19 起，JSON 接口）
//!
//! `o_cursor` 中每行是一个仓库的数据，同一品种的最后一行为该品种的汇总。

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{parse_count, ShfeInventoryService};
use crate::models::{DayOutcome, InventoryRecord};
use crate::services::futures::common::{chinese_to_english, compact_date, strip_parens};
use crate::services::futures::error::InventoryError;

const KEY_FIELD: &str = "VARNAME";
const SPOT_FIELD: &str = "SPOTWGHTS";
const WARRANT_FIELD: &str = "WRTWGHTS";
const STOCKS_FIELD: &str = "WHSTOCKS";

/// "铜$$Copper" -> "铜"
fn commodity_label(key: &str) -> String {
    strip_parens(key.split("$$").next().unwrap_or(key))
}

/// 读取重量字段，空字符串或缺失记为 0
fn read_weight(row: &Map<String, Value>, field: &str) -> Result<u64, InventoryError> {
    match row.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(value) => {
            let parsed = match value {
                Value::String(s) => parse_count(s),
                Value::Number(n) => n.as_u64().or_else(|| {
                    n.as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                        .map(|f| f as u64)
                }),
                _ => None,
            };
            parsed.ok_or_else(|| InventoryError::MalformedValue {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }
}

/// 解析新版日报 JSON；缺少 o_cursor 或没有任何字段时返回空表
pub(crate) fn parse_modern_payload(
    payload: &Value,
    day: &str,
) -> Result<Vec<InventoryRecord>, InventoryError> {
    let Some(cursor) = payload.get("o_cursor").and_then(Value::as_array) else {
        log::warn!("{} 上期所库存数据缺少 o_cursor 字段", day);
        return Ok(Vec::new());
    };

    let rows: Vec<&Map<String, Value>> = cursor
        .iter()
        .filter_map(Value::as_object)
        .filter(|row| !row.is_empty())
        .collect();
    if rows.is_empty() {
        log::warn!("{} 上期所库存数据为空", day);
        return Ok(Vec::new());
    }

    // 同一品种保留最后一行
    let mut latest: HashMap<&str, &Map<String, Value>> = HashMap::new();
    for &row in &rows {
        if let Some(key) = row.get(KEY_FIELD).and_then(Value::as_str) {
            latest.insert(key, row);
        }
    }
    if latest.is_empty() {
        log::warn!("{} 上期所库存数据缺少 {} 字段", day, KEY_FIELD);
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(latest.len());
    for (key, row) in latest {
        let label = commodity_label(key);
        let code = chinese_to_english(&label)
            .ok_or_else(|| InventoryError::UnmappedCommodity(label.clone()))?;

        records.push(InventoryRecord {
            commodity_code: code.to_string(),
            commodity_label: label,
            spot_inventory: read_weight(row, SPOT_FIELD)?,
            warrant_inventory: read_weight(row, WARRANT_FIELD)?,
            warehouse_stocks: read_weight(row, STOCKS_FIELD)?,
            trading_date: day.to_string(),
        });
    }

    records.sort_by(|a, b| a.commodity_code.cmp(&b.commodity_code));
    Ok(records)
}

impl ShfeInventoryService {
    /// 上期所新版库存日报
    /// 对应 akshare 的 get_shfe_inv_2() 函数
    /// 适用 20140519 至今；返回内容无法解析为 JSON 时返回空表
    pub async fn modern_inventory(&self, date: NaiveDate) -> Result<DayOutcome, InventoryError> {
        let day = compact_date(date);

        let payload = match self.fetcher.fetch_json(&self.modern_url(&day)).await {
            Ok(payload) => payload,
            Err(InventoryError::Decode(e)) => {
                log::warn!("{} 上期所库存数据无法解析: {}", day, e);
                return Ok(DayOutcome::Records(Vec::new()));
            }
            Err(e) => return Err(e),
        };

        let records = parse_modern_payload(&payload, &day)?;
        log::info!("📊 {} 解析到 {} 个品种的库存数据", day, records.len());
        Ok(DayOutcome::Records(records))
    }
}
