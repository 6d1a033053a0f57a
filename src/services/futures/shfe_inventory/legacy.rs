//! 旧版库存周报（2008-10-06 至 2014-05-16）
//!
//! 页面是一张合并的大表，每个品种占一段连续行：
//! 以 "品种：铜" 之类的行开头，以 "总 计" 行结束（部分品种以 "注:" 行的上一行结束）。
//! 各品种组的列布局不同，按品种静态映射。

use chrono::NaiveDate;

use super::{parse_count, ShfeInventoryService};
use crate::models::{DayOutcome, InventoryRecord, SkipReason};
use crate::services::futures::common::{chinese_to_english, compact_date};
use crate::services::futures::error::InventoryError;

/// 交易所源数据缺失的日期
pub const KNOWN_CORRUPT_DATES: [&str; 2] = ["20100416", "20130821"];

const TOTAL_MARKER: &str = "总 计";
const NOTE_MARKER: &str = "注:";

/// 列布局分组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommodityGroup {
    /// 现货、仓单、库存总量三项齐全
    OilLike,
    /// 只有仓单与库存总量
    PlatesLike,
    /// 只有仓单
    GoldLike,
}

/// 分组对应的列号，None 表示该项不公布，记为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub spot: Option<usize>,
    pub warrant: usize,
    pub stocks: Option<usize>,
}

impl CommodityGroup {
    pub fn name(self) -> &'static str {
        match self {
            CommodityGroup::OilLike => "oil_like",
            CommodityGroup::PlatesLike => "plates_like",
            CommodityGroup::GoldLike => "gold_like",
        }
    }

    pub fn layout(self) -> ColumnLayout {
        match self {
            CommodityGroup::OilLike => ColumnLayout {
                spot: Some(4),
                warrant: 5,
                stocks: Some(9),
            },
            CommodityGroup::PlatesLike => ColumnLayout {
                spot: None,
                warrant: 3,
                stocks: Some(6),
            },
            CommodityGroup::GoldLike => ColumnLayout {
                spot: None,
                warrant: 1,
                stocks: None,
            },
        }
    }
}

/// 旧版周报中出现的 15 个品种
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCommodity {
    NaturalRubber,
    AsphaltWarehouse,
    AsphaltFactory,
    HotRolledCoil,
    FuelOil,
    Silver,
    WireRod,
    Rebar,
    Lead,
    Copper,
    Aluminium,
    Zinc,
    Gold,
    Tin,
    Nickel,
}

impl LegacyCommodity {
    pub const ALL: [LegacyCommodity; 15] = [
        LegacyCommodity::NaturalRubber,
        LegacyCommodity::AsphaltWarehouse,
        LegacyCommodity::AsphaltFactory,
        LegacyCommodity::HotRolledCoil,
        LegacyCommodity::FuelOil,
        LegacyCommodity::Silver,
        LegacyCommodity::WireRod,
        LegacyCommodity::Rebar,
        LegacyCommodity::Lead,
        LegacyCommodity::Copper,
        LegacyCommodity::Aluminium,
        LegacyCommodity::Zinc,
        LegacyCommodity::Gold,
        LegacyCommodity::Tin,
        LegacyCommodity::Nickel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LegacyCommodity::NaturalRubber => "天然橡胶",
            LegacyCommodity::AsphaltWarehouse => "沥青仓库",
            LegacyCommodity::AsphaltFactory => "沥青厂库",
            LegacyCommodity::HotRolledCoil => "热轧卷板",
            LegacyCommodity::FuelOil => "燃料油",
            LegacyCommodity::Silver => "白银",
            LegacyCommodity::WireRod => "线材",
            LegacyCommodity::Rebar => "螺纹钢",
            LegacyCommodity::Lead => "铅",
            LegacyCommodity::Copper => "铜",
            LegacyCommodity::Aluminium => "铝",
            LegacyCommodity::Zinc => "锌",
            LegacyCommodity::Gold => "黄金",
            LegacyCommodity::Tin => "锡",
            LegacyCommodity::Nickel => "镍",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn group(self) -> CommodityGroup {
        match self {
            LegacyCommodity::AsphaltWarehouse
            | LegacyCommodity::FuelOil
            | LegacyCommodity::NaturalRubber
            | LegacyCommodity::Lead
            | LegacyCommodity::Copper
            | LegacyCommodity::Aluminium
            | LegacyCommodity::Zinc
            | LegacyCommodity::Tin
            | LegacyCommodity::Nickel => CommodityGroup::OilLike,
            LegacyCommodity::AsphaltFactory
            | LegacyCommodity::HotRolledCoil
            | LegacyCommodity::Silver
            | LegacyCommodity::WireRod
            | LegacyCommodity::Rebar => CommodityGroup::PlatesLike,
            LegacyCommodity::Gold => CommodityGroup::GoldLike,
        }
    }
}

/// 表格中属于同一品种的行区间 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawSection {
    commodity: LegacyCommodity,
    start: usize,
    end: usize,
}

impl RawSection {
    fn to_record(self, rows: &[Vec<String>], day: &str) -> Result<InventoryRecord, InventoryError> {
        let label = self.commodity.label();
        let last_row = &rows[self.end];
        let layout = self.commodity.group().layout();

        let read = |col: Option<usize>| -> Result<u64, InventoryError> {
            let Some(col) = col else { return Ok(0) };
            let cell = last_row.get(col).ok_or_else(|| {
                InventoryError::StructuralParse(format!(
                    "{} {} 第 {} 行缺少第 {} 列",
                    day, label, self.end, col
                ))
            })?;
            parse_count(cell).ok_or_else(|| {
                InventoryError::StructuralParse(format!(
                    "{} {} 第 {} 行第 {} 列不是整数: {:?}",
                    day, label, self.end, col, cell
                ))
            })
        };

        let code = chinese_to_english(label)
            .ok_or_else(|| InventoryError::UnmappedCommodity(label.to_string()))?;

        Ok(InventoryRecord {
            commodity_code: code.to_string(),
            commodity_label: label.to_string(),
            spot_inventory: read(layout.spot)?,
            warrant_inventory: read(Some(layout.warrant))?,
            warehouse_stocks: read(layout.stocks)?,
            trading_date: day.to_string(),
        })
    }
}

/// 品种行的名称：取最后一个全角冒号之后的部分
///
/// 半角冒号只出现在 "注:" 注释行中，不作为品种行处理
fn section_label(cell: &str) -> &str {
    cell.rsplit('：').next().unwrap_or(cell).trim()
}

/// 扫描表格，按出现顺序把第 i 个品种行与第 i 个结束行配对
fn locate_sections(rows: &[Vec<String>]) -> Result<Vec<RawSection>, InventoryError> {
    let mut starts: Vec<(usize, LegacyCommodity)> = Vec::new();
    let mut ends: Vec<usize> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let label = row.first().map(String::as_str).unwrap_or("");
        if let Some(commodity) = LegacyCommodity::from_label(section_label(label)) {
            starts.push((i, commodity));
            continue;
        }
        if label.contains(TOTAL_MARKER) {
            ends.push(i);
        } else if label.contains(NOTE_MARKER) && i > 0 && !ends.contains(&(i - 1)) {
            ends.push(i - 1);
        }
    }

    if starts.len() != ends.len() {
        return Err(InventoryError::StructuralParse(format!(
            "品种起始行 {} 个，合计行 {} 个，无法配对",
            starts.len(),
            ends.len()
        )));
    }

    let mut sections = Vec::with_capacity(starts.len());
    for (i, (&(start, commodity), &end)) in starts.iter().zip(ends.iter()).enumerate() {
        let next_start = starts.get(i + 1).map(|(s, _)| *s).unwrap_or(usize::MAX);
        if end < start || end >= next_start {
            return Err(InventoryError::StructuralParse(format!(
                "{} 的合计行（第 {} 行）不在品种区间内（起始第 {} 行）",
                commodity.label(),
                end,
                start
            )));
        }
        sections.push(RawSection {
            commodity,
            start,
            end,
        });
    }

    Ok(sections)
}

/// 解析旧版周报表格
pub(crate) fn parse_legacy_table(
    rows: &[Vec<String>],
    day: &str,
) -> Result<Vec<InventoryRecord>, InventoryError> {
    locate_sections(rows)?
        .into_iter()
        .map(|section| section.to_record(rows, day))
        .collect()
}

impl ShfeInventoryService {
    /// 上期所旧版库存周报
    /// 对应 akshare 的 get_shfe_inv_1() 函数
    /// 适用 20081006 至 20140516，20100416、20130821 交易所数据丢失
    pub async fn legacy_inventory(&self, date: NaiveDate) -> Result<DayOutcome, InventoryError> {
        let day = compact_date(date);
        if KNOWN_CORRUPT_DATES.contains(&day.as_str()) {
            log::warn!("{} 上期所库存数据丢失，跳过", day);
            return Ok(DayOutcome::Skipped(SkipReason::KnownDataCorruption));
        }

        let rows = self.fetcher.fetch_table(&self.legacy_url(&day)).await?;
        let records = parse_legacy_table(&rows, &day)?;

        log::info!("📊 {} 解析到 {} 个品种的库存数据", day, records.len());
        Ok(DayOutcome::Records(records))
    }
}
