//! 公共常量和辅助函数

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;
use regex::Regex;

use super::error::InventoryError;

// ==================== 上期所数据源常量 ====================

/// 上期所官网地址
pub const SHFE_BASE_URL: &str = "https://www.shfe.com.cn";
/// 旧版库存周报页面（HTML 表格），{date} 为 YYYYMMDD
pub const SHFE_INV_PATH_1: &str = "/data/dailydata/{date}dailystock.html";
/// 新版库存日报接口（JSON）
pub const SHFE_INV_PATH_2: &str = "/data/tradedata/future/dailydata/{date}dailystock.dat";

/// 浏览器 User-Agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 当前北京时间
pub fn beijing_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

pub fn beijing_today() -> NaiveDate {
    beijing_now().date_naive()
}

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    beijing_now().to_rfc3339()
}

/// 解析交易日期，支持 YYYYMMDD 与 YYYY-MM-DD
pub fn convert_date(input: &str) -> Result<NaiveDate, InventoryError> {
    let s = input.trim();
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| InventoryError::InvalidDate(s.to_string()))
}

/// 日期格式化为 YYYYMMDD
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 可转换为交易日期的输入：字符串或 `NaiveDate`
pub trait ToTradeDate {
    fn to_trade_date(&self) -> Result<NaiveDate, InventoryError>;
}

impl ToTradeDate for NaiveDate {
    fn to_trade_date(&self) -> Result<NaiveDate, InventoryError> {
        Ok(*self)
    }
}

impl ToTradeDate for &str {
    fn to_trade_date(&self) -> Result<NaiveDate, InventoryError> {
        convert_date(self)
    }
}

impl ToTradeDate for String {
    fn to_trade_date(&self) -> Result<NaiveDate, InventoryError> {
        convert_date(self)
    }
}

/// 从合约代码中提取品种代码，如 cu2405 -> CU
pub fn extract_variety(symbol: &str) -> String {
    let re = Regex::new(r"^\s*([A-Za-z]+)").unwrap();
    re.captures(symbol)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_default()
}

/// 去掉品种名称中的括号，如 "沥青(厂库)" -> "沥青厂库"
pub fn strip_parens(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '(' | ')' | '（' | '）'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// 中文品种名称与英文代码对照表
///
/// 上期所旧版周报中沥青分为仓库、厂库两栏，厂库单独记为 BU2
const COMMODITY_CODES: &[(&str, &str)] = &[
    // 上海期货交易所
    ("铜", "CU"),
    ("铝", "AL"),
    ("锌", "ZN"),
    ("铅", "PB"),
    ("镍", "NI"),
    ("锡", "SN"),
    ("黄金", "AU"),
    ("白银", "AG"),
    ("螺纹钢", "RB"),
    ("线材", "WR"),
    ("热轧卷板", "HC"),
    ("热轧板卷", "HC"),
    ("燃料油", "FU"),
    ("沥青", "BU"),
    ("石油沥青", "BU"),
    ("沥青仓库", "BU"),
    ("沥青厂库", "BU2"),
    ("天然橡胶", "RU"),
    ("橡胶", "RU"),
    ("纸浆", "SP"),
    ("不锈钢", "SS"),
    ("氧化铝", "AO"),
    ("丁二烯橡胶", "BR"),
    ("合成橡胶", "BR"),
    ("铸造铝合金", "AD"),
    // 上海国际能源交易中心
    ("原油", "SC"),
    ("20号胶", "NR"),
    ("低硫燃料油", "LU"),
    ("国际铜", "BC"),
    ("集运指数欧线", "EC"),
    // 大连商品交易所
    ("豆一", "A"),
    ("豆二", "B"),
    ("豆粕", "M"),
    ("豆油", "Y"),
    ("玉米", "C"),
    ("玉米淀粉", "CS"),
    ("棕榈油", "P"),
    ("鸡蛋", "JD"),
    ("聚乙烯", "L"),
    ("聚氯乙烯", "V"),
    ("聚丙烯", "PP"),
    ("焦炭", "J"),
    ("焦煤", "JM"),
    ("铁矿石", "I"),
    ("乙二醇", "EG"),
    ("苯乙烯", "EB"),
    ("液化石油气", "PG"),
    ("生猪", "LH"),
    // 郑州商品交易所
    ("白糖", "SR"),
    ("棉花", "CF"),
    ("PTA", "TA"),
    ("菜籽油", "OI"),
    ("菜油", "OI"),
    ("菜籽粕", "RM"),
    ("菜粕", "RM"),
    ("甲醇", "MA"),
    ("玻璃", "FG"),
    ("动力煤", "ZC"),
    ("硅铁", "SF"),
    ("锰硅", "SM"),
    ("苹果", "AP"),
    ("红枣", "CJ"),
    ("尿素", "UR"),
    ("纯碱", "SA"),
    ("短纤", "PF"),
    ("涤纶短纤", "PF"),
    ("花生", "PK"),
    ("棉纱", "CY"),
    ("强麦", "WH"),
    ("普麦", "PM"),
    ("烧碱", "SH"),
    // 广州期货交易所
    ("工业硅", "SI"),
    ("碳酸锂", "LC"),
];

/// 中文品种名称到英文代码的映射，未收录时返回 None
pub fn chinese_to_english(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if let Some((_, code)) = COMMODITY_CODES.iter().find(|(cn, _)| *cn == name) {
        return Some(*code);
    }

    // 郑商所品种名称常带英文后缀，如 "菜籽油OI"
    let stripped: String = name.chars().filter(|c| !c.is_ascii_alphanumeric()).collect();
    if !stripped.is_empty() && stripped != name {
        return COMMODITY_CODES
            .iter()
            .find(|(cn, _)| *cn == stripped)
            .map(|(_, code)| *code);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2014, 5, 16).unwrap();
        assert_eq!(convert_date("20140516").unwrap(), expected);
        assert_eq!(convert_date("2014-05-16").unwrap(), expected);
        assert_eq!(convert_date(" 20140516 ").unwrap(), expected);
        assert_eq!("2014-05-16".to_trade_date().unwrap(), expected);
        assert_eq!(expected.to_trade_date().unwrap(), expected);
        assert_eq!(compact_date(expected), "20140516");
    }

    #[test]
    fn test_convert_date_invalid() {
        assert!(matches!(
            convert_date("2014/05/16"),
            Err(InventoryError::InvalidDate(_))
        ));
        assert!(convert_date("20141332").is_err());
        assert!(convert_date("").is_err());
    }

    #[test]
    fn test_chinese_to_english_shfe_labels() {
        assert_eq!(chinese_to_english("铜"), Some("CU"));
        assert_eq!(chinese_to_english("沥青仓库"), Some("BU"));
        assert_eq!(chinese_to_english("沥青厂库"), Some("BU2"));
        assert_eq!(chinese_to_english("天然橡胶"), Some("RU"));
        assert_eq!(chinese_to_english("黄金"), Some("AU"));
        assert_eq!(chinese_to_english("菜籽油OI"), Some("OI"));
        assert_eq!(chinese_to_english("钯金"), None);
        assert_eq!(chinese_to_english("OI"), None);
    }

    #[test]
    fn test_extract_variety_and_strip_parens() {
        assert_eq!(extract_variety("cu2405"), "CU");
        assert_eq!(extract_variety("RB"), "RB");
        assert_eq!(extract_variety("2405"), "");
        assert_eq!(strip_parens("沥青(厂库)"), "沥青厂库");
        assert_eq!(strip_parens("沥青（仓库）"), "沥青仓库");
    }
}
