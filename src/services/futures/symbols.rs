//! 交易所与品种代码

use std::collections::BTreeSet;

use super::common::extract_variety;

/// 国内期货交易所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Shfe,
    Dce,
    Czce,
    Cffex,
    Gfex,
}

impl Exchange {
    pub const ALL: [Exchange; 5] = [
        Exchange::Shfe,
        Exchange::Dce,
        Exchange::Czce,
        Exchange::Cffex,
        Exchange::Gfex,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Exchange::Shfe => "SHFE",
            Exchange::Dce => "DCE",
            Exchange::Czce => "CZCE",
            Exchange::Cffex => "CFFEX",
            Exchange::Gfex => "GFEX",
        }
    }

    /// 该交易所上市的品种代码
    pub fn valid_symbols(self) -> &'static [&'static str] {
        match self {
            Exchange::Shfe => &[
                "CU", "AL", "ZN", "PB", "NI", "SN", "AU", "AG", "RB", "WR", "HC", "FU", "BU",
                "RU", "SC", "NR", "SP", "SS", "LU", "BC", "AO", "BR", "EC", "AD",
            ],
            Exchange::Dce => &[
                "C", "CS", "A", "B", "M", "Y", "P", "FB", "BB", "JD", "L", "V", "PP", "J", "JM",
                "I", "EG", "RR", "EB", "PG", "LH", "LG", "BZ",
            ],
            Exchange::Czce => &[
                "WH", "PM", "CF", "SR", "TA", "OI", "RI", "MA", "ME", "FG", "RS", "RM", "ZC",
                "JR", "LR", "SF", "SM", "WT", "TC", "GN", "RO", "ER", "SRX", "SRY", "WSX", "WSY",
                "CY", "AP", "UR", "CJ", "SA", "PK", "PF", "PX", "SH", "PR",
            ],
            Exchange::Cffex => &["IF", "IC", "IM", "IH", "T", "TF", "TS", "TL"],
            Exchange::Gfex => &["SI", "LC", "PS"],
        }
    }

    /// 过滤出属于该交易所的品种，保持请求顺序并去重
    pub fn filter_symbols(self, vars: &[String]) -> Vec<String> {
        let valid = self.valid_symbols();
        let mut seen = BTreeSet::new();
        vars.iter()
            .filter(|v| valid.contains(&v.as_str()))
            .filter(|v| seen.insert(v.as_str()))
            .cloned()
            .collect()
    }
}

/// 所有交易所的品种代码，未指定品种时的默认请求列表
pub fn contract_symbols() -> Vec<String> {
    Exchange::ALL
        .iter()
        .flat_map(|ex| ex.valid_symbols().iter())
        .map(|s| s.to_string())
        .collect()
}

/// 解析逗号分隔的品种参数，如 "cu,RB2410, al" -> ["CU", "RB", "AL"]
pub fn parse_vars(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(extract_variety)
        .filter(|v| !v.is_empty())
        .collect()
}
