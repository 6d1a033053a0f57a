//! 网页抓取
//!
//! `PageFetcher` 隔离 HTTP 访问，服务层只依赖这一 trait，测试时可替换为内存实现。

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::common::{SHFE_BASE_URL, USER_AGENT};
use super::error::InventoryError;

/// 表格数据：按行排列的位置列
pub type TableRows = Vec<Vec<String>>;

/// 合并单元格跨度上限，与浏览器的处理一致
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取页面中第一个表格
    async fn fetch_table(&self, url: &str) -> Result<TableRows, InventoryError>;

    /// 获取 JSON 数据，无法解析时返回 `InventoryError::Decode`
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, InventoryError>;
}

/// 基于 reqwest 的抓取实现
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, connect_timeout_secs: u64) -> Result<Self, InventoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, InventoryError> {
        log::info!("📡 请求上期所库存数据 URL: {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Referer", format!("{}/", SHFE_BASE_URL))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InventoryError::Transport(format!(
                "获取上期所库存数据失败: {}，可能是非交易日",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(decode_body(&bytes))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_table(&self, url: &str) -> Result<TableRows, InventoryError> {
        let html = self.get_text(url).await?;
        parse_first_table(&html)
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, InventoryError> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|e| InventoryError::Decode(e.to_string()))
    }
}

/// 旧版页面为 GBK 编码，新版为 UTF-8
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => encoding_rs::GBK.decode(bytes).0.into_owned(),
    }
}

/// 将页面中第一个 `<table>` 转换为行列数据
///
/// `colspan`/`rowspan` 会被展开，合并单元格的文本复制到它覆盖的每个位置，
/// 保证同一列号在各行中指向同一栏目。
pub fn parse_first_table(html: &str) -> Result<TableRows, InventoryError> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("th, td").unwrap();

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| InventoryError::StructuralParse("页面中未找到表格".to_string()))?;

    let mut rows: TableRows = Vec::new();
    // 每列尚未消耗完的 rowspan：(文本, 剩余行数)
    let mut pending: Vec<Option<(String, usize)>> = Vec::new();

    for tr in table.select(&row_selector) {
        let mut cells = tr.select(&cell_selector);
        let mut row: Vec<String> = Vec::new();
        let mut col = 0;

        loop {
            if let Some(slot) = pending.get_mut(col) {
                if let Some((text, left)) = slot.take() {
                    row.push(text.clone());
                    if left > 1 {
                        *slot = Some((text, left - 1));
                    }
                    col += 1;
                    continue;
                }
            }

            let Some(cell) = cells.next() else {
                let more_pending = pending
                    .get(col..)
                    .map_or(false, |rest| rest.iter().any(Option::is_some));
                if more_pending {
                    row.push(String::new());
                    col += 1;
                    continue;
                }
                break;
            };

            let text = cell_text(cell);
            let colspan = span_attr(cell, "colspan", MAX_COLSPAN);
            let rowspan = span_attr(cell, "rowspan", MAX_ROWSPAN);
            for _ in 0..colspan {
                if rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    pending[col] = Some((text.clone(), rowspan - 1));
                }
                row.push(text.clone());
                col += 1;
            }
        }

        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join("")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn span_attr(cell: ElementRef, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}
