//! 期货接口处理器
//!
//! 提供上期所库存数据的 HTTP API 端点
//!
//! ## API 列表
//! - GET /futures/inventory/shfe - 日期区间库存数据
//! - GET /futures/inventory/shfe/commodities - 旧版周报品种及列布局
//! - GET /futures/inventory/shfe/{date} - 单日库存数据

use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;

use crate::models::{
    ApiResponse, InventoryReport, LegacyCommodityInfo, ShfeInventoryDailyQuery,
    ShfeInventoryQuery,
};
use crate::services::futures::{
    chinese_to_english, contract_symbols, convert_date, parse_vars, InventoryError,
    LegacyCommodity, ShfeInventoryService,
};

/// 品种参数为空时请求所有品种
fn requested_vars(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_vars(raw),
        _ => contract_symbols(),
    }
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, InventoryError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(convert_date)
        .transpose()
}

fn error_response(e: InventoryError) -> HttpResponse {
    let response = ApiResponse::<InventoryReport>::error(e.to_string());
    match e {
        InventoryError::InvalidDate(_) => HttpResponse::BadRequest().json(response),
        _ => HttpResponse::InternalServerError().json(response),
    }
}

fn report_response(report: InventoryReport) -> HttpResponse {
    let message = if report.skipped.is_empty() {
        "Success".to_string()
    } else {
        format!("{} 天无数据", report.skipped.len())
    };
    HttpResponse::Ok().json(ApiResponse::success(report).with_message(message))
}

/// 获取上期所注册仓单与库存数据（日期区间）
/// GET /futures/inventory/shfe?start_date=20140102&end_date=20140110&vars=CU,AL
/// 对应 akshare 的 get_shfe_inv()
pub async fn get_shfe_inventory(
    service: web::Data<ShfeInventoryService>,
    query: web::Query<ShfeInventoryQuery>,
) -> Result<HttpResponse> {
    let dates = parse_optional_date(query.start_date.as_deref())
        .and_then(|start| Ok((start, parse_optional_date(query.end_date.as_deref())?)));
    let (start, end) = match dates {
        Ok(dates) => dates,
        Err(e) => return Ok(error_response(e)),
    };
    let vars = requested_vars(query.vars.as_deref());

    match service.range(start, end, &vars).await {
        Ok(report) => Ok(report_response(report)),
        Err(e) => Ok(error_response(e)),
    }
}

/// 获取上期所单日库存数据
/// GET /futures/inventory/shfe/{date}?vars=CU
pub async fn get_shfe_inventory_daily(
    service: web::Data<ShfeInventoryService>,
    path: web::Path<String>,
    query: web::Query<ShfeInventoryDailyQuery>,
) -> Result<HttpResponse> {
    let date = match convert_date(&path.into_inner()) {
        Ok(date) => date,
        Err(e) => return Ok(error_response(e)),
    };
    let vars = requested_vars(query.vars.as_deref());

    match service.daily(date, &vars).await {
        Ok(outcome) => {
            let mut report = InventoryReport::default();
            report.push(date, outcome);
            Ok(report_response(report))
        }
        Err(e) => Ok(error_response(e)),
    }
}

/// 获取旧版周报品种及列布局
/// GET /futures/inventory/shfe/commodities
pub async fn get_legacy_commodities() -> Result<HttpResponse> {
    let data: Vec<LegacyCommodityInfo> = LegacyCommodity::ALL
        .iter()
        .map(|commodity| {
            let group = commodity.group();
            let layout = group.layout();
            LegacyCommodityInfo {
                var: chinese_to_english(commodity.label())
                    .unwrap_or_default()
                    .to_string(),
                var_label: commodity.label().to_string(),
                group: group.name().to_string(),
                spot_column: layout.spot,
                warrant_column: layout.warrant,
                stocks_column: layout.stocks,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// 配置期货相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/futures")
            // 上期所库存
            .route("/inventory/shfe", web::get().to(get_shfe_inventory))
            .route("/inventory/shfe/commodities", web::get().to(get_legacy_commodities))
            .route("/inventory/shfe/{date}", web::get().to(get_shfe_inventory_daily)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::futures::testing::StaticFetcher;
    use crate::services::futures::TradingCalendar;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    const GOLD_PAGE: &str =
        "<table><tr><td>品种：黄金</td></tr><tr><td>总 计</td><td>12</td></tr></table>";

    fn service() -> web::Data<ShfeInventoryService> {
        let fetcher = StaticFetcher::default().with_body(
            "http://shfe.test/data/dailydata/20140102dailystock.html",
            GOLD_PAGE,
        );
        let calendar = TradingCalendar::from_dates([convert_date("20140102").unwrap()]);
        web::Data::new(ShfeInventoryService::new(
            Arc::new(calendar),
            Arc::new(fetcher),
            "http://shfe.test",
        ))
    }

    #[actix_web::test]
    async fn test_requested_vars() {
        assert_eq!(requested_vars(Some("cu, al2405")), vec!["CU", "AL"]);
        assert_eq!(requested_vars(None), contract_symbols());
        assert_eq!(requested_vars(Some("  ")), contract_symbols());
    }

    #[actix_web::test]
    async fn test_daily_endpoint() {
        let app = test::init_service(App::new().app_data(service()).configure(config)).await;
        let req = test::TestRequest::get()
            .uri("/futures/inventory/shfe/2014-01-02?vars=au")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["records"][0]["var"], "AU");
        assert_eq!(body["data"]["records"][0]["var_label"], "黄金");
        assert_eq!(body["data"]["records"][0]["warrant_inventory"], 12);
        assert_eq!(body["data"]["records"][0]["date"], "20140102");
    }

    #[actix_web::test]
    async fn test_range_endpoint_reports_skipped_days() {
        let app = test::init_service(App::new().app_data(service()).configure(config)).await;
        let req = test::TestRequest::get()
            .uri("/futures/inventory/shfe?start_date=20140102&end_date=20140104&vars=AU")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["skipped"][0]["date"], "20140103");
        assert_eq!(body["data"]["skipped"][0]["reason"], "non_trading_day");
        assert_eq!(body["message"], "2 天无数据");
    }

    #[actix_web::test]
    async fn test_invalid_date_is_bad_request() {
        let app = test::init_service(App::new().app_data(service()).configure(config)).await;
        for uri in [
            "/futures/inventory/shfe?start_date=2014/01/02",
            "/futures/inventory/shfe?start_date=20140102&end_date=abc",
            "/futures/inventory/shfe/201401",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_commodities_endpoint() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get()
            .uri("/futures/inventory/shfe/commodities")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 15);
        let copper = data.iter().find(|c| c["var_label"] == "铜").unwrap();
        assert_eq!(copper["var"], "CU");
        assert_eq!(copper["group"], "oil_like");
        assert_eq!(copper["spot_column"], 4);
        assert_eq!(copper["stocks_column"], 9);
    }
}
