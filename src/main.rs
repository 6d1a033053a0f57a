//! 上期所库存数据后端服务
//!
//! 提供上海期货交易所注册仓单与库存数据的 RESTful API 服务
//! 数据来源：上海期货交易所网站（旧版周报表格、新版日报 JSON）

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::futures::{
    beijing_today, HttpFetcher, ShfeInventoryService, SourceFormat, TradingCalendar,
};

/// 应用程序入口
///
/// 加载配置与交易日历后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_note) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    log::info!("{}", config_note);
    config.validate()?;

    // 交易日历加载失败时直接退出
    let calendar = TradingCalendar::from_file(&config.data.calendar_path)
        .with_context(|| format!("加载交易日历 {} 失败", config.data.calendar_path))?;
    calendar
        .ensure_covers(SourceFormat::first_date())
        .context("交易日历未覆盖上期所仓单数据起始日期")?;
    log::info!("📅 已加载 {} 个交易日", calendar.len());
    if let Some(last) = calendar.last_day() {
        if last < beijing_today() {
            log::warn!("交易日历只到 {}，之后的日期都视为非交易日", last.format("%Y%m%d"));
        }
    }

    let fetcher = HttpFetcher::new(config.api.timeout_secs, config.api.connect_timeout_secs)
        .context("创建 HTTP 客户端失败")?;
    let service = web::Data::new(ShfeInventoryService::new(
        Arc::new(calendar),
        Arc::new(fetcher),
        config.data.shfe_base_url.clone(),
    ));

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API Key，接口不启用认证");
    }
    let api_key = config.api.api_key.clone();

    log::info!("🚀 启动上期所库存数据服务: {}", config.bind_addr());

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default()) // 请求日志
            .wrap(ApiKeyMiddleware::new(api_key.clone())) // API Key 认证
            .configure(handlers::config) // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
