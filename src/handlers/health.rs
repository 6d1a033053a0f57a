use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;
use crate::services::futures::ShfeInventoryService;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// 已加载的交易日数量
    pub calendar_days: usize,
}

pub async fn health_check(service: web::Data<ShfeInventoryService>) -> Result<HttpResponse> {
    let status = HealthStatus {
        status: "ok",
        calendar_days: service.calendar().len(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(status).with_message("Service is healthy")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
