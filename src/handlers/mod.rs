pub mod futures;
pub mod health;

use actix_web::web;

/// 所有接口挂在 /api/v1 下
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(futures::config),
    );
}
