pub mod health;
pub mod helpers;
pub mod links;
pub mod redirect;
pub mod types;

use std::sync::Arc;

use actix_web::{HttpResponse, error::InternalError, web};

use crate::api::jwt::JwtService;
use crate::api::middleware::BearerAuth;
use crate::errors::SnaplinkError;

pub use health::AppStartTime;

/// API 路由
///
/// 两段路径（analytics / qr）和单段的公开跳转互不冲突，
/// 认证按 resource 挂载，跳转接口保持匿名。
pub fn api_routes(api_prefix: &str, jwt: Arc<JwtService>) -> actix_web::Scope {
    let auth = BearerAuth::new(jwt);

    web::scope(api_prefix)
        .service(
            web::resource("/links")
                .wrap(auth.clone())
                .route(web::post().to(links::create_link))
                .route(web::get().to(links::list_links)),
        )
        .service(
            web::resource("/links/{id}/analytics")
                .wrap(auth.clone())
                .route(web::get().to(links::link_analytics)),
        )
        .service(
            web::resource("/links/{code}/qr")
                .wrap(auth)
                .route(web::get().to(links::qr_payload)),
        )
        .service(web::resource("/links/{code}").route(web::get().to(redirect::redirect_link)))
}

/// Health 路由
pub fn health_routes(health_prefix: &str) -> actix_web::Scope {
    web::scope(health_prefix)
        .route("", web::get().to(health::health_check))
        .route("", web::head().to(health::health_check))
}

/// 请求体解析失败也用统一的错误格式
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let response: HttpResponse = helpers::error_response(&SnaplinkError::validation(
                format!("Invalid request body: {}", err),
            ));
            InternalError::from_response(err, response).into()
        })
}

/// 兜底 404
pub async fn not_found() -> HttpResponse {
    helpers::error_response(&SnaplinkError::not_found("Route not found"))
}
