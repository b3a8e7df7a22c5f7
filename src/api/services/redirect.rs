use actix_web::http::header::{CACHE_CONTROL, HeaderValue, LOCATION};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use crate::errors::SnaplinkError;
use crate::services::{RedirectService, RequestMetadata};

use super::helpers::{client_ip, error_response, header_value};

/// GET /links/{code}
///
/// 公开接口。成功时 302 跳转，不缓存，保证每次访问都能计数。
pub async fn redirect_link(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<RedirectService>,
) -> HttpResponse {
    let short_code = path.into_inner();

    let metadata = RequestMetadata {
        ip_address: client_ip(&req),
        user_agent: header_value(&req, "User-Agent"),
        referrer: header_value(&req, "Referer").or_else(|| header_value(&req, "Referrer")),
    };

    match service.resolve(&short_code, metadata).await {
        Ok(target) => {
            trace!("Redirecting {} -> {}", short_code, target);
            let Ok(location) = HeaderValue::try_from(target.as_str()) else {
                return error_response(&SnaplinkError::server(format!(
                    "Stored URL for '{}' is not a valid Location header",
                    short_code
                )));
            };
            HttpResponse::Found()
                .insert_header((LOCATION, location))
                .insert_header((CACHE_CONTROL, "no-store"))
                .finish()
        }
        Err(e) => error_response(&e),
    }
}
