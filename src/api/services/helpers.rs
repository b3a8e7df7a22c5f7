//! 响应构建帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::error;

use crate::errors::SnaplinkError;

use super::types::ErrorBody;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 从 SnaplinkError 构建错误响应；内部错误只记日志，不回显细节
pub fn error_response(err: &SnaplinkError) -> HttpResponse {
    if err.is_internal() {
        error!("{} {}: {}", err.code(), err.error_type(), err.message());
    }
    json_response(err.http_status(), &ErrorBody::new(err.public_message()))
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(status: StatusCode, result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => json_response(status, &data),
        Err(e) => error_response(&e),
    }
}

/// 宽松解析正整数，失败返回 None（交给调用方走默认值）
pub fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// 客户端 IP，去掉端口
///
/// actix 的 realip 会依次参考 Forwarded、X-Forwarded-For 和对端地址。
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    let conn = req.connection_info();
    let raw = conn.realip_remote_addr()?;

    if let Ok(addr) = raw.parse::<std::net::SocketAddr>() {
        return Some(addr.ip().to_string());
    }
    if let Ok(ip) = raw.trim_matches(['[', ']']).parse::<std::net::IpAddr>() {
        return Some(ip.to_string());
    }
    Some(raw.to_string())
}

/// 读取请求头，空值视为缺失
pub fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// 请求自身的 `scheme://host`
pub fn request_base_url(req: &HttpRequest) -> String {
    let conn = req.connection_info();
    format!("{}://{}", conn.scheme(), conn.host())
}
