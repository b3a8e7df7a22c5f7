use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::storage::LinkStore;

use super::helpers::json_response;
use super::types::HealthResponse;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 数据库探测超时
const PING_TIMEOUT: Duration = Duration::from_secs(3);

/// GET /health
///
/// 直接探测存储，不走业务服务；数据库不可用时返回 503。
pub async fn health_check(
    store: web::Data<dyn LinkStore>,
    app_start_time: web::Data<AppStartTime>,
) -> impl Responder {
    let started = Instant::now();

    let database_ok = match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Storage health check failed: {}", e);
            false
        }
        Err(_) => {
            error!("Storage health check timeout");
            false
        }
    };

    let now = chrono::Utc::now();
    let body = HealthResponse {
        status: if database_ok { "healthy" } else { "unhealthy" },
        database: if database_ok { "ok" } else { "unavailable" },
        timestamp: now.to_rfc3339(),
        uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
    };

    trace!(
        "Health check completed in {:?}, status: {}",
        started.elapsed(),
        body.status
    );

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &body)
}
