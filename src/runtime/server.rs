use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, Condition, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::jwt::JwtService;
use crate::api::services::{AppStartTime, api_routes, health_routes, json_config, not_found};
use crate::config::{AppConfig, CorsConfig};
use crate::services::{AnalyticsService, LinkService, RedirectService};
use crate::storage::{LinkStore, StorageFactory};

/// 所有 worker 共享的组件
///
/// 每个 worker 的 App 从这里 clone 出 `web::Data`，服务本身无可变状态。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn LinkStore>,
    pub jwt: Arc<JwtService>,
    pub link_service: web::Data<LinkService>,
    pub redirect_service: web::Data<RedirectService>,
    pub analytics_service: web::Data<AnalyticsService>,
    pub app_start_time: AppStartTime,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn LinkStore>) -> Self {
        let jwt = Arc::new(JwtService::from_config(&config.auth));

        Self {
            link_service: web::Data::new(LinkService::new(store.clone(), config.clone())),
            redirect_service: web::Data::new(RedirectService::new(store.clone())),
            analytics_service: web::Data::new(AnalyticsService::new(store.clone())),
            app_start_time: AppStartTime {
                start_datetime: chrono::Utc::now(),
            },
            config,
            store,
            jwt,
        }
    }

    /// 注册共享数据和全部路由
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.link_service.clone())
            .app_data(self.redirect_service.clone())
            .app_data(self.analytics_service.clone())
            .app_data(web::Data::from(self.store.clone()))
            .app_data(web::Data::new(self.app_start_time.clone()))
            .app_data(json_config())
            .service(health_routes(&self.config.routes.health_prefix))
            .service(api_routes(
                &self.config.routes.api_prefix,
                self.jwt.clone(),
            ));
    }
}

fn validate_cors_config(cors_config: &CorsConfig) {
    if cors_config.enabled && cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }
}

fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(cors_config.max_age)
}

pub async fn run_server(config: Arc<AppConfig>) -> Result<()> {
    let storage = StorageFactory::create(&config.database)
        .await
        .inspect_err(|e| eprintln!("{}", e.format_colored()))?;
    let db_for_shutdown = storage.get_db().clone();

    let store: Arc<dyn LinkStore> = storage;
    let state = AppState::new(config.clone(), store);

    validate_cors_config(&config.cors);
    let cors_config = config.cors.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(Condition::new(cors_config.enabled, cors))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(|cfg| state.configure(cfg))
            .default_service(web::to(not_found))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    info!(
        "API mounted at {}, health at {}",
        config.routes.api_prefix, config.routes.health_prefix
    );

    // actix 自带 SIGINT/SIGTERM 处理，返回即代表已优雅退出
    server.bind(&bind_address)?.run().await?;

    if let Err(e) = db_for_shutdown.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    warn!("Graceful shutdown: all tasks completed");

    Ok(())
}
