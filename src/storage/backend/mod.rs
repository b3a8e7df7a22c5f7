//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{Result, SnaplinkError};
use crate::storage::{ClickEvent, Link, LinkPage, LinkStore};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{click_to_active_model, link_to_active_model, model_to_click, model_to_link};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(SnaplinkError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 链接列表过滤条件
#[derive(Default, Clone, Debug)]
pub struct LinkFilter {
    /// 子串匹配 short_code 或 original_url
    pub search: Option<String>,
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_policy: retry::RetryPolicy,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(SnaplinkError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            connect_generic(config, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_policy: retry::RetryPolicy::from(config),
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn insert_link(&self, link: &Link) -> Result<()> {
        self.insert(link).await
    }

    async fn code_exists(&self, short_code: &str) -> Result<bool> {
        self.exists(short_code).await
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>> {
        self.get_by_code(short_code).await
    }

    async fn find_owned(&self, id: &str, owner_id: &str) -> Result<Option<Link>> {
        self.get_owned(id, owner_id).await
    }

    async fn list_owned(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
        page: u64,
        limit: u64,
    ) -> Result<LinkPage> {
        self.load_owned_paginated(owner_id, filter, page, limit)
            .await
    }

    async fn record_click(
        &self,
        link_id: &str,
        event: &ClickEvent,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.increment_and_log(link_id, event, now).await
    }

    async fn click_events(&self, link_id: &str) -> Result<Vec<ClickEvent>> {
        self.load_click_events(link_id).await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| SnaplinkError::database_connection(format!("数据库不可用: {}", e)))
    }
}
