use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{LinkFilter, SeaOrmStorage};
pub use models::{ClickEvent, Link, LinkPage};

/// 链接与点击事件的持久化接口
///
/// 服务层只依赖这个 trait，测试里可以换成任意实现。
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// 插入新链接；短码已存在时返回 `Conflict`
    async fn insert_link(&self, link: &Link) -> Result<()>;

    async fn code_exists(&self, short_code: &str) -> Result<bool>;

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>>;

    /// 按 id 查找且要求属于 `owner_id`
    async fn find_owned(&self, id: &str, owner_id: &str) -> Result<Option<Link>>;

    /// 按创建时间倒序分页，`page` 从 1 开始
    async fn list_owned(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
        page: u64,
        limit: u64,
    ) -> Result<LinkPage>;

    /// 原子地累加点击数并写入点击事件
    ///
    /// 链接不存在或在 `now` 时已过期则什么都不写，返回 `false`。
    async fn record_click(
        &self,
        link_id: &str,
        event: &ClickEvent,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// 某个链接的全部点击事件，按时间正序
    async fn click_events(&self, link_id: &str) -> Result<Vec<ClickEvent>>;

    /// 健康检查用
    async fn ping(&self) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        let storage = backend::SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
