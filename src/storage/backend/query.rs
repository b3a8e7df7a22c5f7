//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::error;

use super::converters::{model_to_click, model_to_link};
use super::{LinkFilter, SeaOrmStorage, retry};
use crate::errors::{Result, SnaplinkError};
use crate::storage::{ClickEvent, Link, LinkPage};

use migration::entities::{click_event, link};

/// `%needle%`，用户输入里的通配符按字面匹配
fn contains_pattern(needle: &str) -> LikeExpr {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

fn owned_condition(owner_id: &str, filter: &LinkFilter) -> Condition {
    let mut condition = Condition::all().add(link::Column::OwnerId.eq(owner_id));

    // search: 大小写无关的子串匹配，两边都转小写，各数据库行为一致
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(link::Column::ShortCode)))
                        .like(contains_pattern(search)),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(link::Column::OriginalUrl)))
                        .like(contains_pattern(search)),
                ),
        );
    }

    condition
}

impl SeaOrmStorage {
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let result = retry::with_retry(
            &format!("get_by_code({})", code),
            self.retry_policy,
            || async {
                link::Entity::find()
                    .filter(link::Column::ShortCode.eq(code_owned.as_str()))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            error!("查询短链接失败（重试后仍失败）: {}", e);
            SnaplinkError::database_operation(format!("查询短链接失败: {}", e))
        })?;

        Ok(result.map(model_to_link))
    }

    pub async fn exists(&self, code: &str) -> Result<bool> {
        let db = &self.db;
        let code_owned = code.to_string();

        let count = retry::with_retry(&format!("exists({})", code), self.retry_policy, || async {
            link::Entity::find()
                .filter(link::Column::ShortCode.eq(code_owned.as_str()))
                .count(db)
                .await
        })
        .await
        .map_err(|e| SnaplinkError::database_operation(format!("检查短码失败: {}", e)))?;

        Ok(count > 0)
    }

    pub async fn get_owned(&self, id: &str, owner_id: &str) -> Result<Option<Link>> {
        let db = &self.db;

        let result = retry::with_retry(&format!("get_owned({})", id), self.retry_policy, || async {
            link::Entity::find_by_id(id.to_string())
                .filter(link::Column::OwnerId.eq(owner_id))
                .one(db)
                .await
        })
        .await
        .map_err(|e| SnaplinkError::database_operation(format!("查询链接失败: {}", e)))?;

        Ok(result.map(model_to_link))
    }

    /// 按 owner 分页加载链接，创建时间倒序
    pub async fn load_owned_paginated(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
        page: u64,
        page_size: u64,
    ) -> Result<LinkPage> {
        let db = &self.db;
        let condition = owned_condition(owner_id, filter);

        let total = retry::with_retry("load_owned_paginated(count)", self.retry_policy, || async {
            link::Entity::find()
                .filter(condition.clone())
                .count(db)
                .await
        })
        .await
        .map_err(|e| SnaplinkError::database_operation(format!("统计链接数量失败: {}", e)))?;

        let page_offset = page.saturating_sub(1);
        let page_size = std::cmp::Ord::max(page_size, 1);
        let models = retry::with_retry("load_owned_paginated(data)", self.retry_policy, || async {
            link::Entity::find()
                .filter(condition.clone())
                .order_by_desc(link::Column::CreatedAt)
                .order_by_desc(link::Column::Id)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await
        .map_err(|e| {
            error!("分页查询失败（重试后仍失败）: {}", e);
            SnaplinkError::database_operation(format!("分页查询失败: {}", e))
        })?;

        Ok(LinkPage {
            links: models.into_iter().map(model_to_link).collect(),
            total,
        })
    }

    pub async fn load_click_events(&self, link_id: &str) -> Result<Vec<ClickEvent>> {
        let db = &self.db;

        let models = retry::with_retry(
            &format!("load_click_events({})", link_id),
            self.retry_policy,
            || async {
                click_event::Entity::find()
                    .filter(click_event::Column::LinkId.eq(link_id))
                    .order_by_asc(click_event::Column::ClickedAt)
                    .order_by_asc(click_event::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| SnaplinkError::database_operation(format!("加载点击事件失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_click).collect())
    }
}
