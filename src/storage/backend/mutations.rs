//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ExprTrait, QueryFilter,
    TransactionTrait, sea_query::Expr, sea_query::OnConflict,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{click_to_active_model, link_to_active_model};
use super::retry::{self, DbFailure};
use crate::errors::{Result, SnaplinkError};
use crate::storage::{ClickEvent, Link};

use migration::entities::{click_event, link};

impl SeaOrmStorage {
    pub async fn insert(&self, new_link: &Link) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("insert({})", new_link.short_code),
            self.retry_policy,
            || async {
                link::Entity::insert(link_to_active_model(new_link))
                    .on_conflict(
                        OnConflict::column(link::Column::ShortCode)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await;

        let taken = || {
            SnaplinkError::conflict(format!("Short code already in use: {}", new_link.short_code))
        };

        match result {
            // MySQL 的 DO NOTHING 不报错，靠影响行数判断
            Ok(0) => Err(taken()),
            Ok(_) => {
                info!("Short link created: {}", new_link.short_code);
                Ok(())
            }
            Err(e) if retry::classify(&e) == DbFailure::Duplicate => Err(taken()),
            Err(e) => Err(SnaplinkError::database_operation(format!(
                "创建短链接失败: {}",
                e
            ))),
        }
    }

    /// 点击计数 +1 并写入点击事件，两者在同一事务中
    pub async fn increment_and_log(
        &self,
        link_id: &str,
        event: &ClickEvent,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let db = &self.db;

        let recorded = retry::with_retry(
            &format!("record_click({})", link_id),
            self.retry_policy,
            || record_click_txn(db, link_id, event, now),
        )
        .await
        .map_err(|e| SnaplinkError::database_operation(format!("记录点击失败: {}", e)))?;

        if !recorded {
            debug!("Click not recorded for {}: missing or expired", link_id);
        }
        Ok(recorded)
    }
}

async fn record_click_txn(
    db: &DatabaseConnection,
    link_id: &str,
    event: &ClickEvent,
    now: DateTime<Utc>,
) -> std::result::Result<bool, DbErr> {
    let txn = db.begin().await?;

    // 过期判断放进 WHERE，和读取之间不留竞争窗口
    let updated = link::Entity::update_many()
        .col_expr(
            link::Column::ClickCount,
            Expr::col(link::Column::ClickCount).add(Expr::val(1i64)),
        )
        .filter(link::Column::Id.eq(link_id))
        .filter(
            Condition::any()
                .add(link::Column::ExpirationDate.is_null())
                .add(link::Column::ExpirationDate.gte(now)),
        )
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        txn.rollback().await?;
        return Ok(false);
    }

    click_event::Entity::insert(click_to_active_model(link_id, event))
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    Ok(true)
}
