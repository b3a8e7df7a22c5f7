//! Analytics aggregator: on-demand statistics for one owned link

use std::sync::Arc;

use chrono::Utc;

use crate::analytics::{ClickSummary, summarize_clicks};
use crate::errors::{Result, SnaplinkError};
use crate::storage::{Link, LinkStore};

/// 单链接分析数据
#[derive(Debug, Clone)]
pub struct LinkAnalytics {
    pub link: Link,
    pub is_expired: bool,
    pub summary: ClickSummary,
}

pub struct AnalyticsService {
    store: Arc<dyn LinkStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// 别人的链接和不存在的链接一样返回 NotFound
    pub async fn summarize(&self, link_id: &str, owner_id: &str) -> Result<LinkAnalytics> {
        let link = self
            .store
            .find_owned(link_id, owner_id)
            .await?
            .ok_or_else(|| SnaplinkError::not_found("Link not found"))?;

        let events = self.store.click_events(&link.id).await?;
        let summary = summarize_clicks(&events);

        Ok(LinkAnalytics {
            is_expired: link.is_expired_at(Utc::now()),
            link,
            summary,
        })
    }
}
