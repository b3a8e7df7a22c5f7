//! Redirector: short code -> destination, one click event per successful hit

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::errors::{Result, SnaplinkError};
use crate::storage::{ClickEvent, LinkStore};

/// 与点击一起记录的请求信息
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

pub struct RedirectService {
    store: Arc<dyn LinkStore>,
}

impl RedirectService {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// 解析短码并记录点击，返回原始 URL
    #[instrument(skip(self, metadata))]
    pub async fn resolve(&self, short_code: &str, metadata: RequestMetadata) -> Result<String> {
        let Some(link) = self.store.find_by_code(short_code).await? else {
            debug!("Redirect link not found: {}", short_code);
            return Err(SnaplinkError::not_found("URL not found"));
        };

        let now = Utc::now();
        if link.is_expired_at(now) {
            debug!("Redirect link expired: {}", short_code);
            return Err(SnaplinkError::expired("Link has expired"));
        }

        let event = ClickEvent {
            clicked_at: now,
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
            referrer: metadata.referrer,
        };

        // 条件更新未命中：读到之后、写入之前过期了
        if !self.store.record_click(&link.id, &event, now).await? {
            return Err(SnaplinkError::expired("Link has expired"));
        }

        Ok(link.original_url)
    }
}
