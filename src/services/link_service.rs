//! Link registry
//!
//! Creation, listing and QR payloads for owner-scoped short links.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::{Result, SnaplinkError};
use crate::storage::{Link, LinkFilter, LinkStore};
use crate::utils::{generate_random_code, is_valid_alias, parse_expiration, validate_url};

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub original_url: String,
    pub owner_id: String,
    /// Custom short code; empty or None means generate one
    pub custom_alias: Option<String>,
    /// Flexible format: RFC3339, `YYYY-MM-DD`, or relative like "1d", "2w"
    pub expiration_date: Option<String>,
}

/// Listing parameters, already parsed from the query string
#[derive(Debug, Clone, Default)]
pub struct ListLinksQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

/// A link as shown in the owner's list
#[derive(Debug, Clone)]
pub struct ListedLink {
    pub link: Link,
    pub is_expired: bool,
}

#[derive(Debug, Clone)]
pub struct LinkListResult {
    pub links: Vec<ListedLink>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

// ============ LinkService ============

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    config: Arc<AppConfig>,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<Link> {
        // 存解析后的规范形式，内嵌的换行/制表符已被剔除，可以直接放进 Location
        let original_url = validate_url(&req.original_url)?;

        let now = Utc::now();
        let expiration_date = Self::parse_expiration_date(req.expiration_date.as_deref(), now)?;

        let mut link = Link {
            id: uuid::Uuid::new_v4().to_string(),
            short_code: String::new(),
            original_url: original_url.as_str().to_string(),
            owner_id: req.owner_id,
            created_at: now,
            expiration_date,
            click_count: 0,
        };

        match req.custom_alias.filter(|a| !a.is_empty()) {
            Some(alias) => {
                if !is_valid_alias(&alias) {
                    return Err(SnaplinkError::validation(format!(
                        "Invalid custom alias '{}'. Use 1-64 letters, digits, '-', '_' or '.'",
                        alias
                    )));
                }
                if self.store.code_exists(&alias).await? {
                    return Err(SnaplinkError::conflict("Custom alias already in use"));
                }
                link.short_code = alias;
                // 两个请求同时抢同一个别名时，由唯一索引兜底返回 Conflict
                self.store
                    .insert_link(&link)
                    .await
                    .map_err(|e| match e {
                        SnaplinkError::Conflict(_) => {
                            SnaplinkError::conflict("Custom alias already in use")
                        }
                        other => other,
                    })?;
            }
            None => self.insert_with_generated_code(&mut link).await?,
        }

        info!(
            "LinkService: created link '{}' -> '{}' for owner {}",
            link.short_code, link.original_url, link.owner_id
        );
        Ok(link)
    }

    async fn insert_with_generated_code(&self, link: &mut Link) -> Result<()> {
        let links_config = &self.config.links;
        let attempts = links_config.max_generate_attempts.max(1);

        for attempt in 1..=attempts {
            let code = generate_random_code(links_config.code_length);

            if self.store.code_exists(&code).await? {
                debug!("Generated code '{}' collided (attempt {})", code, attempt);
                continue;
            }

            link.short_code = code;
            match self.store.insert_link(link).await {
                Ok(()) => return Ok(()),
                Err(SnaplinkError::Conflict(_)) => {
                    debug!(
                        "Generated code '{}' lost an insert race (attempt {})",
                        link.short_code, attempt
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Failed to generate a unique short code after {} attempts", attempts);
        Err(SnaplinkError::server(format!(
            "Failed to generate a unique short code after {} attempts",
            attempts
        )))
    }

    fn parse_expiration_date(
        input: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => parse_expiration(raw, now)
                .map(Some)
                .map_err(|e| SnaplinkError::validation(format!("Invalid expiration date: {}", e))),
        }
    }

    /// Owner 的链接，创建时间倒序分页
    pub async fn list_links(&self, owner_id: &str, query: ListLinksQuery) -> Result<LinkListResult> {
        let links_config = &self.config.links;
        let max_limit = links_config.max_page_size.max(1);

        let page = query.page.filter(|p| *p > 0).unwrap_or(1);
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(links_config.default_page_size)
            .clamp(1, max_limit);

        let filter = LinkFilter {
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        let result = self.store.list_owned(owner_id, &filter, page, limit).await?;

        let now = Utc::now();
        let links = result
            .links
            .into_iter()
            .map(|link| ListedLink {
                is_expired: link.is_expired_at(now),
                link,
            })
            .collect();

        Ok(LinkListResult {
            links,
            total: result.total,
            page,
            limit,
            pages: result.total.div_ceil(limit),
        })
    }

    /// 二维码内容：短链接的绝对地址
    ///
    /// `request_base` 是根据请求推断的 `scheme://host`，仅在未配置 `base_url` 时使用。
    pub async fn qr_payload(&self, short_code: &str, request_base: &str) -> Result<String> {
        if self.store.find_by_code(short_code).await?.is_none() {
            return Err(SnaplinkError::not_found("URL not found"));
        }

        let base = self
            .config
            .links
            .base_url
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(request_base);

        Ok(format!(
            "{}{}/links/{}",
            base.trim_end_matches('/'),
            self.config.routes.api_prefix,
            short_code
        ))
    }
}
