//! HTTP 请求/响应结构
//!
//! 字段统一 camelCase，所有响应都带 `success`。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::ClickSummary;
use crate::services::{LinkAnalytics, LinkListResult, ListedLink};
use crate::storage::Link;

/// `{success:false, message}`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkBody {
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// 列表查询参数先按字符串收下，数字解析失败时回退默认值
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ListLinksParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: String,
    pub original_url: String,
    pub short_code: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            short_code: link.short_code,
            clicks: link.click_count,
            created_at: link.created_at,
            expiration_date: link.expiration_date,
            is_expired: None,
        }
    }
}

impl From<ListedLink> for LinkResponse {
    fn from(item: ListedLink) -> Self {
        Self {
            is_expired: Some(item.is_expired),
            ..LinkResponse::from(item.link)
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct CreateLinkResponse {
    pub success: bool,
    pub link: LinkResponse,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

#[derive(Serialize, Clone, Debug)]
pub struct LinkListResponse {
    pub success: bool,
    pub links: Vec<LinkResponse>,
    pub pagination: PaginationInfo,
}

impl From<LinkListResult> for LinkListResponse {
    fn from(result: LinkListResult) -> Self {
        Self {
            success: true,
            pagination: PaginationInfo {
                total: result.total,
                page: result.page,
                limit: result.limit,
                pages: result.pages,
            },
            links: result.links.into_iter().map(LinkResponse::from).collect(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsLinkInfo {
    pub id: String,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBody {
    pub total_clicks: u64,
    pub is_expired: bool,
    pub clicks_by_date: BTreeMap<String, u64>,
    pub devices: BTreeMap<crate::analytics::DeviceType, u64>,
    pub browsers: BTreeMap<crate::analytics::Browser, u64>,
    pub referrers: BTreeMap<String, u64>,
}

#[derive(Serialize, Clone, Debug)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub link: AnalyticsLinkInfo,
    pub analytics: AnalyticsBody,
}

impl From<LinkAnalytics> for AnalyticsResponse {
    fn from(data: LinkAnalytics) -> Self {
        let LinkAnalytics {
            link,
            is_expired,
            summary,
        } = data;
        let ClickSummary {
            total_clicks,
            clicks_by_date,
            devices,
            browsers,
            referrers,
        } = summary;

        Self {
            success: true,
            link: AnalyticsLinkInfo {
                id: link.id,
                original_url: link.original_url,
                short_code: link.short_code,
                created_at: link.created_at,
                expiration_date: link.expiration_date,
                is_expired,
            },
            analytics: AnalyticsBody {
                total_clicks,
                is_expired,
                clicks_by_date,
                devices,
                browsers,
                referrers,
            },
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QrPayloadResponse {
    pub success: bool,
    pub short_code: String,
    /// 二维码应编码的内容
    pub short_url: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
    pub uptime: u64,
}
