//! 点击事件聚合
//!
//! 纯函数，输入是某个链接的全部点击事件。

use std::collections::BTreeMap;

use serde::Serialize;

use super::classifier::{Browser, DeviceType, classify};
use crate::storage::ClickEvent;

/// 没有 Referer 的点击
pub const DIRECT_REFERRER: &str = "direct";
/// Referer 无法解析出 host
pub const UNKNOWN_REFERRER: &str = "unknown";

/// 聚合结果，键有序便于展示和断言
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickSummary {
    pub total_clicks: u64,
    pub clicks_by_date: BTreeMap<String, u64>,
    pub devices: BTreeMap<DeviceType, u64>,
    pub browsers: BTreeMap<Browser, u64>,
    pub referrers: BTreeMap<String, u64>,
}

pub fn summarize_clicks(events: &[ClickEvent]) -> ClickSummary {
    let mut summary = ClickSummary {
        total_clicks: events.len() as u64,
        ..Default::default()
    };

    for event in events {
        let date = event.clicked_at.format("%Y-%m-%d").to_string();
        *summary.clicks_by_date.entry(date).or_default() += 1;

        if let Some(ua) = event.user_agent.as_deref() {
            let class = classify(ua);
            *summary.devices.entry(class.device).or_default() += 1;
            *summary.browsers.entry(class.browser).or_default() += 1;
        }

        let referrer = referrer_label(event.referrer.as_deref());
        *summary.referrers.entry(referrer).or_default() += 1;
    }

    summary
}

fn referrer_label(referrer: Option<&str>) -> String {
    match referrer.map(str::trim).filter(|r| !r.is_empty()) {
        None => DIRECT_REFERRER.to_string(),
        Some(raw) => url::Url::parse(raw)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_REFERRER.to_string()),
    }
}
