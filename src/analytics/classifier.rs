//! User-Agent 分类
//!
//! 只做大小写无关的子串匹配，结果是封闭枚举，不依赖 UA 数据库。

use serde::Serialize;
use strum::AsRefStr;

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

/// 浏览器
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Other,
}

/// 单条 UA 的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UaClass {
    pub device: DeviceType,
    pub browser: Browser,
}

/// 按子串把 UA 归入设备和浏览器
///
/// 平板先于手机判断，iPad 归为 Tablet 而不是 Mobile；Edge 先于 Chrome 判断，
/// 否则带 `Chrome/` 的 Edge UA 永远统计不到 Edge。这两处顺序是有意调整的。
pub fn classify(user_agent: &str) -> UaClass {
    let ua = user_agent.to_ascii_lowercase();
    UaClass {
        device: classify_device(&ua),
        browser: classify_browser(&ua),
    }
}

// iPad 的 UA 里也带 "Mobile/"，所以平板要先判断
fn classify_device(ua: &str) -> DeviceType {
    if ua.contains("ipad") || ua.contains("tablet") {
        DeviceType::Tablet
    } else if ua.contains("mobile") {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}

// Edge 的 UA 同时包含 chrome 和 safari，Chrome 的 UA 包含 safari，顺序不能换
fn classify_browser(ua: &str) -> Browser {
    if ua.contains("edg/") || ua.contains("edge/") || ua.contains("edga/") || ua.contains("edgios/")
    {
        Browser::Edge
    } else if ua.contains("chrome") || ua.contains("crios") {
        Browser::Chrome
    } else if ua.contains("firefox") || ua.contains("fxios") {
        Browser::Firefox
    } else if ua.contains("safari") {
        Browser::Safari
    } else {
        Browser::Other
    }
}
