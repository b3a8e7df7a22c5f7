//! 目标 URL 校验
//!
//! 只接受带 host 的 http/https 绝对地址，脚本类协议直接拒绝。

use url::Url;

use crate::errors::SnaplinkError;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    Empty,
    BlockedScheme(String),
    UnsupportedScheme(String),
    Malformed(String),
    MissingHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "URL is required"),
            Self::BlockedScheme(scheme) => write!(f, "URL scheme not allowed: {}", scheme),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported URL scheme: {}. Only http and https are allowed",
                scheme
            ),
            Self::Malformed(msg) => write!(f, "Invalid URL: {}", msg),
            Self::MissingHost => write!(f, "Invalid URL: missing host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for SnaplinkError {
    fn from(err: UrlValidationError) -> Self {
        SnaplinkError::validation(err.to_string())
    }
}

const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

/// 校验并规范化目标 URL
///
/// 返回解析后的 `Url`，调用方存储 `as_str()` 的结果。
pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    // 先看 scheme，避免 javascript: 之类的 payload 被当成"格式错误"而漏掉分类
    if let Some((scheme, _)) = raw.split_once(':') {
        let scheme = scheme.to_ascii_lowercase();
        if BLOCKED_SCHEMES.contains(&scheme.as_str()) {
            return Err(UrlValidationError::BlockedScheme(scheme));
        }
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::Malformed(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed)
}
