//! AnalyticsService tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use snaplink::analytics::{Browser, DeviceType};
use snaplink::config::DatabaseConfig;
use snaplink::errors::SnaplinkError;
use snaplink::services::{AnalyticsService, RedirectService, RequestMetadata};
use snaplink::storage::{Link, LinkStore, SeaOrmStorage};
use tempfile::TempDir;

const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
const FIREFOX_ANDROID: &str = "Mozilla/5.0 (Android 14; Mobile; rv:127.0) Gecko/127.0 Firefox/127.0";
const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
    (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

struct TestEnv {
    analytics: AnalyticsService,
    redirect: RedirectService,
    storage: Arc<SeaOrmStorage>,
    _dir: TempDir,
}

async fn create_test_env() -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("analytics_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = Arc::new(
        SeaOrmStorage::new(&config, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    TestEnv {
        analytics: AnalyticsService::new(storage.clone()),
        redirect: RedirectService::new(storage.clone()),
        storage,
        _dir: temp_dir,
    }
}

async fn seed_link(storage: &SeaOrmStorage, code: &str, owner: &str) -> Link {
    let link = Link {
        id: uuid::Uuid::new_v4().to_string(),
        short_code: code.to_string(),
        original_url: format!("https://example.com/{}", code),
        owner_id: owner.to_string(),
        created_at: Utc::now(),
        expiration_date: None,
        click_count: 0,
    };
    storage.insert_link(&link).await.unwrap();
    link
}

fn visit(user_agent: Option<&str>, referrer: Option<&str>) -> RequestMetadata {
    RequestMetadata {
        ip_address: Some("198.51.100.1".to_string()),
        user_agent: user_agent.map(str::to_string),
        referrer: referrer.map(str::to_string),
    }
}

#[tokio::test]
async fn test_summary_after_redirects() {
    let env = create_test_env().await;
    let link = seed_link(&env.storage, "stats", "owner-1").await;

    env.redirect
        .resolve("stats", visit(Some(CHROME_DESKTOP), Some("https://google.com/search?q=x")))
        .await
        .unwrap();
    env.redirect
        .resolve("stats", visit(Some(CHROME_DESKTOP), Some("https://google.com/")))
        .await
        .unwrap();
    env.redirect
        .resolve("stats", visit(Some(FIREFOX_ANDROID), None))
        .await
        .unwrap();
    env.redirect
        .resolve("stats", visit(Some(SAFARI_IPAD), Some("not a url")))
        .await
        .unwrap();
    env.redirect.resolve("stats", visit(None, None)).await.unwrap();

    let analytics = env.analytics.summarize(&link.id, "owner-1").await.unwrap();
    let summary = &analytics.summary;

    assert_eq!(analytics.link.click_count, 5);
    assert!(!analytics.is_expired);
    assert_eq!(summary.total_clicks, 5);
    assert_eq!(summary.clicks_by_date.values().sum::<u64>(), 5);

    assert_eq!(summary.devices.get(&DeviceType::Desktop), Some(&2));
    assert_eq!(summary.devices.get(&DeviceType::Mobile), Some(&1));
    assert_eq!(summary.devices.get(&DeviceType::Tablet), Some(&1));

    assert_eq!(summary.browsers.get(&Browser::Chrome), Some(&2));
    assert_eq!(summary.browsers.get(&Browser::Firefox), Some(&1));
    assert_eq!(summary.browsers.get(&Browser::Safari), Some(&1));

    assert_eq!(summary.referrers.get("google.com"), Some(&2));
    assert_eq!(summary.referrers.get("direct"), Some(&2));
    assert_eq!(summary.referrers.get("unknown"), Some(&1));
}

#[tokio::test]
async fn test_summary_for_link_without_clicks() {
    let env = create_test_env().await;
    let link = seed_link(&env.storage, "quiet", "owner-1").await;

    let analytics = env.analytics.summarize(&link.id, "owner-1").await.unwrap();
    assert_eq!(analytics.summary.total_clicks, 0);
    assert!(analytics.summary.clicks_by_date.is_empty());
    assert!(analytics.summary.referrers.is_empty());
}

#[tokio::test]
async fn test_other_owner_gets_not_found() {
    let env = create_test_env().await;
    let link = seed_link(&env.storage, "mine", "owner-1").await;

    let err = env
        .analytics
        .summarize(&link.id, "owner-2")
        .await
        .unwrap_err();
    assert!(matches!(err, SnaplinkError::NotFound(_)));
    assert_eq!(err.message(), "Link not found");

    let err = env
        .analytics
        .summarize("no-such-id", "owner-1")
        .await
        .unwrap_err();
    assert!(matches!(err, SnaplinkError::NotFound(_)));
}

#[tokio::test]
async fn test_expired_link_still_has_analytics() {
    let env = create_test_env().await;
    let mut link = seed_link(&env.storage, "was-live", "owner-1").await;
    env.redirect
        .resolve("was-live", visit(Some(CHROME_DESKTOP), None))
        .await
        .unwrap();

    // 换一个已过期的链接验证 is_expired 标记
    link.id = uuid::Uuid::new_v4().to_string();
    link.short_code = "dead".to_string();
    link.expiration_date = Some(Utc::now() - Duration::hours(1));
    env.storage.insert_link(&link).await.unwrap();

    let analytics = env.analytics.summarize(&link.id, "owner-1").await.unwrap();
    assert!(analytics.is_expired);
    assert_eq!(analytics.summary.total_clicks, 0);
}
