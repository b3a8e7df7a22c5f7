//! RedirectService tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use snaplink::config::DatabaseConfig;
use snaplink::errors::SnaplinkError;
use snaplink::services::{RedirectService, RequestMetadata};
use snaplink::storage::{Link, LinkStore, SeaOrmStorage};
use tempfile::TempDir;

async fn create_test_env() -> (RedirectService, Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("redirect_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = Arc::new(
        SeaOrmStorage::new(&config, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (RedirectService::new(storage.clone()), storage, temp_dir)
}

async fn seed_link(
    storage: &SeaOrmStorage,
    code: &str,
    expiration_date: Option<chrono::DateTime<Utc>>,
) -> Link {
    let link = Link {
        id: uuid::Uuid::new_v4().to_string(),
        short_code: code.to_string(),
        original_url: format!("https://example.com/{}", code),
        owner_id: "owner-1".to_string(),
        created_at: Utc::now(),
        expiration_date,
        click_count: 0,
    };
    storage.insert_link(&link).await.unwrap();
    link
}

fn metadata() -> RequestMetadata {
    RequestMetadata {
        ip_address: Some("203.0.113.7".to_string()),
        user_agent: Some(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1"
                .to_string(),
        ),
        referrer: Some("https://news.ycombinator.com/item?id=1".to_string()),
    }
}

#[tokio::test]
async fn test_resolve_returns_url_and_records_click() {
    let (service, storage, _dir) = create_test_env().await;
    let link = seed_link(&storage, "go", None).await;

    let url = service.resolve("go", metadata()).await.unwrap();
    assert_eq!(url, "https://example.com/go");

    let stored = storage.find_by_code("go").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 1);

    let events = storage.click_events(&link.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert!(events[0].user_agent.as_deref().unwrap().contains("iPhone"));
    assert_eq!(
        events[0].referrer.as_deref(),
        Some("https://news.ycombinator.com/item?id=1")
    );
}

#[tokio::test]
async fn test_resolve_without_metadata() {
    let (service, storage, _dir) = create_test_env().await;
    let link = seed_link(&storage, "bare", None).await;

    service
        .resolve("bare", RequestMetadata::default())
        .await
        .unwrap();

    let events = storage.click_events(&link.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].user_agent.is_none());
    assert!(events[0].referrer.is_none());
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let (service, _storage, _dir) = create_test_env().await;

    let err = service.resolve("missing", metadata()).await.unwrap_err();
    assert!(matches!(err, SnaplinkError::NotFound(_)));
    assert_eq!(err.message(), "URL not found");
}

#[tokio::test]
async fn test_expired_link_is_gone_and_not_counted() {
    let (service, storage, _dir) = create_test_env().await;
    let link = seed_link(&storage, "old", Some(Utc::now() - Duration::minutes(1))).await;

    let err = service.resolve("old", metadata()).await.unwrap_err();
    assert!(matches!(err, SnaplinkError::Expired(_)));
    assert_eq!(err.message(), "Link has expired");

    let stored = storage.find_by_code("old").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 0);
    assert!(storage.click_events(&link.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_future_expiration_still_redirects() {
    let (service, storage, _dir) = create_test_env().await;
    seed_link(&storage, "soon", Some(Utc::now() + Duration::hours(1))).await;

    let url = service.resolve("soon", metadata()).await.unwrap();
    assert_eq!(url, "https://example.com/soon");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_redirects_lose_no_clicks() {
    let (service, storage, _dir) = create_test_env().await;
    let link = seed_link(&storage, "hot", None).await;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.resolve("hot", metadata()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = storage.find_by_code("hot").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 20);
    assert_eq!(storage.click_events(&link.id).await.unwrap().len(), 20);
}
