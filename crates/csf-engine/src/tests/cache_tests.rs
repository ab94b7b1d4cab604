//! Tests for cache providers and canonical cache keys

use crate::cache::{CacheKeyParts, MokaCacheProvider, NullCacheProvider};
use csf_domain::ports::CacheProvider;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn set_then_get_round_trips() {
    let cache = MokaCacheProvider::with_capacity(16);
    cache.set_json("k", r#"{"hits":3}"#, TTL).await.unwrap();
    assert_eq!(
        cache.get_json("k").await.unwrap().as_deref(),
        Some(r#"{"hits":3}"#)
    );
    assert_eq!(cache.get_json("other").await.unwrap(), None);
}

#[tokio::test]
async fn expired_entries_miss() {
    let cache = MokaCacheProvider::with_capacity(16);
    cache
        .set_json("short", "v", Duration::from_millis(20))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get_json("short").await.unwrap(), None);
}

#[tokio::test]
async fn entries_outlive_shorter_neighbors() {
    let cache = MokaCacheProvider::with_capacity(16);
    cache
        .set_json("short", "a", Duration::from_millis(20))
        .await
        .unwrap();
    cache.set_json("long", "b", TTL).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get_json("short").await.unwrap(), None);
    assert_eq!(cache.get_json("long").await.unwrap().as_deref(), Some("b"));
}

#[tokio::test]
async fn delete_reports_prior_existence() {
    let cache = MokaCacheProvider::with_capacity(16);
    cache.set_json("k", "v", TTL).await.unwrap();
    assert!(cache.delete("k").await.unwrap());
    assert!(!cache.delete("k").await.unwrap());
    assert_eq!(cache.get_json("k").await.unwrap(), None);
}

#[tokio::test]
async fn stats_count_hits_and_misses() {
    let cache = MokaCacheProvider::with_capacity(16);
    cache.set_json("k", "v", TTL).await.unwrap();
    let _ = cache.get_json("k").await.unwrap();
    let _ = cache.get_json("k").await.unwrap();
    let _ = cache.get_json("absent").await.unwrap();

    let stats = cache.stats().await.unwrap();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-12);
}

#[tokio::test]
async fn null_provider_always_misses() {
    let cache = NullCacheProvider;
    cache.set_json("k", "v", TTL).await.unwrap();
    assert_eq!(cache.get_json("k").await.unwrap(), None);
    assert!(!cache.delete("k").await.unwrap());
    assert_eq!(cache.provider_name(), "null");
}

#[test]
fn key_namespaces_do_not_collide() {
    let query = CacheKeyParts::new("query").field("text", "find auth").build();
    let hybrid = CacheKeyParts::new("hybrid").field("text", "find auth").build();
    assert!(query.starts_with("query:"));
    assert!(hybrid.starts_with("hybrid:"));
    assert_ne!(query, hybrid);
}
