use super::*;

#[tokio::test]
async fn test_memory_cache_roundtrip() {
    let cache = MemoryCache::new();
    assert!(cache.is_empty().await);

    cache.write("k", Some("v"), Duration::from_secs(60)).await;
    assert_eq!(cache.read("k").await.as_deref(), Some("v"));
    assert_eq!(cache.len().await, 1);

    cache.write("k", None, Duration::from_secs(1)).await;
    assert_eq!(cache.read("k").await, None);
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_memory_cache_lazy_expiry() {
    let cache = MemoryCache::new();
    cache.write("k", Some("v"), Duration::from_secs(10)).await;

    tokio::time::advance(Duration::from_secs(9)).await;
    assert_eq!(cache.read("k").await.as_deref(), Some("v"));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(cache.read("k").await, None);
    // Stale entry is removed by the read itself
    assert_eq!(cache.len().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let cache = MemoryCache::new();
    cache.write("short", Some("1"), Duration::from_secs(5)).await;
    cache.write("long", Some("2"), Duration::from_secs(50)).await;

    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(cache.purge_expired().await, 1);
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.read("long").await.as_deref(), Some("2"));
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_bounds_memory() {
    let cache = MemoryCache::new();
    let handle = cache.spawn_sweeper(Duration::from_secs(30));

    cache.write("a", Some("1"), Duration::from_secs(10)).await;
    cache.write("b", Some("2"), Duration::from_secs(10)).await;
    assert_eq!(cache.len().await, 2);

    tokio::time::sleep(Duration::from_secs(31)).await;
    tokio::task::yield_now().await;
    assert_eq!(cache.len().await, 0);

    handle.abort();
}

#[tokio::test]
async fn test_overwrite_refreshes_ttl_and_value() {
    let cache = MemoryCache::new();
    cache.write("k", Some("old"), Duration::from_secs(60)).await;
    cache.write("k", Some("new"), Duration::from_secs(60)).await;
    assert_eq!(cache.read("k").await.as_deref(), Some("new"));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_backend_trait_delete() {
    let cache = MemoryCache::new();
    CacheBackend::set(&cache, "k", Some("v"), Duration::from_secs(60))
        .await
        .unwrap();
    cache.delete("k").await.unwrap();
    assert_eq!(CacheBackend::get(&cache, "k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_read_with_ttl_reports_remaining_lifetime() {
    let cache = MemoryCache::new();
    cache.write("k", Some("v"), Duration::from_secs(60)).await;

    tokio::time::advance(Duration::from_secs(20)).await;
    let (payload, remaining) = cache.read_with_ttl("k").await.unwrap();
    assert_eq!(payload, "v");
    assert_eq!(remaining, Duration::from_secs(40));

    tokio::time::advance(Duration::from_secs(40)).await;
    assert_eq!(cache.read_with_ttl("k").await, None);
    assert_eq!(cache.read_with_ttl("missing").await, None);
}
