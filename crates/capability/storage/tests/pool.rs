use hb_storage::{ConnectionPool, InMemoryCache, PresenceStore, StorageError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn saturation_after_acquire_timeout() {
    let timeout = Duration::from_millis(200);
    let pool = ConnectionPool::new(vec![()], timeout);
    let held = pool.acquire().await.expect("held");

    let started = Instant::now();
    let result = pool.acquire().await;
    let waited = started.elapsed();

    assert!(matches!(result, Err(StorageError::Saturated)));
    assert!(waited >= timeout, "returned early after {waited:?}");
    assert!(waited < timeout * 10, "returned late after {waited:?}");
    drop(held);
}

#[tokio::test]
async fn waiter_gets_handle_released_before_timeout() {
    let pool = Arc::new(ConnectionPool::new(vec![1_u32], Duration::from_secs(2)));
    let held = pool.acquire().await.expect("held");

    let waiter = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.acquire().await.map(|handle| *handle) })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    held.release();

    let value = waiter.await.expect("join").expect("acquire");
    assert_eq!(value, 1);
    assert_eq!(pool.available(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balanced_concurrent_use_restores_capacity() {
    let cache = Arc::new(InMemoryCache::new());
    let handles = (0..4).map(|_| cache.handle()).collect();
    let store = Arc::new(PresenceStore::new(ConnectionPool::new(
        handles,
        Duration::from_secs(5),
    )));

    let mut tasks = Vec::new();
    for index in 0..64 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let key = format!("device-{index}");
            store.register_ping(key.as_bytes()).await?;
            store.check_ping(key.as_bytes()).await
        }));
    }
    for task in tasks {
        let seconds = task.await.expect("join").expect("ping");
        assert!(seconds <= 1);
    }

    assert_eq!(store.pool().capacity(), 4);
    assert_eq!(store.pool().available(), 4);
    assert_eq!(store.pool().outstanding(), 0);
    assert_eq!(cache.len(), 64);
}
