// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests against a live Redis server.
//!
//! These are ignored by default. Point `REMCACHE_TEST_ENDPOINT` at a disposable server
//! (`host:port`, default `127.0.0.1:6379`) and run with `--ignored`. The tests flush database 0.

use remcache_redis::RedisStore;
use remcache_store::{LifecycleState, StoreClient, StoreError};

type TestResult = Result<(), StoreError>;

async fn started() -> Result<RedisStore, StoreError> {
    let address = std::env::var("REMCACHE_TEST_ENDPOINT").unwrap_or_else(|_| "127.0.0.1:6379".to_string());
    let store = RedisStore::open(&address)?;
    store.start().await?;
    store.flush_all().await?;
    Ok(store)
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn set_get_and_delete() -> TestResult {
    let store = started().await?;

    assert_eq!(store.set("k", "\"v\"".to_string()).await?, "OK");
    assert_eq!(store.get("k").await?.as_deref(), Some("\"v\""));
    assert_eq!(store.exists("k").await?, 1);
    assert_eq!(store.delete("k").await?, 1);
    assert_eq!(store.get("k").await?, None);

    store.stop().await
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn ttl_replies_follow_server_conventions() -> TestResult {
    let store = started().await?;

    assert_eq!(store.ttl("missing").await?, -2);
    store.set("plain", "1".to_string()).await?;
    assert_eq!(store.ttl("plain").await?, -1);
    assert_eq!(store.expire("plain", 30).await?, 1);
    assert!(store.ttl("plain").await? > 0);
    assert_eq!(store.persist("plain").await?, 1);
    assert_eq!(store.expire("missing", 30).await?, 0);

    store.set_with_expiry("timed", 60, "1".to_string()).await?;
    assert!(store.ttl("timed").await? > 0);

    store.stop().await
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn info_exposes_keyspace_and_stats() -> TestResult {
    let store = started().await?;

    for key in ["a", "b", "c"] {
        store.set(key, "1".to_string()).await?;
    }
    let report = store.info().await?;

    let db0 = report.field("keyspace", "db0").unwrap_or_default();
    assert!(db0.starts_with("keys=3"), "unexpected keyspace line: {db0}");
    assert!(report.field("stats", "keyspace_hits").is_some());

    let mut keys = store.keys().await?;
    keys.sort();
    assert_eq!(keys, vec!["a", "b", "c"]);

    store.end().await?;
    assert_eq!(store.state(), LifecycleState::Stopped);
    Ok(())
}
