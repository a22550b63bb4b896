// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `MemoryStore` lifecycle behavior.

use futures::FutureExt;
use remcache_memory::MemoryStore;
use remcache_store::{LifecycleState, StoreClient, StoreError};
use tick::Clock;

type TestResult = Result<(), StoreError>;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

#[test]
fn paused_commands_run_after_resume() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.start().await?;
        store.set("k", "1".to_string()).await?;

        assert!(store.pause());
        assert!(store.is_started());
        assert!(store.is_paused());

        let mut pending = Box::pin(store.get("k"));
        assert!(pending.as_mut().now_or_never().is_none());

        assert!(store.resume());
        assert_eq!(pending.await?.as_deref(), Some("1"));
        Ok(())
    })
}

#[test]
fn end_completes_parked_command_before_stopping() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.start().await?;
        assert!(store.pause());

        let (written, ended) = futures::join!(store.set("k", "1".to_string()), store.end());

        assert_eq!(written?, "OK");
        ended?;
        assert_eq!(store.state(), LifecycleState::Stopped);
        assert_eq!(store.len(), 1);
        Ok(())
    })
}

#[test]
fn stop_abandons_parked_command() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.start().await?;
        assert!(store.pause());

        let (written, stopped) = futures::join!(store.set("k", "1".to_string()), store.stop());

        assert!(written.is_err());
        stopped?;
        assert!(store.is_empty());
        Ok(())
    })
}

#[test]
fn commands_after_end_are_refused() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.start().await?;
        store.end().await?;

        assert!(!store.is_started());
        assert!(store.get("k").await.is_err());
        Ok(())
    })
}
