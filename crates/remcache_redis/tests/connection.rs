// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Connection handling against a scripted local server.

use std::sync::{Arc, Mutex};

use remcache_redis::RedisStore;
use remcache_store::{LifecycleState, StoreClient, StoreEvent};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Splits one complete command (an array of bulk strings) off the front of `buffer`.
///
/// Returns the command's arguments and the number of bytes it occupies, or `None` while the
/// command is still incomplete.
fn next_command(buffer: &[u8]) -> Option<(Vec<Vec<u8>>, usize)> {
    let (header, mut position) = line(buffer, 0)?;
    let count: usize = std::str::from_utf8(header.strip_prefix(b"*")?).ok()?.parse().ok()?;
    let mut arguments = Vec::with_capacity(count);
    for _ in 0..count {
        let (length, start) = line(buffer, position)?;
        let length: usize = std::str::from_utf8(length.strip_prefix(b"$")?).ok()?.parse().ok()?;
        arguments.push(buffer.get(start..start + length)?.to_vec());
        position = start + length + 2;
    }
    (position <= buffer.len()).then_some((arguments, position))
}

fn line(buffer: &[u8], from: usize) -> Option<(&[u8], usize)> {
    let rest = buffer.get(from..)?;
    let end = rest.windows(2).position(|pair| pair == b"\r\n")?;
    Some((&rest[..end], from + end + 2))
}

/// Accepts one client, acknowledges every command and closes the socket on the first `GET`.
async fn hang_up_on_get(listener: TcpListener) -> std::io::Result<()> {
    let (mut socket, _) = listener.accept().await?;
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
        while let Some((arguments, consumed)) = next_command(&buffer) {
            let _ = buffer.drain(..consumed);
            if arguments.first().is_some_and(|name| name.eq_ignore_ascii_case(b"GET")) {
                return Ok(());
            }
            socket.write_all(b"+OK\r\n").await?;
        }
    }
}

#[tokio::test]
async fn dropped_connection_emits_error_then_stop() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?.to_string();
    let server = tokio::spawn(hang_up_on_get(listener));

    let store = RedisStore::open(&address)?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _id = store.observe(Box::new(move |event: &StoreEvent| {
        let entry = match event {
            StoreEvent::Start => "start",
            StoreEvent::Stop => "stop",
            StoreEvent::Error(_) => "error",
        };
        sink.lock().unwrap().push(entry);
    }));

    store.start().await?;
    assert_eq!(store.state(), LifecycleState::Started);

    assert!(store.get("k").await.is_err());
    server.await??;

    assert_eq!(*seen.lock().unwrap(), vec!["start", "error", "stop"]);
    assert_eq!(store.state(), LifecycleState::Stopped);
    assert!(format!("{store:?}").contains("connected: false"));
    assert!(store.get("k").await.is_err(), "a closed store refuses commands");
    Ok(())
}
