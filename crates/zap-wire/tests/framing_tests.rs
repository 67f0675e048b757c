// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame I/O over in-memory duplex streams.

use serde_json::json;
use tokio::io::AsyncWriteExt;
use zap_wire::{FrameCodec, WireError, ZapMessage, read_frame, write_frame};

#[tokio::test]
async fn write_then_read_round_trips() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let msg = ZapMessage::new("ping", "id-1", json!({}));
    write_frame(&mut client, &msg).await.unwrap();
    let got = read_frame(&mut server).await.unwrap();
    assert_eq!(got, msg);
}

#[tokio::test]
async fn multiple_frames_preserve_boundaries() {
    let (mut client, mut server) = tokio::io::duplex(16384);
    for i in 0..5 {
        let msg = ZapMessage::new("catalog.search", format!("id-{i}"), json!({"query": i}));
        write_frame(&mut client, &msg).await.unwrap();
    }
    for i in 0..5 {
        let got = read_frame(&mut server).await.unwrap();
        assert_eq!(got.id, format!("id-{i}"));
        assert_eq!(got.payload["query"], i);
    }
}

#[tokio::test]
async fn eof_between_frames_is_connection_closed() {
    let (client, mut server) = tokio::io::duplex(4096);
    drop(client);
    assert!(matches!(
        read_frame(&mut server).await,
        Err(WireError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn short_read_inside_prefix_is_connection_closed() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    client.write_all(&[0, 0]).await.unwrap();
    drop(client);
    assert!(matches!(
        read_frame(&mut server).await,
        Err(WireError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn short_read_inside_body_is_connection_closed() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let msg = ZapMessage::new("ping", "id-1", json!({"k": "v"}));
    let frame = FrameCodec::encode(&msg).unwrap();
    client.write_all(&frame[..frame.len() - 3]).await.unwrap();
    drop(client);
    assert!(matches!(
        read_frame(&mut server).await,
        Err(WireError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversize_prefix_is_rejected_before_reading_the_body() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    client.write_all(&u32::MAX.to_be_bytes()).await.unwrap();
    assert!(matches!(
        read_frame(&mut server).await,
        Err(WireError::Oversize { .. })
    ));
}

#[tokio::test]
async fn garbage_body_is_a_codec_error_not_io() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let body = b"not json at all";
    client
        .write_all(&(body.len() as u32).to_be_bytes())
        .await
        .unwrap();
    client.write_all(body).await.unwrap();
    assert!(matches!(
        read_frame(&mut server).await,
        Err(WireError::Json(_))
    ));
}
