// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end consensus: participants that answer by calling gateway tools,
//! plus the committee path, all over one mock gateway.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use zap_client::ZapClient;
use zap_consensus::{Coordinator, Participant};
use zap_core::{ConsensusConfig, ZapError};
use zap_mock::{MockGateway, MockReply, catalog_handler, sample_tools};

async fn connected_client(gateway: MockGateway) -> Arc<ZapClient> {
    let (client_io, server_io) = tokio::io::duplex(1 << 20);
    let (server_read, server_write) = tokio::io::split(server_io);
    gateway.spawn(server_read, server_write);
    let (client_read, client_write) = tokio::io::split(client_io);
    let client = ZapClient::from_uri("zap://mock.local").unwrap();
    client.connect_io(client_read, client_write).await.unwrap();
    Arc::new(client)
}

/// A participant that consults a gateway tool before answering.
struct ToolBacked {
    name: String,
    client: Arc<ZapClient>,
    answer_key: String,
}

#[async_trait]
impl Participant for ToolBacked {
    fn id(&self) -> &str {
        &self.name
    }

    async fn respond(&self, _prompt: &str) -> Result<String, ZapError> {
        // The mock echoes arguments back; the vote is derived from the echo
        // so a broken client surfaces as a captured failure.
        let result = self
            .client
            .call_tool("native/fs.read", json!({"path": self.answer_key}), None)
            .await;
        if !result.success {
            return Err(result.error.unwrap());
        }
        let data = result.data.unwrap();
        Ok(data["echo"]["path"].as_str().unwrap_or("?").to_string())
    }
}

#[tokio::test]
async fn tool_backed_pool_reaches_consensus() {
    let client = connected_client(MockGateway::new(catalog_handler(sample_tools()))).await;

    let pool: Vec<Arc<dyn Participant>> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Arc::new(ToolBacked {
                name: name.to_string(),
                client: Arc::clone(&client),
                // Two participants agree on the same answer.
                answer_key: if i < 2 { "postgres".into() } else { "mongo".into() },
            }) as Arc<dyn Participant>
        })
        .collect();

    let decision = Coordinator::from_pool(pool, None)
        .decide("which database?")
        .await
        .unwrap();

    assert_eq!(decision.answer, "postgres");
    assert!((decision.confidence - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(decision.votes.len(), 3);

    let cert = decision.certificate.unwrap();
    assert_eq!(cert.topic, Sha256::digest(b"which database?").to_vec());
    assert_eq!(cert.proposal_hash, Sha256::digest(b"postgres").to_vec());
    assert_eq!(cert.attestors.len(), 2);
}

#[tokio::test]
async fn committee_and_local_paths_agree_on_the_decision_shape() {
    // Gateway path.
    let committee = MockGateway::new(|method, _payload| {
        assert_eq!(method, "coordination.committee");
        MockReply::Success(json!({
            "answer": "ship it",
            "certificate": {
                "topic": "aa",
                "proposalHash": "bb",
                "round": 1,
                "confidence": 1.0,
                "attestors": [{"nodeId": "m1", "signature": "", "publicKey": ""}],
                "timestamp": 1
            }
        }))
    });
    let client = connected_client(committee).await;
    let remote = Coordinator::from_gateway(Arc::clone(&client), None)
        .decide_opts("ready?", &["m1".to_string()], None)
        .await
        .unwrap();

    // Local path with an equivalent unanimous pool.
    struct Fixed;
    #[async_trait]
    impl Participant for Fixed {
        fn id(&self) -> &str {
            "m1"
        }
        async fn respond(&self, _prompt: &str) -> Result<String, ZapError> {
            Ok("ship it".to_string())
        }
    }
    let local = Coordinator::from_pool(vec![Arc::new(Fixed)], None)
        .decide("ready?")
        .await
        .unwrap();

    assert_eq!(remote.answer, local.answer);
    assert_eq!(remote.confidence, local.confidence);
    assert_eq!(remote.round, local.round);
    // Gateway mode carries no individual votes; local mode does.
    assert!(remote.votes.is_empty());
    assert_eq!(local.votes.len(), 1);
    assert!(remote.certificate.is_some());
    assert!(local.certificate.is_some());
}

#[tokio::test]
async fn raw_proposal_consensus_round_trips() {
    let gateway = MockGateway::new(|method, payload| {
        assert_eq!(method, "coordination.propose");
        assert_eq!(payload["topic"], "746f706963");
        assert_eq!(payload["proposal"], "0102");
        MockReply::Success(json!({
            "result": {
                "winner": "0102",
                "synthesis": "",
                "confidence": 0.75,
                "round": 3,
                "votes": [
                    {"round": 3, "peerId": "n1", "vote": "0102", "confidence": 0.9}
                ]
            }
        }))
    });
    let client = connected_client(gateway).await;

    let config = ConsensusConfig::default();
    let result = client
        .propose_consensus(b"topic", &[1, 2], Some(&config))
        .await
        .unwrap();
    assert_eq!(result.winner, vec![1, 2]);
    assert_eq!(result.round, 3);
    assert!((result.confidence - 0.75).abs() < 1e-9);
    assert_eq!(result.votes.len(), 1);
    assert_eq!(result.votes[0].peer_id, "n1");
    assert_eq!(result.votes[0].luminance, 1.0);
    assert!(result.certificate.is_none());
}
