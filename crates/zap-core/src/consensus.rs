// SPDX-License-Identifier: MIT OR Apache-2.0
//! Consensus configuration, votes, and certificates.
//!
//! Wire forms for the `coordination.*` surface. The coordinator lives in a
//! separate crate; these types are shared between the gateway path and the
//! local-pool path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ZapError;
use crate::hexstr;

/// Parameters for Snowball-style majority voting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusConfig {
    /// Maximum number of query rounds.
    pub rounds: u32,
    /// Sample size per round.
    pub k: u32,
    /// Confidence floor for accepting a preference.
    pub alpha: f64,
    /// Phase-I threshold.
    pub beta1: f64,
    /// Finality threshold.
    pub beta2: f64,
    /// Per-round timeout in milliseconds.
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            k: 5,
            alpha: 0.6,
            beta1: 0.8,
            beta2: 0.9,
            timeout_ms: 10_000,
        }
    }
}

impl ConsensusConfig {
    /// Check the structural constraints: `0 < alpha ≤ beta1 ≤ beta2 ≤ 1`,
    /// `rounds ≥ 1`, `k ≥ 1`.
    ///
    /// # Errors
    ///
    /// Returns `invalidParams` naming the violated constraint.
    pub fn validate(&self) -> Result<(), ZapError> {
        if self.rounds < 1 {
            return Err(ZapError::invalid_params("consensus rounds must be >= 1"));
        }
        if self.k < 1 {
            return Err(ZapError::invalid_params("consensus sample size k must be >= 1"));
        }
        if !(self.alpha > 0.0 && self.alpha <= self.beta1) {
            return Err(ZapError::invalid_params(
                "consensus thresholds must satisfy 0 < alpha <= beta1",
            ));
        }
        if !(self.beta1 <= self.beta2 && self.beta2 <= 1.0) {
            return Err(ZapError::invalid_params(
                "consensus thresholds must satisfy beta1 <= beta2 <= 1",
            ));
        }
        Ok(())
    }
}

/// A single vote in a consensus round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusVote {
    /// Round the vote was cast in.
    pub round: u32,
    /// Identifier of the voting peer.
    pub peer_id: String,
    /// The voted value.
    #[serde(with = "hexstr")]
    pub vote: Vec<u8>,
    /// Voter-reported confidence in `[0, 1]`.
    pub confidence: f64,
    /// Per-vote quality weight in `[0, 1]`; `1.0` when unused.
    #[serde(default = "default_luminance")]
    pub luminance: f64,
    /// Vote signature (carried, not verified).
    #[serde(default, with = "hexstr")]
    pub signature: Vec<u8>,
    /// Vote timestamp in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

fn default_luminance() -> f64 {
    1.0
}

/// One attestor entry in a [`Certificate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestor {
    /// Identifier of the attesting node or participant.
    pub node_id: String,
    /// Attestation signature (carried, not verified).
    #[serde(default)]
    pub signature: String,
    /// Attestor public key.
    #[serde(default)]
    pub public_key: String,
}

/// Structured attestation of a consensus outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// SHA-256 of the question the consensus ran over.
    #[serde(default, with = "hexstr")]
    pub topic: Vec<u8>,
    /// SHA-256 of the winning proposal.
    #[serde(default, with = "hexstr")]
    pub proposal_hash: Vec<u8>,
    /// Round the decision finalized in.
    #[serde(default)]
    pub round: u32,
    /// Final confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Participants that backed the winner.
    #[serde(default)]
    pub attestors: Vec<Attestor>,
    /// Certificate timestamp in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

/// Reply payload of a raw `coordination.propose` consensus run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    /// The winning value.
    #[serde(default, with = "hexstr")]
    pub winner: Vec<u8>,
    /// Synthesized answer text, when the gateway produced one.
    #[serde(default)]
    pub synthesis: String,
    /// Final confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Round the decision finalized in.
    #[serde(default)]
    pub round: u32,
    /// Individual votes, when exposed.
    #[serde(default)]
    pub votes: Vec<ConsensusVote>,
    /// Attestation certificate, when issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    /// Wall-clock duration in nanoseconds.
    #[serde(default)]
    pub duration_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults_match_protocol() {
        let cfg = ConsensusConfig::default();
        assert_eq!(cfg.rounds, 3);
        assert_eq!(cfg.k, 5);
        assert_eq!(cfg.alpha, 0.6);
        assert_eq!(cfg.beta1, 0.8);
        assert_eq!(cfg.beta2, 0.9);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn wire_form_uses_timeout_ms_key() {
        let value = serde_json::to_value(ConsensusConfig::default()).unwrap();
        assert_eq!(value["timeoutMs"], 10_000);
        assert_eq!(value["beta1"], 0.8);
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let mut cfg = ConsensusConfig::default();
        cfg.alpha = 0.0;
        assert_eq!(cfg.validate().unwrap_err().code, ErrorCode::InvalidParams);

        let mut cfg = ConsensusConfig::default();
        cfg.beta1 = 0.95; // above beta2
        assert!(cfg.validate().is_err());

        let mut cfg = ConsensusConfig::default();
        cfg.beta2 = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = ConsensusConfig::default();
        cfg.rounds = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ConsensusConfig::default();
        cfg.k = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn vote_bytes_are_hex_on_the_wire() {
        let vote = ConsensusVote {
            round: 1,
            peer_id: "peer-1".into(),
            vote: b"A".to_vec(),
            confidence: 1.0,
            luminance: 1.0,
            signature: Vec::new(),
            timestamp: 0,
        };
        let value = serde_json::to_value(&vote).unwrap();
        assert_eq!(value["vote"], "41");
        assert_eq!(value["peerId"], "peer-1");
        assert_eq!(value["signature"], "");
    }

    #[test]
    fn vote_luminance_defaults_to_one() {
        let vote: ConsensusVote = serde_json::from_str(
            r#"{"round":1,"peerId":"p","vote":"41","confidence":0.5}"#,
        )
        .unwrap();
        assert_eq!(vote.luminance, 1.0);
    }

    #[test]
    fn certificate_round_trip() {
        let cert = Certificate {
            topic: vec![1; 32],
            proposal_hash: vec![2; 32],
            round: 2,
            confidence: 0.83,
            attestors: vec![Attestor {
                node_id: "n1".into(),
                signature: String::new(),
                public_key: String::new(),
            }],
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&cert).unwrap();
        assert_eq!(value["proposalHash"], hex::encode(vec![2u8; 32]));
        assert_eq!(value["attestors"][0]["nodeId"], "n1");
        let back: Certificate = serde_json::from_value(value).unwrap();
        assert_eq!(back, cert);
    }
}
