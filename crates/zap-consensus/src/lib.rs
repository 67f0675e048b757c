// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-consensus
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Snowball-style majority voting over heterogeneous responders.
//!
//! A [`Coordinator`] answers one question two ways: by delegating to the
//! gateway's committee endpoint, or by fanning the prompt out to a local
//! pool of [`Participant`]s, bucketing the responses, and attesting the
//! winner with a certificate. The participant seam is deliberately thin:
//! anything that can turn a prompt into text can vote.

mod coordinator;
mod voting;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use zap_core::{Certificate, ZapError};

pub use coordinator::{Coordinator, consensus_decide, gateway_consensus};
pub use voting::{normalize_key, tally};

/// A consensus responder: the text-extraction capability the runtime hands
/// to the coordinator.
#[async_trait]
pub trait Participant: Send + Sync {
    /// Stable identifier used in vote records and attestations.
    fn id(&self) -> &str;

    /// Produce this participant's answer to `prompt`.
    ///
    /// # Errors
    ///
    /// Failures are captured by the coordinator as zero-confidence votes;
    /// they never abort the decision.
    async fn respond(&self, prompt: &str) -> Result<String, ZapError>;
}

/// One participant's answer within a round.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantResponse {
    /// Identifier of the responding participant.
    pub participant_id: String,
    /// The response text (trimmed), or an error marker on failure.
    pub response: String,
    /// `1.0` for a delivered answer, `0.0` for a captured failure.
    pub confidence: f64,
    /// Wall-clock latency of the participant call.
    pub latency_ms: u64,
    /// Extra data; failures set `metadata["error"]`.
    pub metadata: BTreeMap<String, Value>,
}

impl ParticipantResponse {
    /// A delivered answer.
    #[must_use]
    pub fn answered(participant_id: String, response: String, latency_ms: u64) -> Self {
        Self {
            participant_id,
            response,
            confidence: 1.0,
            latency_ms,
            metadata: BTreeMap::new(),
        }
    }

    /// A captured failure; never propagated, so vote counting stays
    /// well-defined.
    #[must_use]
    pub fn failed(participant_id: String, error: String, latency_ms: u64) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("error".to_string(), Value::String(error.clone()));
        Self {
            participant_id,
            response: format!("Error: {error}"),
            confidence: 0.0,
            latency_ms,
            metadata,
        }
    }

    /// Whether this response is a captured failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.confidence == 0.0 && self.metadata.contains_key("error")
    }
}

/// Final outcome of a consensus decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The question that was decided.
    pub question: String,
    /// The winning answer.
    pub answer: String,
    /// `|winning bucket| / |responses|` for the adopted round.
    pub confidence: f64,
    /// Number of rounds executed.
    pub round: u32,
    /// Individual votes (empty in gateway mode).
    pub votes: Vec<ParticipantResponse>,
    /// Attestation of the outcome.
    pub certificate: Option<Certificate>,
    /// Synthesized answer, or the winner when no synthesizer is set.
    pub synthesis: String,
    /// Wall-clock duration of the whole decision.
    pub duration_ms: u64,
}
