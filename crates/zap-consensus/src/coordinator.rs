// SPDX-License-Identifier: MIT OR Apache-2.0
//! The consensus coordinator: gateway committee or local pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zap_client::ZapClient;
use zap_core::{Attestor, Certificate, ConsensusConfig, ZapError};

use crate::voting::{normalize_key, tally};
use crate::{Decision, Participant, ParticipantResponse};

enum Mode {
    Gateway(Arc<ZapClient>),
    Pool(Vec<Arc<dyn Participant>>),
}

/// Runs `decide` over a gateway committee or a local participant pool.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use zap_consensus::Coordinator;
///
/// # async fn demo(pool: Vec<Arc<dyn zap_consensus::Participant>>) -> Result<(), zap_core::ZapError> {
/// let coordinator = Coordinator::from_pool(pool, None);
/// let decision = coordinator.decide("Should we use PostgreSQL or MongoDB?").await?;
/// println!("{} (confidence {:.2})", decision.answer, decision.confidence);
/// # Ok(())
/// # }
/// ```
pub struct Coordinator {
    mode: Mode,
    config: ConsensusConfig,
    synthesizer: Option<Arc<dyn Participant>>,
}

impl Coordinator {
    /// Delegate decisions to the gateway's `coordination.committee`.
    #[must_use]
    pub fn from_gateway(client: Arc<ZapClient>, config: Option<ConsensusConfig>) -> Self {
        Self {
            mode: Mode::Gateway(client),
            config: config.unwrap_or_default(),
            synthesizer: None,
        }
    }

    /// Run decisions across a local pool of participants.
    #[must_use]
    pub fn from_pool(pool: Vec<Arc<dyn Participant>>, config: Option<ConsensusConfig>) -> Self {
        Self {
            mode: Mode::Pool(pool),
            config: config.unwrap_or_default(),
            synthesizer: None,
        }
    }

    /// Use `synthesizer` to compose the final answer from all votes.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Participant>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Connect the underlying gateway client, when there is one.
    ///
    /// # Errors
    ///
    /// Connection failures surface unchanged.
    pub async fn connect(&self) -> Result<(), ZapError> {
        if let Mode::Gateway(client) = &self.mode {
            client.connect().await?;
        }
        Ok(())
    }

    /// Close the underlying gateway client, when there is one.
    pub async fn close(&self) {
        if let Mode::Gateway(client) = &self.mode {
            client.close().await;
        }
    }

    /// Decide `question` with no gateway participants and no extra context.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::decide_opts`].
    pub async fn decide(&self, question: &str) -> Result<Decision, ZapError> {
        self.decide_opts(question, &[], None).await
    }

    /// Decide `question`.
    ///
    /// `participants` names the committee members in gateway mode and is
    /// ignored for local pools. `context` is serialized into the prompt.
    ///
    /// # Errors
    ///
    /// `invalidParams` for invalid configs or an empty pool; gateway
    /// failures surface unchanged. Individual participant failures never
    /// error; they become zero-confidence votes.
    pub async fn decide_opts(
        &self,
        question: &str,
        participants: &[String],
        context: Option<&Value>,
    ) -> Result<Decision, ZapError> {
        self.config.validate()?;
        let start = Instant::now();
        let mut decision = match &self.mode {
            Mode::Gateway(client) => {
                self.decide_gateway(client, question, participants).await?
            }
            Mode::Pool(pool) => self.decide_local(pool, question, context).await?,
        };
        decision.duration_ms = start.elapsed().as_millis() as u64;
        Ok(decision)
    }

    async fn decide_gateway(
        &self,
        client: &Arc<ZapClient>,
        question: &str,
        participants: &[String],
    ) -> Result<Decision, ZapError> {
        let (answer, certificate) = client
            .committee_query(question, participants, Some(&self.config))
            .await?;
        debug!(
            target: "zap.consensus",
            "committee answered round={} confidence={:.3}",
            certificate.round, certificate.confidence
        );
        Ok(Decision {
            question: question.to_string(),
            answer: answer.clone(),
            confidence: certificate.confidence,
            round: certificate.round,
            // The gateway does not expose individual votes.
            votes: Vec::new(),
            certificate: Some(certificate),
            synthesis: answer,
            duration_ms: 0,
        })
    }

    async fn decide_local(
        &self,
        pool: &[Arc<dyn Participant>],
        question: &str,
        context: Option<&Value>,
    ) -> Result<Decision, ZapError> {
        if pool.is_empty() {
            return Err(ZapError::invalid_params("no participants configured"));
        }

        let prompt = match context {
            Some(ctx) => format!("Context: {ctx}\n\nQuestion: {question}"),
            None => question.to_string(),
        };
        let per_call = Duration::from_millis(self.config.timeout_ms);

        // Fresh fan-out per round; keep the best round seen so the reported
        // confidence never decreases, and stop early at finality.
        let mut best: Option<(String, f64, Vec<ParticipantResponse>)> = None;
        let mut rounds_run = 0;
        for round in 1..=self.config.rounds {
            rounds_run = round;
            let responses = collect_responses(pool, &prompt, per_call).await;
            let (winner, confidence) = tally(&responses);
            debug!(
                target: "zap.consensus",
                "round {round}: {} responses, confidence {confidence:.3}",
                responses.len()
            );
            if best
                .as_ref()
                .is_none_or(|(_, best_confidence, _)| confidence >= *best_confidence)
            {
                best = Some((winner, confidence, responses));
            }
            let reached_finality = best
                .as_ref()
                .is_some_and(|(_, c, _)| *c >= self.config.beta2);
            if reached_finality {
                break;
            }
        }
        let (winner, confidence, responses) = best.expect("rounds >= 1 guarantees one outcome");

        let synthesis = match &self.synthesizer {
            Some(synthesizer) => {
                synthesize(synthesizer, question, &responses, &winner, per_call).await
            }
            None => winner.clone(),
        };

        let certificate = build_certificate(question, &winner, confidence, rounds_run, &responses);

        Ok(Decision {
            question: question.to_string(),
            answer: winner,
            confidence,
            round: rounds_run,
            votes: responses,
            certificate: Some(certificate),
            synthesis,
            duration_ms: 0,
        })
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.mode {
            Mode::Gateway(client) => format!("gateway({})", client.endpoint()),
            Mode::Pool(pool) => format!("pool({})", pool.len()),
        };
        f.debug_struct("Coordinator")
            .field("mode", &mode)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Query every participant in parallel, capturing failures as
/// zero-confidence responses.
async fn collect_responses(
    pool: &[Arc<dyn Participant>],
    prompt: &str,
    per_call: Duration,
) -> Vec<ParticipantResponse> {
    let calls = pool.iter().enumerate().map(|(idx, participant)| {
        let participant = Arc::clone(participant);
        let prompt = prompt.to_string();
        async move {
            let start = Instant::now();
            let participant_id = format!("agent_{idx}_{}", participant.id());
            match tokio::time::timeout(per_call, participant.respond(&prompt)).await {
                Ok(Ok(text)) => ParticipantResponse::answered(
                    participant_id,
                    text.trim().to_string(),
                    start.elapsed().as_millis() as u64,
                ),
                Ok(Err(e)) => {
                    warn!(target: "zap.consensus", "participant {participant_id} failed: {e}");
                    ParticipantResponse::failed(
                        participant_id,
                        e.to_string(),
                        start.elapsed().as_millis() as u64,
                    )
                }
                Err(_) => {
                    warn!(target: "zap.consensus", "participant {participant_id} timed out");
                    ParticipantResponse::failed(
                        participant_id,
                        "participant timed out".to_string(),
                        start.elapsed().as_millis() as u64,
                    )
                }
            }
        }
    });
    join_all(calls).await
}

/// Compose the synthesis prompt and run the synthesizer; fall back to the
/// winner if it fails.
async fn synthesize(
    synthesizer: &Arc<dyn Participant>,
    question: &str,
    responses: &[ParticipantResponse],
    winner: &str,
    per_call: Duration,
) -> String {
    let responses_text = responses
        .iter()
        .filter(|r| r.confidence > 0.0)
        .map(|r| format!("- {}", r.response))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Given the following question and responses, synthesize the best answer.\n\n\
         Question: {question}\n\n\
         Responses:\n{responses_text}\n\n\
         Most common response: {winner}\n\n\
         Provide a clear, synthesized answer that incorporates the best elements."
    );
    match tokio::time::timeout(per_call, synthesizer.respond(&prompt)).await {
        Ok(Ok(text)) => text.trim().to_string(),
        Ok(Err(e)) => {
            warn!(target: "zap.consensus", "synthesizer failed: {e}; using the winner");
            winner.to_string()
        }
        Err(_) => {
            warn!(target: "zap.consensus", "synthesizer timed out; using the winner");
            winner.to_string()
        }
    }
}

/// Attest the outcome: hashes of question and winner, plus every
/// participant whose response landed in the winning bucket.
fn build_certificate(
    question: &str,
    winner: &str,
    confidence: f64,
    round: u32,
    responses: &[ParticipantResponse],
) -> Certificate {
    let winner_key = normalize_key(winner);
    let attestors = responses
        .iter()
        .filter(|r| normalize_key(&r.response) == winner_key)
        .map(|r| Attestor {
            node_id: r.participant_id.clone(),
            signature: String::new(),
            public_key: String::new(),
        })
        .collect();
    Certificate {
        topic: Sha256::digest(question.as_bytes()).to_vec(),
        proposal_hash: Sha256::digest(winner.as_bytes()).to_vec(),
        round,
        confidence,
        attestors,
        timestamp: Utc::now().timestamp_millis() as u64,
    }
}

/// One-shot local-pool decision.
///
/// # Errors
///
/// See [`Coordinator::decide_opts`].
pub async fn consensus_decide(
    question: &str,
    pool: Vec<Arc<dyn Participant>>,
    config: Option<ConsensusConfig>,
) -> Result<Decision, ZapError> {
    Coordinator::from_pool(pool, config).decide(question).await
}

/// One-shot gateway committee decision: connect, decide, close.
///
/// # Errors
///
/// `invalidParams` for bad URIs/configs; connection and committee failures
/// surface unchanged.
pub async fn gateway_consensus(
    question: &str,
    gateway_uri: &str,
    participants: &[String],
    config: Option<ConsensusConfig>,
) -> Result<Decision, ZapError> {
    let client = Arc::new(ZapClient::from_uri(gateway_uri)?);
    client.connect().await?;
    let coordinator = Coordinator::from_gateway(Arc::clone(&client), config);
    let decision = coordinator.decide_opts(question, participants, None).await;
    client.close().await;
    decision
}
