//! Run Round use case
//!
//! Orchestrates one synthesis round: fan the question out to every model of
//! a group, wait for the sessions, score the answers and merge them.

use crate::config::RoundParams;
use crate::ports::llm_gateway::ChatCompletionGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::fan_out::{FanOut, TIMED_OUT_REASON};
use crate::use_cases::synthesize::SynthesisEngine;
use chatsynth_domain::{
    DomainError, Message, ModelGroup, Question, RoundResult, ScoredResponse, SynthesizerConfig,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors that can occur before a round starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunRoundError {
    #[error("No models configured")]
    NoModels,

    #[error("Invalid model group: {0}")]
    InvalidGroup(#[from] DomainError),
}

/// Input for the RunRound use case
#[derive(Debug, Clone)]
pub struct RoundInput {
    /// The question to ask
    pub question: Question,
    /// Earlier turns sent before the question
    pub history: Vec<Message>,
    /// Models that answer and the synthesizer that merges
    pub group: ModelGroup,
}

impl RoundInput {
    pub fn new(question: Question, group: ModelGroup) -> Self {
        Self {
            question,
            history: Vec::new(),
            group,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Replace the group's synthesizer for this round only.
    pub fn with_synthesizer(mut self, synthesizer: SynthesizerConfig) -> Self {
        self.group.synthesizer = synthesizer;
        self
    }
}

/// Use case for running a synthesis round
pub struct RunRoundUseCase<G: ChatCompletionGateway + 'static> {
    gateway: Arc<G>,
    params: RoundParams,
    cancellation_token: CancellationToken,
}

impl<G: ChatCompletionGateway + 'static> RunRoundUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            params: RoundParams::default(),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_params(mut self, params: RoundParams) -> Self {
        self.params = params;
        self
    }

    /// Round-wide cancellation; cancelling stops every session and the merge call.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn params(&self) -> &RoundParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RoundInput) -> Result<RoundResult, RunRoundError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RoundInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundResult, RunRoundError> {
        self.execute_cancellable(input, progress, &self.cancellation_token)
            .await
    }

    /// Execute one round under its own cancellation token.
    ///
    /// Used by callers that run many rounds and interrupt them one at a time.
    pub async fn execute_cancellable(
        &self,
        input: RoundInput,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<RoundResult, RunRoundError> {
        if input.group.is_empty() {
            return Err(RunRoundError::NoModels);
        }
        input.group.validate()?;

        info!(
            "Starting round with {} models (group '{}')",
            input.group.len(),
            input.group.id
        );
        progress.on_round_start(&input.group);

        let question = input.question.content();
        let round = FanOut::new(Arc::clone(&self.gateway)).start(
            &input.group.models,
            &input.history,
            question,
            cancel,
        );
        let store = round.wait(self.params.timeout, progress).await;

        let mut responses = store.snapshot();
        for response in responses.iter_mut().filter(|r| !r.is_closed()) {
            response.fail(TIMED_OUT_REASON);
        }

        let outcome = SynthesisEngine::new(
            Arc::clone(&self.gateway),
            input.group.synthesizer.clone(),
            self.params.prompt_template(),
        )
        .with_cancellation(cancel.child_token())
        .run(question, &responses, progress)
        .await;

        info!("Round finished: {}", outcome.label());
        progress.on_round_complete(&outcome);

        let scorer = self.params.quality_scorer();
        let scored = responses
            .into_iter()
            .map(|response| ScoredResponse {
                quality: response
                    .is_completed
                    .then(|| scorer.score(&response.content)),
                response,
            })
            .collect();

        Ok(RoundResult::new(
            question,
            input.group.title.clone(),
            scored,
            outcome,
        ))
    }
}
