//! Synthesis engine
//!
//! Merges the completed responses of a round with one streaming call to the
//! synthesizer model and falls back to [`FallbackSynthesizer`] on failure.
//!
//! ```text
//! Idle → Filtering → NoResponses
//!                  → Merging → Streaming → Done
//!                            ↘ FallbackEmitting → Done
//! ```
//!
//! The engine is consumed by [`SynthesisEngine::run`] and always yields a
//! [`SynthesisOutcome`]; failures never escape as errors.

use crate::ports::llm_gateway::ChatCompletionGateway;
use crate::ports::progress::ProgressNotifier;
use chatsynth_domain::{
    ChatRequest, FallbackSynthesizer, ModelResponse, PromptTemplate, StreamEvent,
    SynthesisOutcome, SynthesizerConfig,
};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// States of one synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Filtering,
    NoResponses,
    Merging,
    Streaming,
    FallbackEmitting,
    Done,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Filtering => "filtering",
            EngineState::NoResponses => "no-responses",
            EngineState::Merging => "merging",
            EngineState::Streaming => "streaming",
            EngineState::FallbackEmitting => "fallback-emitting",
            EngineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Single-use merge of one round's responses
pub struct SynthesisEngine<G: ChatCompletionGateway + ?Sized> {
    gateway: Arc<G>,
    config: SynthesizerConfig,
    template: PromptTemplate,
    cancel: CancellationToken,
    state: EngineState,
    trace: Vec<EngineState>,
}

impl<G: ChatCompletionGateway + ?Sized> SynthesisEngine<G> {
    pub fn new(gateway: Arc<G>, config: SynthesizerConfig, template: PromptTemplate) -> Self {
        Self {
            gateway,
            config,
            template,
            cancel: CancellationToken::new(),
            state: EngineState::Idle,
            trace: vec![EngineState::Idle],
        }
    }

    /// Abort the merge call when `token` fires; the fallback is used instead.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Merge `responses` for `question`, forwarding merged chunks to `progress`.
    pub async fn run(
        self,
        question: &str,
        responses: &[ModelResponse],
        progress: &dyn ProgressNotifier,
    ) -> SynthesisOutcome {
        self.run_traced(question, responses, progress).await.0
    }

    /// Like [`run`](Self::run), also returning every state visited.
    pub async fn run_traced(
        mut self,
        question: &str,
        responses: &[ModelResponse],
        progress: &dyn ProgressNotifier,
    ) -> (SynthesisOutcome, Vec<EngineState>) {
        self.transition(EngineState::Filtering);

        if responses.is_empty() {
            info!("Synthesis skipped: no responses");
            self.transition(EngineState::NoResponses);
            self.transition(EngineState::Done);
            return (SynthesisOutcome::no_responses(), self.trace);
        }

        let completed: Vec<ModelResponse> = responses
            .iter()
            .filter(|r| r.is_usable())
            .cloned()
            .collect();

        if completed.is_empty() {
            info!(
                "Synthesis skipped: none of {} responses completed",
                responses.len()
            );
            self.transition(EngineState::NoResponses);
            self.transition(EngineState::Done);
            return (SynthesisOutcome::no_completed_responses(), self.trace);
        }

        self.transition(EngineState::Merging);
        let outcome = match self.merge(question, &completed, progress).await {
            Ok(text) => SynthesisOutcome::Merged {
                synthesizer: self.config.model.clone(),
                mode: self.config.mode,
                text,
            },
            Err(reason) => {
                self.transition(EngineState::FallbackEmitting);
                warn!("Synthesis failed, using fallback: {}", reason);
                progress.on_synthesis_fallback(&reason);
                SynthesisOutcome::Fallback {
                    synthesizer: self.config.model.clone(),
                    mode: self.config.mode,
                    text: FallbackSynthesizer::merge(self.config.mode, &completed),
                    reason,
                }
            }
        };

        self.transition(EngineState::Done);
        (outcome, self.trace)
    }

    /// Issue the merge call and stream it. `Err` carries the failure reason.
    async fn merge(
        &mut self,
        question: &str,
        completed: &[ModelResponse],
        progress: &dyn ProgressNotifier,
    ) -> Result<String, String> {
        let strategy = self.config.strategy_for(completed.len());
        let prompt = self.template.build(strategy, question, completed);
        let request = ChatRequest::new(self.config.model.clone())
            .with_system_prompt(prompt.system)
            .with_user_message(prompt.user)
            .with_parameters(self.config.merge_parameters());

        info!(
            "Synthesizing {} responses with {} ({} mode)",
            completed.len(),
            self.config.model,
            strategy.mode()
        );
        if let Some(threshold) = strategy.threshold() {
            debug!("Intersection threshold: {}", threshold);
        }
        progress.on_synthesis_start(&self.config.model, strategy.mode(), completed.len());

        let mut handle = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err("cancelled".to_string()),
            result = self.gateway.stream_chat(request) => result.map_err(|e| e.to_string())?,
        };

        self.transition(EngineState::Streaming);
        let mut merged = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err("cancelled".to_string()),
                event = handle.next() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    progress.on_synthesis_chunk(&chunk);
                    merged.push_str(&chunk);
                }
                Some(StreamEvent::Completed(text)) => {
                    if merged.is_empty() && !text.is_empty() {
                        progress.on_synthesis_chunk(&text);
                        merged = text;
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => return Err(e),
                None => return Err("merge stream closed before completion".to_string()),
            }
        }

        if merged.is_empty() {
            return Err("synthesizer returned no text".to_string());
        }
        Ok(merged)
    }

    fn transition(&mut self, next: EngineState) {
        debug!("Synthesis state: {} -> {}", self.state, next);
        self.state = next;
        self.trace.push(next);
    }
}
