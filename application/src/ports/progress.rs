//! Progress notification port
//!
//! Defines the interface for reporting progress during a synthesis round.

use chatsynth_domain::{Model, ModelGroup, SynthesisMode, SynthesisOutcome};

/// Callback for progress updates during a round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain logs, etc.). Every callback
/// runs on the task driving the round, never on a per-model task.
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any model is queried
    fn on_round_start(&self, group: &ModelGroup);

    /// Called once the round has a final outcome
    fn on_round_complete(&self, outcome: &SynthesisOutcome);

    // ==================== Model Stream Callbacks ====================

    /// Called when a model's streaming session starts.
    fn on_model_stream_start(&self, _model_id: &str, _model_name: &str) {}

    /// Called for each text chunk from a model.
    fn on_model_stream_chunk(&self, _model_id: &str, _chunk: &str) {}

    /// Called when a model's stream ended normally.
    fn on_model_stream_end(&self, _model_id: &str) {}

    /// Called when a model's stream failed, was aborted or timed out.
    fn on_model_failed(&self, _model_id: &str, _reason: &str) {}

    // ==================== Synthesis Callbacks ====================

    /// Called right before the merge call is issued.
    fn on_synthesis_start(&self, _synthesizer: &Model, _mode: SynthesisMode, _inputs: usize) {}

    /// Called for each merged text chunk, in arrival order.
    fn on_synthesis_chunk(&self, _chunk: &str) {}

    /// Called when the merge call failed and the fallback text is used.
    fn on_synthesis_fallback(&self, _reason: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _group: &ModelGroup) {}
    fn on_round_complete(&self, _outcome: &SynthesisOutcome) {}
}
