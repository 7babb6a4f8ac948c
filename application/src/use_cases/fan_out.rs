//! Fan-out of one question to every model of a group.
//!
//! Each model runs in its own task that owns exactly one
//! [`ResponseWriter`]. Tasks report progress back over a channel so that
//! [`ProgressNotifier`] callbacks all run on the task that awaits
//! [`FanOutRound::wait`].

use crate::ports::llm_gateway::ChatCompletionGateway;
use crate::ports::progress::ProgressNotifier;
use crate::response_store::{ResponseStore, ResponseWriter};
use chatsynth_domain::{ChatRequest, Message, ModelConfig, StreamEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failure reason recorded for sessions stopped by cancellation.
pub const CANCELLED_REASON: &str = "cancelled";

/// Failure reason reported for sessions stopped by the round timeout.
pub const TIMED_OUT_REASON: &str = "timed out";

/// Progress event emitted by a session task
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEvent {
    Started { model_id: String, model_name: String },
    Chunk { model_id: String, chunk: String },
    Ended { model_id: String },
    Failed { model_id: String, reason: String },
}

/// Starts the per-model streaming sessions of a round
pub struct FanOut<G: ChatCompletionGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: ChatCompletionGateway + 'static> FanOut<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Spawn one session per model; sessions stop when `cancel` fires.
    ///
    /// `history` is sent before the question in every request.
    pub fn start(
        &self,
        models: &[ModelConfig],
        history: &[Message],
        question: &str,
        cancel: &CancellationToken,
    ) -> FanOutRound {
        let (store, writers) = ResponseStore::with_slots(models);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut join_set = JoinSet::new();
        let mut tokens = HashMap::new();

        for (config, writer) in models.iter().zip(writers) {
            let request = ChatRequest::new(config.model.clone())
                .with_history(history)
                .with_user_message(question)
                .with_parameters(config.parameters.clone());
            let token = cancel.child_token();
            tokens.insert(config.id.clone(), token.clone());

            let gateway = Arc::clone(&self.gateway);
            let events = events_tx.clone();
            let model_name = config.display_name.clone();
            join_set.spawn(async move {
                run_session(gateway.as_ref(), request, writer, model_name, events, token).await;
            });
        }

        info!("Started {} model sessions", models.len());

        FanOutRound {
            store,
            join_set,
            events: events_rx,
            controls: SessionControls {
                tokens: Arc::new(tokens),
            },
        }
    }
}

/// Per-model abort switches of a running round
#[derive(Debug, Clone)]
pub struct SessionControls {
    tokens: Arc<HashMap<String, CancellationToken>>,
}

impl SessionControls {
    /// Stop one model's session. Returns `false` for unknown ids.
    pub fn abort(&self, model_id: &str) -> bool {
        match self.tokens.get(model_id) {
            Some(token) => {
                debug!("Aborting session {}", model_id);
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// A running fan-out
pub struct FanOutRound {
    store: ResponseStore,
    join_set: JoinSet<()>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    controls: SessionControls,
}

impl FanOutRound {
    /// Read access to the slots while sessions are still running.
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn controls(&self) -> SessionControls {
        self.controls.clone()
    }

    /// Wait until every session ended or `timeout` elapsed.
    ///
    /// On timeout the remaining sessions are aborted. Their slots keep
    /// whatever content arrived and stay incomplete.
    pub async fn wait(
        mut self,
        timeout: Option<Duration>,
        progress: &dyn ProgressNotifier,
    ) -> ResponseStore {
        let deadline = async {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => dispatch(progress, event),
                joined = self.join_set.join_next() => match joined {
                    Some(Err(e)) if !e.is_cancelled() => warn!("Session task failed: {}", e),
                    Some(_) => {}
                    None => break,
                },
                _ = &mut deadline => {
                    self.join_set.abort_all();
                    while self.join_set.join_next().await.is_some() {}
                    while let Ok(event) = self.events.try_recv() {
                        dispatch(progress, event);
                    }
                    for model_id in self.store.open_ids() {
                        warn!("Model {} timed out", model_id);
                        progress.on_model_failed(&model_id, TIMED_OUT_REASON);
                    }
                    return self.store;
                }
            }
        }

        while let Ok(event) = self.events.try_recv() {
            dispatch(progress, event);
        }
        self.store
    }
}

fn dispatch(progress: &dyn ProgressNotifier, event: SessionEvent) {
    match event {
        SessionEvent::Started {
            model_id,
            model_name,
        } => progress.on_model_stream_start(&model_id, &model_name),
        SessionEvent::Chunk { model_id, chunk } => progress.on_model_stream_chunk(&model_id, &chunk),
        SessionEvent::Ended { model_id } => progress.on_model_stream_end(&model_id),
        SessionEvent::Failed { model_id, reason } => progress.on_model_failed(&model_id, &reason),
    }
}

/// Stream one model into its slot.
async fn run_session<G: ChatCompletionGateway + ?Sized>(
    gateway: &G,
    request: ChatRequest,
    writer: ResponseWriter,
    model_name: String,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) {
    let model_id = writer.model_id();
    let _ = events.send(SessionEvent::Started {
        model_id: model_id.clone(),
        model_name,
    });

    let failed = |reason: String| SessionEvent::Failed {
        model_id: model_id.clone(),
        reason,
    };

    let mut handle = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            writer.fail(CANCELLED_REASON);
            let _ = events.send(failed(CANCELLED_REASON.to_string()));
            return;
        }
        result = gateway.stream_chat(request) => match result {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Model {} failed: {}", model_id, e);
                writer.fail(e.to_string());
                let _ = events.send(failed(e.to_string()));
                return;
            }
        },
    };

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Model {} cancelled mid-stream", model_id);
                writer.fail(CANCELLED_REASON);
                let _ = events.send(failed(CANCELLED_REASON.to_string()));
                return;
            }
            event = handle.next() => event,
        };

        match event {
            Some(StreamEvent::Delta(chunk)) => {
                if writer.append(&chunk) {
                    let _ = events.send(SessionEvent::Chunk {
                        model_id: model_id.clone(),
                        chunk,
                    });
                }
            }
            Some(StreamEvent::Completed(text)) => {
                if writer.is_empty() && !text.is_empty() {
                    writer.append(&text);
                    let _ = events.send(SessionEvent::Chunk {
                        model_id: model_id.clone(),
                        chunk: text,
                    });
                }
                writer.complete();
                info!("Model {} completed", model_id);
                let _ = events.send(SessionEvent::Ended {
                    model_id: model_id.clone(),
                });
                return;
            }
            Some(StreamEvent::Error(e)) => {
                warn!("Model {} stream failed: {}", model_id, e);
                writer.fail(e.clone());
                let _ = events.send(failed(e));
                return;
            }
            None => {
                let reason = "stream closed before completion".to_string();
                warn!("Model {}: {}", model_id, reason);
                writer.fail(reason.clone());
                let _ = events.send(failed(reason));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, StreamHandle};
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use chatsynth_domain::{Model, ModelGroup, SynthesisOutcome};
    use std::sync::Mutex;

    /// What a scripted model does when asked
    #[derive(Clone)]
    enum Script {
        Stream(Vec<&'static str>),
        StreamThenError(Vec<&'static str>, &'static str),
        Reject(&'static str),
        /// Sends the chunks and then never finishes
        Hang(Vec<&'static str>),
    }

    struct ScriptedGateway {
        scripts: HashMap<String, Script>,
        requests: Mutex<Vec<ChatRequest>>,
        /// Models whose hanging stream saw its receiver dropped
        released: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedGateway {
        fn new(scripts: Vec<(Model, Script)>) -> Self {
            Self {
                scripts: scripts
                    .into_iter()
                    .map(|(m, s)| (m.as_str().to_string(), s))
                    .collect(),
                requests: Mutex::new(Vec::new()),
                released: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Wait until the stream of `model_id` has been released by its session.
        async fn wait_released(&self, model_id: &str) -> bool {
            let wait = async {
                while !self.released.lock().unwrap().iter().any(|id| id == model_id) {
                    tokio::task::yield_now().await;
                }
            };
            tokio::time::timeout(Duration::from_secs(1), wait).await.is_ok()
        }
    }

    #[async_trait]
    impl ChatCompletionGateway for ScriptedGateway {
        async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
            let script = self
                .scripts
                .get(request.model().as_str())
                .cloned()
                .ok_or_else(|| GatewayError::ModelNotAvailable(request.model().to_string()))?;
            let model_id = request.model().to_string();
            self.requests.lock().unwrap().push(request);

            let (tx, rx) = mpsc::channel(16);
            match script {
                Script::Reject(reason) => return Err(GatewayError::RequestFailed(reason.into())),
                Script::Stream(chunks) => {
                    tokio::spawn(async move {
                        for chunk in chunks {
                            let _ = tx.send(StreamEvent::Delta(chunk.to_string())).await;
                        }
                        let _ = tx.send(StreamEvent::Completed(String::new())).await;
                    });
                }
                Script::StreamThenError(chunks, error) => {
                    tokio::spawn(async move {
                        for chunk in chunks {
                            let _ = tx.send(StreamEvent::Delta(chunk.to_string())).await;
                        }
                        let _ = tx.send(StreamEvent::Error(error.to_string())).await;
                    });
                }
                Script::Hang(chunks) => {
                    let released = Arc::clone(&self.released);
                    tokio::spawn(async move {
                        for chunk in chunks {
                            let _ = tx.send(StreamEvent::Delta(chunk.to_string())).await;
                        }
                        tx.closed().await;
                        released.lock().unwrap().push(model_id);
                    });
                }
            }
            Ok(StreamHandle::new(rx))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_round_start(&self, _group: &ModelGroup) {}
        fn on_round_complete(&self, _outcome: &SynthesisOutcome) {}

        fn on_model_stream_end(&self, model_id: &str) {
            self.events.lock().unwrap().push(format!("end:{}", model_id));
        }

        fn on_model_failed(&self, model_id: &str, reason: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("failed:{}:{}", model_id, reason));
        }
    }

    fn configs(models: &[Model]) -> Vec<ModelConfig> {
        models.iter().cloned().map(ModelConfig::new).collect()
    }

    #[tokio::test]
    async fn test_sessions_fill_slots_in_config_order() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            (Model::Gpt4o, Script::Stream(vec!["A", "1"])),
            (Model::Claude3Haiku, Script::Reject("HTTP 500")),
            (Model::GeminiFlash15, Script::Stream(vec!["C"])),
        ]));
        let models = configs(&[Model::Gpt4o, Model::Claude3Haiku, Model::GeminiFlash15]);

        let round = FanOut::new(gateway).start(&models, &[], "q", &CancellationToken::new());
        let store = round.wait(None, &NoProgress).await;
        let snapshot = store.snapshot();

        assert_eq!(snapshot[0].content, "A1");
        assert!(snapshot[0].is_completed);
        assert!(!snapshot[1].is_completed);
        assert!(snapshot[1].error.as_deref().unwrap().contains("HTTP 500"));
        assert_eq!(snapshot[2].content, "C");
    }

    #[tokio::test]
    async fn test_mid_stream_error_keeps_partial_content() {
        let gateway = Arc::new(ScriptedGateway::new(vec![(
            Model::Gpt4o,
            Script::StreamThenError(vec!["par", "tial"], "connection reset"),
        )]));
        let models = configs(&[Model::Gpt4o]);
        let progress = RecordingProgress::default();

        let store = FanOut::new(gateway)
            .start(&models, &[], "q", &CancellationToken::new())
            .wait(None, &progress)
            .await;

        let response = &store.snapshot()[0];
        assert_eq!(response.content, "partial");
        assert!(!response.is_completed);
        assert_eq!(
            progress.events.lock().unwrap().as_slice(),
            ["failed:openai/gpt-4o:connection reset"]
        );
    }

    #[tokio::test]
    async fn test_requests_carry_history_and_parameters() {
        let gateway = Arc::new(ScriptedGateway::new(vec![(
            Model::Gpt4o,
            Script::Stream(vec!["ok"]),
        )]));
        let mut models = configs(&[Model::Gpt4o]);
        models[0].parameters.temperature = Some(0.7);
        let history = vec![Message::user("earlier"), Message::assistant("answer")];

        FanOut::new(Arc::clone(&gateway))
            .start(&models, &history, "now", &CancellationToken::new())
            .wait(None, &NoProgress)
            .await;

        let requests = gateway.requests.lock().unwrap();
        let messages = requests[0].messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::user("now"));
        assert_eq!(requests[0].parameters().temperature, Some(0.7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_remaining_sessions() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            (Model::Gpt4o, Script::Stream(vec!["fast"])),
            (Model::Claude3Haiku, Script::Hang(vec!["slow"])),
        ]));
        let models = configs(&[Model::Gpt4o, Model::Claude3Haiku]);
        let progress = RecordingProgress::default();

        let store = FanOut::new(Arc::clone(&gateway))
            .start(&models, &[], "q", &CancellationToken::new())
            .wait(Some(Duration::from_secs(30)), &progress)
            .await;
        assert!(gateway.wait_released("anthropic/claude-3-haiku").await);

        let snapshot = store.snapshot();
        assert!(snapshot[0].is_completed);
        assert_eq!(snapshot[1].content, "slow");
        assert!(!snapshot[1].is_completed);
        assert!(
            progress
                .events
                .lock()
                .unwrap()
                .contains(&format!("failed:anthropic/claude-3-haiku:{}", TIMED_OUT_REASON))
        );
    }

    #[tokio::test]
    async fn test_per_model_abort() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            (Model::Gpt4o, Script::Hang(vec!["never finishes"])),
            (Model::Claude3Haiku, Script::Stream(vec!["done"])),
        ]));
        let models = configs(&[Model::Gpt4o, Model::Claude3Haiku]);

        let round =
            FanOut::new(Arc::clone(&gateway)).start(&models, &[], "q", &CancellationToken::new());
        while round.store().snapshot()[0].content.is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(round.controls().abort("openai/gpt-4o"));
        assert!(!round.controls().abort("unknown"));
        let store = round.wait(None, &NoProgress).await;
        assert!(gateway.wait_released("openai/gpt-4o").await);

        let snapshot = store.snapshot();
        assert!(!snapshot[0].is_completed);
        assert_eq!(snapshot[0].error.as_deref(), Some(CANCELLED_REASON));
        assert!(snapshot[1].is_completed);
    }

    #[tokio::test]
    async fn test_round_cancellation_stops_every_session() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            (Model::Gpt4o, Script::Hang(vec![])),
            (Model::Claude3Haiku, Script::Hang(vec![])),
        ]));
        let models = configs(&[Model::Gpt4o, Model::Claude3Haiku]);
        let cancel = CancellationToken::new();

        let round = FanOut::new(gateway).start(&models, &[], "q", &cancel);
        cancel.cancel();
        let store = round.wait(None, &NoProgress).await;

        assert!(store.snapshot().iter().all(|r| !r.is_completed));
        assert!(store.open_ids().is_empty());
    }
}
