//! Ordered per-model response slots shared between streaming sessions and
//! the synthesis engine.
//!
//! Every slot is a `tokio::sync::watch` channel. The session that owns a
//! slot holds the only [`ResponseWriter`]; the [`ResponseStore`] keeps the
//! receivers in configuration order and hands out snapshots. When a writer
//! is dropped mid-stream (abort, timeout) the last written value stays
//! readable as an incomplete record.

use chatsynth_domain::{ModelConfig, ModelResponse};
use tokio::sync::watch;

/// Read side of all slots of one round
#[derive(Debug, Clone)]
pub struct ResponseStore {
    slots: Vec<watch::Receiver<ModelResponse>>,
}

/// Exclusive write side of one slot
#[derive(Debug)]
pub struct ResponseWriter {
    tx: watch::Sender<ModelResponse>,
}

impl ResponseStore {
    /// Create one started slot per model, in the given order.
    pub fn with_slots<'a, I>(models: I) -> (Self, Vec<ResponseWriter>)
    where
        I: IntoIterator<Item = &'a ModelConfig>,
    {
        let (slots, writers) = models
            .into_iter()
            .map(|config| {
                let (tx, rx) =
                    watch::channel(ModelResponse::started(&config.id, &config.display_name));
                (rx, ResponseWriter { tx })
            })
            .unzip();
        (Self { slots }, writers)
    }

    /// Current state of every slot in configuration order.
    pub fn snapshot(&self) -> Vec<ModelResponse> {
        self.slots.iter().map(|rx| rx.borrow().clone()).collect()
    }

    /// Current state of one slot.
    pub fn get(&self, model_id: &str) -> Option<ModelResponse> {
        self.slots
            .iter()
            .map(|rx| rx.borrow())
            .find(|r| r.model_id == model_id)
            .map(|r| (*r).clone())
    }

    /// Ids of slots that neither completed nor failed.
    pub fn open_ids(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|rx| rx.borrow())
            .filter(|r| !r.is_closed())
            .map(|r| r.model_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl ResponseWriter {
    pub fn model_id(&self) -> String {
        self.tx.borrow().model_id.clone()
    }

    /// Append a delta; ignored once the slot is closed.
    pub fn append(&self, delta: &str) -> bool {
        self.tx.send_if_modified(|response| response.append(delta))
    }

    pub fn complete(&self) {
        self.tx.send_modify(ModelResponse::complete);
    }

    pub fn fail(&self, error: impl Into<String>) {
        let error = error.into();
        self.tx.send_modify(|response| response.fail(error));
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsynth_domain::Model;

    fn configs() -> Vec<ModelConfig> {
        vec![
            ModelConfig::new(Model::Gpt4oMini),
            ModelConfig::new(Model::Claude3Haiku),
            ModelConfig::new(Model::GeminiFlash15),
        ]
    }

    #[test]
    fn test_snapshot_keeps_configuration_order() {
        let configs = configs();
        let (store, writers) = ResponseStore::with_slots(&configs);

        // complete in reverse order
        for writer in writers.iter().rev() {
            writer.append("done");
            writer.complete();
        }

        let ids: Vec<String> = store.snapshot().into_iter().map(|r| r.model_id).collect();
        let expected: Vec<String> = configs.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_writer_updates_are_visible() {
        let configs = configs();
        let (store, writers) = ResponseStore::with_slots(&configs[..1]);
        let writer = &writers[0];

        assert!(writer.append("Hello, "));
        assert!(writer.append("world"));
        writer.complete();
        assert!(!writer.append("late"));

        let response = store.get(&configs[0].id).unwrap();
        assert_eq!(response.content, "Hello, world");
        assert!(response.is_completed);
        assert!(store.open_ids().is_empty());
    }

    #[test]
    fn test_dropped_writer_leaves_partial_record() {
        let configs = configs();
        let (store, mut writers) = ResponseStore::with_slots(&configs[..2]);

        writers[1].append("partial");
        writers.clear();

        let snapshot = store.snapshot();
        assert_eq!(snapshot[1].content, "partial");
        assert!(!snapshot[1].is_completed);
        assert_eq!(store.open_ids().len(), 2);
    }

    #[test]
    fn test_failure_keeps_content() {
        let configs = configs();
        let (store, writers) = ResponseStore::with_slots(&configs[..1]);
        writers[0].append("half");
        writers[0].fail("connection reset");

        let response = &store.snapshot()[0];
        assert_eq!(response.content, "half");
        assert_eq!(response.error.as_deref(), Some("connection reset"));
        assert!(!response.is_usable());
    }
}
