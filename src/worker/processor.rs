//! Message processing for availability-check requests

use crate::automation::TaskRunner;
use crate::db::ResultStore;
use crate::error::Result;
use crate::messages::AvailabilityRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

/// Terminal result of handling one message.
///
/// Only `Success` acknowledges the message; the other two leave it for
/// queue redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Processed; delete the message
    Success,
    /// Processing failed; leave the message for redelivery
    Failure,
    /// The per-message timeout expired; leave the message for redelivery
    Timeout,
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success)
    }
}

/// Strategy the consumer invokes for each decoded message body.
///
/// Implementations must contain every error: nothing raised here may reach
/// the consumer loop.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process(&self, body: &serde_json::Value) -> ProcessingOutcome;
}

/// Processes one availability-check request: validates the body, runs the
/// browser agent, and persists the result in a single store transaction.
pub struct AvailabilityProcessor<S: ResultStore, R: TaskRunner> {
    store: S,
    runner: R,
    task_timeout: Duration,
}

impl<S: ResultStore, R: TaskRunner> AvailabilityProcessor<S, R> {
    pub fn new(store: S, runner: R, task_timeout: Duration) -> Self {
        Self {
            store,
            runner,
            task_timeout,
        }
    }

    /// One unit of work: decode, ping the store, run the task, persist.
    ///
    /// The transaction spans the liveness ping and the result write; every
    /// error path drops it un-committed, which rolls back.
    async fn process_request(&self, body: &serde_json::Value) -> Result<()> {
        let request = AvailabilityRequest::from_value(body)?;

        let mut tx = self.store.begin().await?;
        // Fail fast before spending minutes in the browser
        tx.ping().await?;

        let result = self.runner.run_task(&request.task_data.task).await?;
        match result {
            None => {
                info!("No availability returned from browser agent");
            }
            Some(items) => {
                let payload = serde_json::to_value(&items.items)?;
                tx.save_response(request.task_id, &payload).await?;
                info!(
                    "Stored {} availability item(s) for task {}",
                    items.items.len(),
                    request.task_id
                );
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl<S: ResultStore, R: TaskRunner> MessageProcessor for AvailabilityProcessor<S, R> {
    async fn process(&self, body: &serde_json::Value) -> ProcessingOutcome {
        match tokio::time::timeout(self.task_timeout, self.process_request(body)).await {
            Ok(Ok(())) => ProcessingOutcome::Success,
            Ok(Err(e)) => {
                error!("Error processing message: {e} (payload: {body})");
                ProcessingOutcome::Failure
            }
            Err(_) => {
                error!(
                    "Timeout while processing message after {:?}",
                    self.task_timeout
                );
                ProcessingOutcome::Timeout
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreTransaction;
    use crate::error::WorkerError;
    use crate::messages::{AvailabilityItem, AvailabilityItems};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct StoreState {
        pings: usize,
        committed: Vec<(i32, serde_json::Value)>,
    }

    /// In-memory store double: writes buffer in the transaction and only
    /// land in shared state on commit, mirroring rollback-on-drop.
    #[derive(Clone, Default)]
    struct MemoryStore {
        state: Arc<Mutex<StoreState>>,
        fail_begin: bool,
        fail_save: bool,
    }

    struct MemoryTransaction {
        state: Arc<Mutex<StoreState>>,
        buffered: Vec<(i32, serde_json::Value)>,
        fail_save: bool,
    }

    #[async_trait]
    impl ResultStore for MemoryStore {
        async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
            if self.fail_begin {
                return Err(WorkerError::ConfigError("store unreachable".to_string()));
            }
            Ok(Box::new(MemoryTransaction {
                state: Arc::clone(&self.state),
                buffered: Vec::new(),
                fail_save: self.fail_save,
            }))
        }
    }

    #[async_trait]
    impl StoreTransaction for MemoryTransaction {
        async fn ping(&mut self) -> Result<()> {
            self.state.lock().unwrap().pings += 1;
            Ok(())
        }

        async fn save_response(
            &mut self,
            task_id: i32,
            response: &serde_json::Value,
        ) -> Result<()> {
            if self.fail_save {
                return Err(WorkerError::ConfigError("write failed".to_string()));
            }
            self.buffered.push((task_id, response.clone()));
            Ok(())
        }

        async fn commit(self: Box<Self>) -> Result<()> {
            self.state.lock().unwrap().committed.extend(self.buffered);
            Ok(())
        }
    }

    enum RunnerScript {
        Items(AvailabilityItems),
        Empty,
        Fail,
        Hang,
    }

    struct StubRunner {
        script: RunnerScript,
    }

    #[async_trait]
    impl TaskRunner for StubRunner {
        async fn run_task(&self, _task: &str) -> Result<Option<AvailabilityItems>> {
            match &self.script {
                RunnerScript::Items(items) => Ok(Some(items.clone())),
                RunnerScript::Empty => Ok(None),
                RunnerScript::Fail => Err(WorkerError::AgentError("browser crashed".to_string())),
                RunnerScript::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    fn sample_items() -> AvailabilityItems {
        AvailabilityItems {
            items: vec![AvailabilityItem {
                date: "2025-03-03".to_string(),
                times: vec!["18:00".to_string(), "20:00".to_string()],
            }],
            captcha_encountered: false,
        }
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "task_data": {"task": "find availability for X on 2025-03-03"},
            "task_id": 42
        })
    }

    fn processor(
        store: MemoryStore,
        script: RunnerScript,
        timeout: Duration,
    ) -> AvailabilityProcessor<MemoryStore, StubRunner> {
        AvailabilityProcessor::new(store, StubRunner { script }, timeout)
    }

    #[tokio::test]
    async fn test_result_persisted_for_correct_task_id() {
        let store = MemoryStore::default();
        let processor = processor(
            store.clone(),
            RunnerScript::Items(sample_items()),
            Duration::from_secs(5),
        );

        let outcome = processor.process(&valid_body()).await;
        assert_eq!(outcome, ProcessingOutcome::Success);

        let state = store.state.lock().unwrap();
        assert_eq!(state.pings, 1);
        assert_eq!(state.committed.len(), 1);
        let (task_id, payload) = &state.committed[0];
        assert_eq!(*task_id, 42);
        assert_eq!(
            payload,
            &json!([{"date": "2025-03-03", "times": ["18:00", "20:00"]}])
        );
    }

    #[tokio::test]
    async fn test_no_result_is_success_without_store_write() {
        let store = MemoryStore::default();
        let processor = processor(store.clone(), RunnerScript::Empty, Duration::from_secs(5));

        let outcome = processor.process(&valid_body()).await;
        assert_eq!(outcome, ProcessingOutcome::Success);

        let state = store.state.lock().unwrap();
        assert_eq!(state.pings, 1);
        assert!(state.committed.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_body_is_failure_before_store_access() {
        let store = MemoryStore::default();
        let processor = processor(
            store.clone(),
            RunnerScript::Items(sample_items()),
            Duration::from_secs(5),
        );

        let outcome = processor.process(&json!({"unexpected": true})).await;
        assert_eq!(outcome, ProcessingOutcome::Failure);

        let state = store.state.lock().unwrap();
        assert_eq!(state.pings, 0);
        assert!(state.committed.is_empty());
    }

    #[tokio::test]
    async fn test_empty_task_is_failure() {
        let store = MemoryStore::default();
        let processor = processor(store.clone(), RunnerScript::Empty, Duration::from_secs(5));

        let body = json!({"task_data": {"task": ""}, "task_id": 1});
        assert_eq!(processor.process(&body).await, ProcessingOutcome::Failure);
    }

    #[tokio::test]
    async fn test_task_failure_rolls_back() {
        let store = MemoryStore::default();
        let processor = processor(store.clone(), RunnerScript::Fail, Duration::from_secs(5));

        let outcome = processor.process(&valid_body()).await;
        assert_eq!(outcome, ProcessingOutcome::Failure);

        let state = store.state.lock().unwrap();
        assert_eq!(state.pings, 1);
        assert!(state.committed.is_empty());
    }

    #[tokio::test]
    async fn test_store_write_failure_rolls_back() {
        let store = MemoryStore {
            fail_save: true,
            ..MemoryStore::default()
        };
        let processor = processor(
            store.clone(),
            RunnerScript::Items(sample_items()),
            Duration::from_secs(5),
        );

        let outcome = processor.process(&valid_body()).await;
        assert_eq!(outcome, ProcessingOutcome::Failure);
        assert!(store.state.lock().unwrap().committed.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_failure() {
        let store = MemoryStore {
            fail_begin: true,
            ..MemoryStore::default()
        };
        let processor = processor(store.clone(), RunnerScript::Empty, Duration::from_secs(5));

        assert_eq!(
            processor.process(&valid_body()).await,
            ProcessingOutcome::Failure
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinct_and_leaves_no_commit() {
        let store = MemoryStore::default();
        let processor = processor(store.clone(), RunnerScript::Hang, Duration::from_millis(50));

        let outcome = processor.process(&valid_body()).await;
        assert_eq!(outcome, ProcessingOutcome::Timeout);
        assert!(store.state.lock().unwrap().committed.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let store = MemoryStore::default();
        let processor = processor(
            store.clone(),
            RunnerScript::Items(sample_items()),
            Duration::from_secs(5),
        );

        // At-least-once: the same message arrives twice
        assert!(processor.process(&valid_body()).await.is_success());
        assert!(processor.process(&valid_body()).await.is_success());

        let state = store.state.lock().unwrap();
        assert_eq!(state.committed.len(), 2);
        assert_eq!(state.committed[0], state.committed[1]);
    }
}
