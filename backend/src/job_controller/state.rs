//! Tracks batch uploads running in the background.
//!
//! A batch is started by `POST /api/batches/start` and then runs on its own
//! task; the upload page polls `GET /api/batches/status/{batch_id}` for the log
//! and the progress bar.
//!
//! The main components are:
//! - `BatchesState`: clonable shared state holding a `BatchStatus` per batch and
//!   the single in-flight slot. Injected into the Actix app in `main.rs`. Only
//!   the most recent finished batches are kept.
//! - `BatchUpdate`: one event emitted by a running batch.
//! - `start_batch_updater`: a long-running task that receives every
//!   `BatchUpdate` from one MPSC channel and folds it into the shared map. Since
//!   all events go through the same channel, the stored log keeps the order in
//!   which the batch produced it.

use crate::error::AppError;
use common::jobs::{BatchPhase, BatchStatus, RowOutcome};
use log::{debug, info};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::{mpsc, Mutex, RwLock};

/// Finished batches kept for polling; older ones are dropped first.
pub const FINISHED_BATCHES_KEPT: usize = 20;

#[derive(Clone)]
pub struct BatchesState {
    /// Batch id to its latest snapshot. The last `FINISHED_BATCHES_KEPT`
    /// finished batches stay here for polling.
    pub batches: Arc<RwLock<HashMap<String, BatchStatus>>>,

    /// Sender half of the channel drained by `start_batch_updater`.
    pub tx: mpsc::Sender<BatchUpdate>,

    /// Id of the batch currently running, if any. Only one batch may run at a
    /// time; a second start is refused until this slot is released by the
    /// updater when it sees the first batch reach a terminal phase.
    in_flight: Arc<Mutex<Option<String>>>,

    /// Finished batch ids, oldest first.
    finished: Arc<Mutex<VecDeque<String>>>,
    keep_finished: usize,
}

impl BatchesState {
    pub fn new(tx: mpsc::Sender<BatchUpdate>) -> Self {
        Self::with_retention(tx, FINISHED_BATCHES_KEPT)
    }

    pub fn with_retention(tx: mpsc::Sender<BatchUpdate>, keep_finished: usize) -> Self {
        Self {
            batches: Arc::new(RwLock::new(HashMap::new())),
            tx,
            in_flight: Arc::new(Mutex::new(None)),
            finished: Arc::new(Mutex::new(VecDeque::new())),
            keep_finished,
        }
    }

    /// Claims the in-flight slot and registers an `Idle` status for the batch.
    pub async fn begin(&self, batch_id: &str) -> Result<(), AppError> {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(running) = in_flight.as_ref() {
            return Err(AppError::BatchInFlight(running.clone()));
        }
        *in_flight = Some(batch_id.to_string());
        self.batches
            .write()
            .await
            .insert(batch_id.to_string(), BatchStatus::new(batch_id));
        Ok(())
    }

    pub async fn status(&self, batch_id: &str) -> Option<BatchStatus> {
        self.batches.read().await.get(batch_id).cloned()
    }

    /// Frees the in-flight slot and evicts the oldest finished batches.
    async fn retire(&self, batch_id: &str) {
        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.as_deref() == Some(batch_id) {
                *in_flight = None;
            }
        }

        let mut finished = self.finished.lock().await;
        if finished.iter().any(|id| id == batch_id) {
            return;
        }
        finished.push_back(batch_id.to_string());
        let mut batches = self.batches.write().await;
        while finished.len() > self.keep_finished {
            if let Some(old) = finished.pop_front() {
                debug!("Dropping status of batch {old}");
                batches.remove(&old);
            }
        }
    }
}

/// Something a running batch wants reflected in its status.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Phase(BatchPhase),
    Log(String),
    /// Rows were extracted and the batch knows its size.
    Rows { total: usize, has_rank: bool },
    /// One row got its outcome; `progress` is already computed.
    Row { outcome: RowOutcome, progress: u8 },
}

#[derive(Debug)]
pub struct BatchUpdate {
    pub(crate) batch_id: String,
    pub(crate) event: BatchEvent,
}

/// Folds one event into a snapshot.
pub fn apply_event(status: &mut BatchStatus, event: BatchEvent) {
    match event {
        BatchEvent::Phase(phase) => status.phase = phase,
        BatchEvent::Log(line) => status.logs.push(line),
        BatchEvent::Rows { total, has_rank } => {
            status.total_rows = total;
            status.has_rank = has_rank;
        }
        BatchEvent::Row { outcome, progress } => {
            if outcome.is_success() {
                status.success_count += 1;
            } else {
                status.fail_count += 1;
            }
            status.progress = status.progress.max(progress);
        }
    }
}

/// Spawned once from `main.rs`; runs until every sender is dropped.
pub async fn start_batch_updater(state: BatchesState, mut rx: mpsc::Receiver<BatchUpdate>) {
    while let Some(update) = rx.recv().await {
        let finished = matches!(&update.event, BatchEvent::Phase(phase) if phase.is_finished());
        {
            let mut batches = state.batches.write().await;
            let status = batches
                .entry(update.batch_id.clone())
                .or_insert_with(|| BatchStatus::new(update.batch_id.clone()));
            apply_event(status, update.event);
        }
        if finished {
            info!("Batch {} finished", update.batch_id);
            state.retire(&update.batch_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_batch_is_refused_until_first_finishes() {
        let (tx, rx) = mpsc::channel(16);
        let state = BatchesState::new(tx.clone());
        tokio::spawn(start_batch_updater(state.clone(), rx));

        state.begin("first").await.unwrap();
        let err = state.begin("second").await.unwrap_err();
        assert!(matches!(err, AppError::BatchInFlight(ref id) if id == "first"));

        tx.send(BatchUpdate {
            batch_id: "first".into(),
            event: BatchEvent::Phase(BatchPhase::Complete),
        })
        .await
        .unwrap();

        let mut released = false;
        for _ in 0..50 {
            if state.begin("second").await.is_ok() {
                released = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(released);
        assert_eq!(
            state.status("first").await.unwrap().phase,
            BatchPhase::Complete
        );
    }

    #[test]
    fn row_events_update_counters() {
        let mut status = BatchStatus::new("b");
        apply_event(
            &mut status,
            BatchEvent::Rows {
                total: 2,
                has_rank: true,
            },
        );
        apply_event(
            &mut status,
            BatchEvent::Row {
                outcome: RowOutcome::Success,
                progress: 50,
            },
        );
        apply_event(
            &mut status,
            BatchEvent::Row {
                outcome: RowOutcome::Skipped("missing email".into()),
                progress: 100,
            },
        );

        assert_eq!(status.total_rows, 2);
        assert!(status.has_rank);
        assert_eq!((status.success_count, status.fail_count), (1, 1));
        assert_eq!(status.progress, 100);
    }

    #[tokio::test]
    async fn only_recent_finished_batches_are_kept() {
        let (tx, rx) = mpsc::channel(16);
        let state = BatchesState::with_retention(tx.clone(), 2);
        tokio::spawn(start_batch_updater(state.clone(), rx));

        for id in ["a", "b", "c"] {
            for event in [
                BatchEvent::Log("Parsing rows...".into()),
                BatchEvent::Phase(BatchPhase::Complete),
            ] {
                tx.send(BatchUpdate {
                    batch_id: id.into(),
                    event,
                })
                .await
                .unwrap();
            }
        }
        // Wait for the updater to finish "c" and evict the oldest batch.
        for _ in 0..100 {
            let c_finished = state
                .status("c")
                .await
                .is_some_and(|status| status.phase.is_finished());
            if c_finished && state.status("a").await.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(state.status("a").await.is_none());
        assert_eq!(state.status("b").await.unwrap().phase, BatchPhase::Complete);
        assert_eq!(state.status("c").await.unwrap().logs, vec!["Parsing rows..."]);
    }
}
