use std::sync::Arc;

use crate::contracts::{InsertOutcome, NumberStore};

/// Outcome of processing one incoming number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Accepted(String),
    Rejected(String),
}

impl ProcessOutcome {
    pub fn message(&self) -> &str {
        match self {
            ProcessOutcome::Accepted(m) | ProcessOutcome::Rejected(m) => m,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ProcessOutcome::Accepted(_))
    }
}

/// Applies the acceptance rules and drives the store.
///
/// The store is injected so tests can run against fresh temporary
/// databases; nothing here holds state between calls.
pub struct Processor<S> {
    store: Arc<S>,
}

impl<S: NumberStore> Processor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Decides whether `number` is acceptable and, if so, persists its
    /// successor.
    ///
    /// `number` is guaranteed non-negative by the HTTP validation layer.
    /// The three store round-trips below are independent; a concurrent
    /// request can win the race between the reads and the insert, in
    /// which case the primary key turns the lost race into a rejection.
    pub fn process(&self, number: i64) -> ProcessOutcome {
        let max_stored = self.store.max();

        if self.store.exists(number) {
            tracing::warn!(number, "number already processed");
            return ProcessOutcome::Rejected(format!("number {number} already processed"));
        }

        // Historical quirk kept on purpose: the check is successor-of-max,
        // but the message reads "one less than".
        if number == max_stored + 1 {
            tracing::warn!(number, max_stored, "number adjacent to current maximum");
            return ProcessOutcome::Rejected(format!(
                "number {number} is one less than the already-processed number {max_stored}"
            ));
        }

        let successor = number + 1;
        match self.store.insert(successor) {
            InsertOutcome::Inserted => {
                tracing::info!(number, successor, "number processed");
                ProcessOutcome::Accepted(format!("number {successor} processed"))
            }
            InsertOutcome::AlreadyExists => {
                tracing::warn!(successor, "successor already stored");
                ProcessOutcome::Rejected(format!("number {successor} already processed"))
            }
            InsertOutcome::Failed => {
                tracing::error!(successor, "could not persist successor");
                ProcessOutcome::Rejected(format!(
                    "could not add number {successor}, try again later"
                ))
            }
        }
    }
}
