/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The number was written and committed.
    Inserted,
    /// The number is already in the store (uniqueness constraint).
    AlreadyExists,
    /// The write failed: contention retries exhausted, or a hard engine error.
    Failed,
}

/// Durable set of accepted numbers.
///
/// # Invariants
/// - No duplicates: uniqueness is enforced by the storage engine itself,
///   not just by callers checking `exists` first.
/// - Append-only: stored numbers are never updated or deleted.
/// - Durable: contents survive process restarts.
///
/// `max` and `exists` never fail observably: an underlying access error is
/// logged and collapsed into the "empty" answer (-1 / false). Callers that
/// need to distinguish outage from absence must look at the logs.
pub trait NumberStore: Send + Sync {
    /// Returns the greatest stored number, or -1 if the store is empty.
    fn max(&self) -> i64;

    /// True iff `number` is currently stored.
    fn exists(&self, number: i64) -> bool;

    /// Attempts to add `number`.
    ///
    /// Transient lock contention is retried internally (bounded, fixed
    /// backoff) before giving up with `Failed`. Any other engine error
    /// fails immediately.
    fn insert(&self, number: i64) -> InsertOutcome;
}
