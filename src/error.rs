pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the solver library.
///
/// Expected algorithm outcomes are *not* errors: a propagation wipeout is
/// reported as `consistent: false`, and an exhausted step or node budget is
/// reported as `None`. Broken caller invariants (a constraint evaluated on an
/// assignment missing a scope variable, a duplicate queue insertion) panic
/// instead of returning a variant here, because they indicate a bug rather
/// than a condition the caller can recover from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `pop` or `top` was called on an empty
    /// [`UpdatableQueue`](crate::solver::queue::UpdatableQueue). A well-behaved
    /// caller checks `is_empty` first.
    #[error("pop from an empty priority queue")]
    QueueUnderflow,
}
