//! Error types for the crate's validation and configuration surfaces.
//!
//! The reconciler and the badge layout engine themselves never fail;
//! these errors only arise when checking caller-supplied data up front.

use crate::timeline::model::MessageId;

/// A violation of the ordering guarantees that a [`HistorySnapshot`] must uphold.
///
/// [`HistorySnapshot`]: crate::timeline::model::HistorySnapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("message {0:?} appears more than once in the snapshot")]
    DuplicateMessage(MessageId),
    #[error("message {next:?} appears after {previous:?}, breaking ascending order")]
    OutOfOrder {
        previous: MessageId,
        next: MessageId,
    },
}
