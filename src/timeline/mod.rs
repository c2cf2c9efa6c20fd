//! Reconciling a snapshot of a conversation's message history into timeline entries.

pub mod model;
pub mod entry;
pub mod emoji;
pub mod policy;
mod chat_info;
mod reconciler;

pub use entry::{ContentTypeHint, TimelineEntry};
pub use policy::{ChatLocation, ReconcilePolicy, ReplyThreadInfo};
pub use reconciler::reconcile;
