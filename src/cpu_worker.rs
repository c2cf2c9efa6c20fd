//! Lightweight wrapper for CPU-bound tasks.
//!
//! Each job is handled by spawning a detached native thread, which keeps the
//! implementation simple while still moving the full-list reconciliation off
//! the thread that owns the view tree.
//!
//! There is no cancellation: a job for a superseded snapshot still runs to
//! completion, and the receiver simply discards its result in favor of the
//! newest generation (see [`latest_timeline_update()`]).

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use tracing::{trace, warn};

use crate::timeline::{model::HistorySnapshot, reconcile, ChatLocation, ReconcilePolicy, TimelineEntry};

pub enum CpuJob {
    ReconcileTimeline(ReconcileTimelineJob),
}

/// The inputs of a background [`reconcile()`] call.
pub struct ReconcileTimelineJob {
    pub location: ChatLocation,
    pub snapshot: Arc<HistorySnapshot>,
    pub policy: ReconcilePolicy,
    /// Increases with every snapshot of the same timeline; newer results supersede older ones.
    pub generation: u64,
    pub sender: Sender<TimelineUpdate>,
}

/// A message sent from a background job to the owner of a timeline.
#[derive(Debug)]
pub enum TimelineUpdate {
    /// The full list of entries reconciled from a new history snapshot.
    NewEntries {
        generation: u64,
        entries: Vec<TimelineEntry>,
    },
}

fn run_reconcile_timeline(params: ReconcileTimelineJob) {
    let ReconcileTimelineJob {
        location,
        snapshot,
        policy,
        generation,
        sender,
    } = params;

    let entries = reconcile(&location, &snapshot, &policy);
    trace!("Reconciled generation {generation} into {} entries", entries.len());
    if sender.send(TimelineUpdate::NewEntries { generation, entries }).is_err() {
        warn!("Timeline update receiver was dropped before generation {generation} was delivered.");
    }
}

/// Spawns a CPU-bound job on a detached native thread.
pub fn spawn_cpu_job(job: CpuJob) -> thread::JoinHandle<()> {
    thread::spawn(move || match job {
        CpuJob::ReconcileTimeline(params) => run_reconcile_timeline(params),
    })
}

/// Drains all pending updates, returning only the newest generation's entries.
///
/// Returns `None` if no update was pending.
pub fn latest_timeline_update(receiver: &Receiver<TimelineUpdate>) -> Option<(u64, Vec<TimelineEntry>)> {
    let mut latest: Option<(u64, Vec<TimelineEntry>)> = None;
    while let Ok(update) = receiver.try_recv() {
        match update {
            TimelineUpdate::NewEntries { generation, entries } => {
                if latest.as_ref().is_none_or(|(newest, _)| generation > *newest) {
                    latest = Some((generation, entries));
                } else {
                    trace!("Discarding superseded timeline generation {generation}");
                }
            }
        }
    }
    latest
}
