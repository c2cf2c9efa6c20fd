//! The synthetic entries shown at the top or bottom edge of a fully-loaded history.

use tracing::debug;

use super::{
    entry::TimelineEntry,
    model::{HistoryRecord, HistorySnapshot, Media},
    policy::{ChatLocation, ReconcilePolicy},
};

/// A chat with more entries than this is never considered empty.
const MAX_EMPTY_CHAT_ENTRIES: usize = 3;


/// Adds the chat info banner (or hides an effectively-empty chat), or else the search banner.
///
/// The two banners are mutually exclusive: the search banner is only
/// considered when the chat info banner is disabled.
pub(super) fn apply_banners(
    location: &ChatLocation,
    snapshot: &HistorySnapshot,
    policy: &ReconcilePolicy,
    added_thread_head: bool,
    entries: &mut Vec<TimelineEntry>,
) {
    if policy.include_chat_info_banner {
        if snapshot.has_earlier || snapshot.is_loading {
            return;
        }
        if let ChatLocation::Peer(peer_id) = location
            && peer_id.is_replies()
        {
            entries.insert(0, TimelineEntry::ChatInfoBanner {
                title: String::new(),
                body: policy.strings.replies_description.clone(),
            });
        } else if let Some(description) = snapshot.cached_peer_data().and_then(|data| data.bot_description()) {
            entries.insert(0, TimelineEntry::ChatInfoBanner {
                title: policy.strings.bot_description_title.clone(),
                body: description.to_owned(),
            });
        } else if !added_thread_head && is_effectively_empty(snapshot, entries.len()) {
            debug!("Hiding {} entries of an effectively-empty chat at {location:?}", entries.len());
            entries.clear();
        }
    } else if policy.include_search_banner
        && !snapshot.has_later
        && !snapshot.records.is_empty()
    {
        entries.push(TimelineEntry::SearchBanner);
    }
}

/// Returns `true` if the chat only contains the setup messages of a chat
/// that the current user just created.
fn is_effectively_empty(snapshot: &HistorySnapshot, entry_count: usize) -> bool {
    entry_count <= MAX_EMPTY_CHAT_ENTRIES
        && snapshot.records.iter().all(is_creator_setup_record)
}

fn is_creator_setup_record(record: &HistoryRecord) -> bool {
    let message = &record.message;
    let is_setup = message.media.iter()
        .filter_map(Media::action)
        .any(|action| action.is_chat_setup());
    is_setup && message.chat_peer.as_ref().is_some_and(|peer| peer.is_created_by_viewer())
}
