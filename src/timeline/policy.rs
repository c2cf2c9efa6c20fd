//! The inputs that steer a single reconciliation besides the history itself.

use std::{collections::{HashMap, HashSet}, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::shared::strings::PresentationStrings;
use super::{
    emoji::{EmojiCatalog, NoAnimatedEmoji},
    entry::UpdatingMedia,
    model::{MessageId, PeerId},
};

/// Details about the reply thread being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyThreadInfo {
    /// The ID of the thread's root message in the discussion chat.
    pub message_id: MessageId,
    /// The ID under which the store keeps the thread's root messages.
    pub effective_top_id: MessageId,
    /// Whether the thread is a comment section under a channel post.
    pub is_channel_post: bool,
}

/// What kind of history view is being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatLocation {
    /// The full history of a chat with the given peer.
    Peer(PeerId),
    /// The replies to a single message.
    ReplyThread(ReplyThreadInfo),
}

/// All options and overlays that influence how a history snapshot is reconciled.
#[derive(Clone)]
pub struct ReconcilePolicy {
    /// Whether to insert the boundary between read and unread messages.
    pub include_unread_marker: bool,
    /// Whether to show an informational banner (or hide an effectively-empty chat).
    pub include_chat_info_banner: bool,
    /// Whether to append the search banner when the end of the history is visible.
    pub include_search_banner: bool,
    /// Whether to return the entries newest-first.
    pub reverse_output: bool,
    /// Whether to merge consecutive messages of the same album into one entry.
    pub group_albums: bool,
    /// The messages selected by the user, or `None` if no selection is in progress.
    pub selected_message_ids: Option<HashSet<MessageId>>,
    /// Whether a "clear history" action is pending, which hides everything.
    pub history_appears_cleared: bool,
    /// Whether an "unpin all messages" action is pending.
    ///
    /// This doesn't affect which entries exist; it is carried for the list layer.
    pub pending_unpinned_all: bool,
    /// Messages whose deletion is pending and that must be hidden already.
    pub pending_removed_ids: HashSet<MessageId>,
    pub large_emoji_enabled: bool,
    pub emoji: Arc<dyn EmojiCatalog>,
    /// Media of messages that are currently being edited.
    pub updating_media_overrides: HashMap<MessageId, UpdatingMedia>,
    /// A read marker for a channel's discussion group that is newer than the one
    /// stored in the reply-thread attributes of the snapshot's messages.
    pub discussion_read_override: Option<MessageId>,
    /// The latest outgoing message in a reply thread that the other side has read.
    pub thread_outgoing_read_override: Option<MessageId>,
    pub strings: Arc<PresentationStrings>,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            include_unread_marker: false,
            include_chat_info_banner: false,
            include_search_banner: false,
            reverse_output: false,
            group_albums: true,
            selected_message_ids: None,
            history_appears_cleared: false,
            pending_unpinned_all: false,
            pending_removed_ids: HashSet::new(),
            large_emoji_enabled: true,
            emoji: Arc::new(NoAnimatedEmoji),
            updating_media_overrides: HashMap::new(),
            discussion_read_override: None,
            thread_outgoing_read_override: None,
            strings: Arc::new(PresentationStrings::default()),
        }
    }
}

impl fmt::Debug for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcilePolicy")
            .field("include_unread_marker", &self.include_unread_marker)
            .field("include_chat_info_banner", &self.include_chat_info_banner)
            .field("include_search_banner", &self.include_search_banner)
            .field("reverse_output", &self.reverse_output)
            .field("group_albums", &self.group_albums)
            .field("selected_message_ids", &self.selected_message_ids)
            .field("history_appears_cleared", &self.history_appears_cleared)
            .field("pending_removed_ids", &self.pending_removed_ids.len())
            .field("large_emoji_enabled", &self.large_emoji_enabled)
            .field("discussion_read_override", &self.discussion_read_override)
            .field("thread_outgoing_read_override", &self.thread_outgoing_read_override)
            .finish_non_exhaustive()
    }
}
