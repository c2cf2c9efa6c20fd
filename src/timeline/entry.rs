//! The renderable entries that make up a reconciled timeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{AdminRank, GroupInfo, Media, Message, MessageIndex, MonthMarker};

/// Whether (and how) a message can currently be selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// No selection is in progress.
    #[default]
    None,
    /// A selection is in progress; `selected` tells whether this message is part of it.
    Selectable { selected: bool },
}

/// A hint about how a message's content should be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentTypeHint {
    #[default]
    Generic,
    /// A single emoji (or a dice roll) shown as an animated sticker.
    AnimatedEmoji,
    /// A short emoji-only message shown at a larger size.
    LargeEmoji,
}

/// Media that is currently being replaced by an edit of the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatingMedia {
    /// The new media, or `None` if the media is being removed.
    pub media: Option<Media>,
    /// Upload progress, from 0.0 to 1.0.
    pub progress: f32,
}

/// Per-entry presentation details derived during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryAttributes {
    /// The admin rank of the message's author, if they have one.
    pub rank: Option<AdminRank>,
    pub is_contact: bool,
    pub content_type_hint: ContentTypeHint,
    pub updating_media: Option<UpdatingMedia>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub message: Arc<Message>,
    pub is_read: bool,
    pub month_marker: Option<MonthMarker>,
    pub selection: Selection,
    pub attributes: EntryAttributes,
}

/// One message within an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub message: Arc<Message>,
    pub is_read: bool,
    pub selection: Selection,
    pub attributes: EntryAttributes,
}

/// An album: consecutive messages sharing one [`GroupInfo`], shown as one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageGroupEntry {
    pub group_info: GroupInfo,
    /// The album's messages, in their original order. Never empty.
    pub members: Vec<GroupMember>,
}

/// A single item in the reconciled timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEntry {
    Message(MessageEntry),
    MessageGroup(MessageGroupEntry),
    /// The boundary between read and unread messages.
    UnreadBoundary { index: MessageIndex },
    /// The separator shown beneath a reply thread's root message.
    ReplyThreadHeadCount {
        index: MessageIndex,
        is_channel_post: bool,
        count: u32,
    },
    /// An informational banner shown at the very top of a chat.
    ChatInfoBanner { title: String, body: String },
    /// The entry point for searching the chat's history.
    SearchBanner,
}

impl TimelineEntry {
    /// Returns the key by which this entry is positioned in the timeline.
    ///
    /// Albums are positioned by their last message; banners sort before everything.
    pub fn index(&self) -> MessageIndex {
        match self {
            TimelineEntry::Message(entry) => entry.message.index(),
            TimelineEntry::MessageGroup(group) => group.members
                .last()
                .map(|member| member.message.index())
                .unwrap_or_else(MessageIndex::lower_bound),
            TimelineEntry::UnreadBoundary { index }
            | TimelineEntry::ReplyThreadHeadCount { index, .. } => *index,
            TimelineEntry::ChatInfoBanner { .. }
            | TimelineEntry::SearchBanner => MessageIndex::lower_bound(),
        }
    }

    /// Returns the messages displayed by this entry, if any.
    pub fn messages(&self) -> Vec<&Arc<Message>> {
        match self {
            TimelineEntry::Message(entry) => vec![&entry.message],
            TimelineEntry::MessageGroup(group) => group.members.iter().map(|m| &m.message).collect(),
            _ => Vec::new(),
        }
    }
}
