//! The message-store data that the timeline reconciler consumes.
//!
//! Everything in here is owned by the caller and treated as read-only:
//! a [`HistorySnapshot`] is handed to [`reconcile()`](super::reconcile)
//! and is never mutated or retained beyond that call.
//! Messages are shared via `Arc` so that a rewritten message (e.g., one whose
//! reply-thread read state was advanced) can be produced without touching the
//! original value stored in the snapshot.

use std::{collections::HashMap, sync::Arc};

use bitflags::bitflags;
use imbl::Vector;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;


/// The reserved user ID of the "Replies" system chat.
const REPLIES_PEER_ID: i64 = 1271266957;

/// The kind of peer that a [`PeerId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeerNamespace {
    User,
    Group,
    /// Broadcast channels and supergroups.
    Channel,
    SecretChat,
    Other,
}

/// The unique ID of a user, group, or channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId {
    pub namespace: PeerNamespace,
    pub id: i64,
}
impl PeerId {
    pub const fn new(namespace: PeerNamespace, id: i64) -> Self {
        Self { namespace, id }
    }

    /// Returns the ID of the "Replies" system chat.
    pub const fn replies() -> Self {
        Self::new(PeerNamespace::User, REPLIES_PEER_ID)
    }

    pub fn is_channel(&self) -> bool {
        self.namespace == PeerNamespace::Channel
    }

    pub fn is_replies(&self) -> bool {
        *self == Self::replies()
    }
}

/// The unique ID of a message within a given peer's history.
///
/// Ordered by `(peer, namespace, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId {
    pub peer: PeerId,
    pub namespace: i32,
    pub id: i32,
}

/// The ordering key of the timeline: a message's timestamp plus its ID.
///
/// Field order matters here, as the derived `Ord` compares the timestamp first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageIndex {
    pub timestamp: i32,
    pub id: MessageId,
}
impl MessageIndex {
    /// The smallest possible index, which sorts before every real message.
    pub const fn lower_bound() -> Self {
        Self {
            timestamp: i32::MIN,
            id: MessageId {
                peer: PeerId::new(PeerNamespace::User, i64::MIN),
                namespace: i32::MIN,
                id: i32::MIN,
            },
        }
    }
}

/// Identifies the album (media group) that a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupInfo {
    pub stable_id: u32,
}

/// The sender of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: PeerId,
    #[serde(default)]
    pub display_name: String,
}

/// The kind of service action carried by an action message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    ChannelMigratedFromGroup,
    GroupMigratedToChannel,
    HistoryCleared,
    GroupCreated,
    PhotoUpdated,
    Other,
}
impl ActionKind {
    /// Returns `true` if this action only marks a structural change in the
    /// history and must never be shown as a timeline entry.
    pub fn is_structural_marker(self) -> bool {
        matches!(
            self,
            Self::ChannelMigratedFromGroup | Self::GroupMigratedToChannel | Self::HistoryCleared
        )
    }

    /// Returns `true` if this action doesn't count as "real" content
    /// when deciding whether a freshly-created chat is still empty.
    pub fn is_chat_setup(self) -> bool {
        matches!(
            self,
            Self::GroupCreated
                | Self::PhotoUpdated
                | Self::ChannelMigratedFromGroup
                | Self::GroupMigratedToChannel
        )
    }
}

/// A media item attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Media {
    Photo,
    File { mime_type: String },
    Sticker,
    /// An animated dice/slot-machine roll.
    Dice { emoji: String, value: Option<i32> },
    Action(ActionKind),
    WebPage,
    Other,
}
impl Media {
    pub fn action(&self) -> Option<ActionKind> {
        match self {
            Media::Action(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// The state of a comments/reply thread attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyThreadAttribute {
    pub count: i32,
    #[serde(default)]
    pub latest_users: Vec<PeerId>,
    pub comments_peer_id: Option<PeerId>,
    pub max_message_id: Option<i32>,
    pub max_read_message_id: Option<i32>,
}

/// A single reaction and how many users reacted with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub value: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageAttribute {
    ReplyThread(ReplyThreadAttribute),
    Edited { date: i32 },
    Views { count: u32 },
    Reactions(Vec<ReactionSummary>),
    Other,
}

bitflags! {
    /// Rights that are withheld from ordinary members of a channel or group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BannedRightsFlags: u32 {
        const BAN_SEND_MESSAGES = 1 << 1;
        const BAN_SEND_MEDIA    = 1 << 2;
        const BAN_SEND_STICKERS = 1 << 3;
        const BAN_SEND_GIFS     = 1 << 4;
        const BAN_EMBED_LINKS   = 1 << 7;
        const BAN_SEND_POLLS    = 1 << 8;
    }
}

bitflags! {
    /// Per-channel flags relevant to the current user.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelFlags: u32 {
        const IS_CREATOR = 1 << 0;
        const VERIFIED   = 1 << 1;
        const SCAM       = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BannedRights {
    #[serde(with = "flag_bits")]
    pub flags: BannedRightsFlags,
}

/// The current user's role in a basic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupRole {
    Creator,
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    Broadcast,
    Group,
}

/// Metadata about a peer, as cached by the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Peer {
    User {
        id: PeerId,
        #[serde(default)]
        bot: bool,
    },
    Group {
        id: PeerId,
        role: GroupRole,
    },
    Channel {
        id: PeerId,
        kind: ChannelKind,
        #[serde(default, with = "flag_bits")]
        flags: ChannelFlags,
        #[serde(default)]
        default_banned_rights: Option<BannedRights>,
    },
}
impl Peer {
    pub fn id(&self) -> PeerId {
        match self {
            Peer::User { id, .. } | Peer::Group { id, .. } | Peer::Channel { id, .. } => *id,
        }
    }

    /// Returns `true` if the current user created this chat.
    ///
    /// Only basic groups and channel-backed groups (supergroups) have a creator
    /// in this sense; broadcast channels and users never do.
    pub fn is_created_by_viewer(&self) -> bool {
        match self {
            Peer::Group { role, .. } => *role == GroupRole::Creator,
            Peer::Channel { kind: ChannelKind::Group, flags, .. } => flags.contains(ChannelFlags::IS_CREATOR),
            Peer::Channel { kind: ChannelKind::Broadcast, .. } | Peer::User { .. } => false,
        }
    }

    /// Returns `true` if members of this peer are forbidden from sending stickers.
    pub fn bans_stickers(&self) -> bool {
        match self {
            Peer::Channel { default_banned_rights: Some(rights), .. } => {
                rights.flags.contains(BannedRightsFlags::BAN_SEND_STICKERS)
            }
            _ => false,
        }
    }
}

/// A single message in a conversation.
///
/// Messages are immutable values; use [`Message::with_updated_attributes()`]
/// to derive a modified copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub timestamp: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: Vec<MessageAttribute>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub group_info: Option<GroupInfo>,
    #[serde(default)]
    pub author: Option<Author>,
    /// The chat this message was sent in, if the store has it cached.
    #[serde(default)]
    pub chat_peer: Option<Peer>,
}
impl Message {
    pub fn index(&self) -> MessageIndex {
        MessageIndex { timestamp: self.timestamp, id: self.id }
    }

    /// Returns a copy of this message with its attributes replaced.
    pub fn with_updated_attributes(&self, attributes: Vec<MessageAttribute>) -> Message {
        Message {
            attributes,
            ..self.clone()
        }
    }

    pub fn reply_thread(&self) -> Option<&ReplyThreadAttribute> {
        self.attributes.iter().find_map(|attr| match attr {
            MessageAttribute::ReplyThread(thread) => Some(thread),
            _ => None,
        })
    }

    pub fn is_edited(&self) -> bool {
        self.attributes.iter().any(|attr| matches!(attr, MessageAttribute::Edited { .. }))
    }

    pub fn view_count(&self) -> Option<u32> {
        self.attributes.iter().find_map(|attr| match attr {
            MessageAttribute::Views { count } => Some(*count),
            _ => None,
        })
    }

    pub fn reactions(&self) -> &[ReactionSummary] {
        self.attributes.iter()
            .find_map(|attr| match attr {
                MessageAttribute::Reactions(reactions) => Some(reactions.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Marks the first message shown for a given month in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthMarker {
    pub month: u32,
    pub year: i32,
}

/// One message in the paged history window, plus per-message view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub message: Arc<Message>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub author_is_contact: bool,
    #[serde(default)]
    pub month_marker: Option<MonthMarker>,
}

/// The rank shown next to an admin's name in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminRank {
    Owner,
    Admin,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotInfo {
    pub description: String,
}

/// Extended peer data fetched and cached by the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedPeerData {
    User { bot_info: Option<BotInfo> },
    Other,
}
impl CachedPeerData {
    /// Returns the bot's description, if this is a bot with a non-empty one.
    pub fn bot_description(&self) -> Option<&str> {
        match self {
            CachedPeerData::User { bot_info: Some(info) } if !info.description.is_empty() => {
                Some(&info.description)
            }
            _ => None,
        }
    }
}

/// Side-channel data that the message store attaches to a history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdditionalDatum {
    CachedAdminRanks {
        peer: PeerId,
        #[serde(with = "map_as_pairs")]
        ranks: HashMap<PeerId, AdminRank>,
    },
    PeerMetadata(Peer),
    CachedPeerData {
        peer: PeerId,
        data: CachedPeerData,
    },
    /// The messages making up the root of a reply thread.
    /// More than one message means the root is an album.
    ThreadHeadMessages {
        id: MessageId,
        messages: Vec<Arc<Message>>,
    },
}

/// An immutable snapshot of a paged window over a conversation's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// The messages in this window, in ascending order.
    #[serde(default)]
    pub records: Vector<HistoryRecord>,
    /// The index of the latest message that the current user has read.
    #[serde(default)]
    pub max_read_index: Option<MessageIndex>,
    /// Whether there is an earlier page of history before this window.
    #[serde(default)]
    pub has_earlier: bool,
    /// Whether there is a later page of history after this window.
    #[serde(default)]
    pub has_later: bool,
    #[serde(default)]
    pub is_loading: bool,
    /// Whether there is a not-yet-loaded hole right before the earliest record.
    #[serde(default)]
    pub hole_earlier: bool,
    #[serde(default)]
    pub additional_data: Vec<AdditionalDatum>,
}
impl HistorySnapshot {
    /// Returns the messages that form the root of the reply thread with the given ID.
    pub fn thread_head(&self, id: MessageId) -> Option<&[Arc<Message>]> {
        self.additional_data.iter().find_map(|datum| match datum {
            AdditionalDatum::ThreadHeadMessages { id: head_id, messages } if *head_id == id => {
                Some(messages.as_slice())
            }
            _ => None,
        })
    }

    /// Returns the first cached peer data in this snapshot, if any.
    pub fn cached_peer_data(&self) -> Option<&CachedPeerData> {
        self.additional_data.iter().find_map(|datum| match datum {
            AdditionalDatum::CachedPeerData { data, .. } => Some(data),
            _ => None,
        })
    }

    /// Checks that record IDs are unique and strictly increasing within
    /// each `(peer, namespace)` pair, which callers are expected to guarantee.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut latest: HashMap<(PeerId, i32), MessageId> = HashMap::new();
        for record in &self.records {
            let id = record.message.id;
            if let Some(previous) = latest.insert((id.peer, id.namespace), id) {
                if previous == id {
                    return Err(SnapshotError::DuplicateMessage(id));
                }
                if previous > id {
                    return Err(SnapshotError::OutOfOrder { previous, next: id });
                }
            }
        }
        Ok(())
    }
}

/// (De)serializes a bitflags value as its raw bits.
mod flag_bits {
    use bitflags::Flags;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, F>(flags: &F, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        F: Flags<Bits = u32>,
    {
        serializer.serialize_u32(flags.bits())
    }

    pub fn deserialize<'de, D, F>(deserializer: D) -> Result<F, D::Error>
    where
        D: Deserializer<'de>,
        F: Flags<Bits = u32>,
    {
        u32::deserialize(deserializer).map(F::from_bits_truncate)
    }
}

/// (De)serializes a map with non-string keys as a list of `[key, value]` pairs,
/// since JSON objects only allow string keys.
pub(crate) mod map_as_pairs {
    use std::{collections::HashMap, hash::Hash};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, K, V>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        K: Serialize,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        D: Deserializer<'de>,
        K: Deserialize<'de> + Eq + Hash,
        V: Deserialize<'de>,
    {
        Vec::<(K, V)>::deserialize(deserializer).map(|pairs| pairs.into_iter().collect())
    }
}
