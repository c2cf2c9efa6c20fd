//! The inputs describing what a status badge should show.

use serde::{Deserialize, Serialize};

use crate::{shared::geometry::Size, timeline::model::{Message, ReactionSummary}};

/// Identifies the visual theme that the badge's images were resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThemeId(pub u32);

/// The delivery state of an outgoing message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutgoingState {
    /// Not an outgoing message, so no delivery status is shown.
    #[default]
    None,
    /// Still being sent: shows a spinning clock.
    Sending,
    /// Delivered: shows one check, plus a second one once `read`.
    Sent { read: bool },
    Failed,
}

/// The visual context in which a badge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementClass {
    /// Inside an incoming text bubble.
    BubbleIncoming,
    /// Inside an outgoing text bubble.
    BubbleOutgoing,
    /// Overlaid on incoming media.
    ImageIncoming,
    /// Overlaid on outgoing media.
    ImageOutgoing,
    /// Floating without a bubble (e.g., below a sticker) in an incoming message.
    FreeIncoming,
    /// Floating without a bubble in an outgoing message.
    FreeOutgoing,
}
impl PlacementClass {
    pub fn is_outgoing(self) -> bool {
        matches!(self, Self::BubbleOutgoing | Self::ImageOutgoing | Self::FreeOutgoing)
    }
}

/// Everything that determines a status badge's content and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBadgeSpec {
    #[serde(default)]
    pub theme: ThemeId,
    #[serde(default)]
    pub outgoing: OutgoingState,
    pub placement: PlacementClass,
    #[serde(default)]
    pub edited: bool,
    /// How many times the message has been viewed (channel posts only).
    #[serde(default)]
    pub view_count: Option<u32>,
    /// The already-formatted time of day at which the message was sent.
    pub date_text: String,
    #[serde(default)]
    pub reactions: Vec<ReactionSummary>,
    /// The maximum size that the badge's text may occupy.
    pub constrained_size: Size,
}
impl StatusBadgeSpec {
    /// Builds the badge for a message, taking its edited marker, view count
    /// and reactions from the message's attributes.
    pub fn for_message(
        message: &Message,
        placement: PlacementClass,
        outgoing: OutgoingState,
        date_text: String,
        constrained_size: Size,
    ) -> Self {
        StatusBadgeSpec {
            theme: ThemeId::default(),
            outgoing,
            placement,
            edited: message.is_edited(),
            view_count: message.view_count(),
            date_text,
            reactions: message.reactions().to_vec(),
            constrained_size,
        }
    }
}
