//! User-adjustable settings that feed into timeline reconciliation and badge layout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    shared::strings::PresentationStrings,
    status_badge::BadgeMetrics,
    timeline::{emoji::{AnimatedEmojiSet, EmojiCatalog, NoAnimatedEmoji}, ReconcilePolicy},
};

/// The persisted settings of the timeline.
///
/// Missing fields take their default values, so older settings files keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Whether short emoji-only messages are shown enlarged (or animated).
    pub large_emoji: bool,
    /// Whether consecutive media of the same album are shown as one block.
    pub group_albums: bool,
    /// Whether to show the boundary between read and unread messages.
    pub include_unread_marker: bool,
    /// The emoji for which animated stickers are available.
    pub animated_emoji: Vec<String>,
    pub strings: PresentationStrings,
    pub badge: BadgeMetrics,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            large_emoji: true,
            group_albums: true,
            include_unread_marker: true,
            animated_emoji: Vec::new(),
            strings: PresentationStrings::default(),
            badge: BadgeMetrics::default(),
        }
    }
}

impl TimelineSettings {
    /// Builds the base reconciliation policy described by these settings.
    ///
    /// Per-view state (selection, pending removals, overrides) is left empty
    /// for the caller to fill in.
    pub fn policy(&self) -> ReconcilePolicy {
        let emoji: Arc<dyn EmojiCatalog> = if self.animated_emoji.is_empty() {
            Arc::new(NoAnimatedEmoji)
        } else {
            Arc::new(AnimatedEmojiSet::new(&self.animated_emoji))
        };
        ReconcilePolicy {
            include_unread_marker: self.include_unread_marker,
            group_albums: self.group_albums,
            large_emoji_enabled: self.large_emoji,
            emoji,
            strings: Arc::new(self.strings.clone()),
            ..ReconcilePolicy::default()
        }
    }
}
