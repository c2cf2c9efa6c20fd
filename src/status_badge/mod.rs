//! The date and delivery status badge shown in the corner of a message.
//!
//! Laying out a badge happens in two phases:
//! 1. [`layout()`] measures the badge and returns its final size plus a [`CommitPlan`].
//! 2. [`CommitPlan::apply()`] turns that plan into [`WidgetOp`]s against the
//!    badge's previously-committed [`BadgeWidgetState`].

mod chrome;
mod commit;
mod layout;
mod status;

pub use chrome::{AssetKey, BadgeGraphics, BadgeImage, BadgeMetrics, CheckFamily, ColorRole, IconVariant, PlaceholderGraphics};
pub use commit::{BadgeCommit, BadgeStyle, BadgeWidgetState, WidgetId, WidgetKind, WidgetOp};
pub use layout::{layout, BadgeEnvironment, CommitPlan};
pub use status::{OutgoingState, PlacementClass, StatusBadgeSpec, ThemeId};
