//! Per-placement visual choices for a status badge: colors, images, and metrics.

use serde::{Deserialize, Serialize};

use crate::shared::geometry::{EdgeInsets, Size};
use super::status::PlacementClass;

/// A theme color, resolved to an actual color by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRole {
    IncomingSecondaryText,
    OutgoingSecondaryText,
    MediaDateAndStatusText,
    ServicePrimaryText,
}

/// The three families of check mark images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckFamily {
    Bubble,
    Media,
    Free,
}

/// The four families of clock and view-count icons.
///
/// Unlike checks, bubble icons differ between incoming and outgoing bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconVariant {
    BubbleIncoming,
    BubbleOutgoing,
    Media,
    Free,
}

/// Identifies one of the images that a badge can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKey {
    MediaBackground,
    FreeBackground,
    /// The check shown once a message is sent.
    CheckFull(CheckFamily),
    /// The second, partial check shown once a message is read.
    CheckPartial(CheckFamily),
    ClockFrame(IconVariant),
    ClockMin(IconVariant),
    ViewCountIcon(IconVariant),
}

/// An image resolved for the current theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadgeImage {
    pub key: AssetKey,
    /// The image's intrinsic size.
    pub size: Size,
}

/// Resolves badge images for the current theme.
pub trait BadgeGraphics: Send + Sync {
    /// Returns the image for `key`, or `None` if the theme doesn't provide one.
    fn image(&self, key: AssetKey) -> Option<BadgeImage>;
}

/// Graphics in which every image exists with a fixed, plausible size.
///
/// Used where no real theme is loaded, such as in `timeline-inspect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGraphics;

impl BadgeGraphics for PlaceholderGraphics {
    fn image(&self, key: AssetKey) -> Option<BadgeImage> {
        let size = match key {
            AssetKey::MediaBackground | AssetKey::FreeBackground => Size::new(18.0, 18.0),
            AssetKey::CheckFull(_) | AssetKey::CheckPartial(_) => Size::new(11.0, 9.0),
            AssetKey::ClockFrame(_) | AssetKey::ClockMin(_) => Size::new(11.0, 11.0),
            AssetKey::ViewCountIcon(_) => Size::new(14.0, 9.0),
        };
        Some(BadgeImage { key, size })
    }
}

/// The visual choices derived from a badge's placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct BadgeChrome {
    pub date_color: ColorRole,
    pub background: Option<AssetKey>,
    pub left_inset: f64,
    pub check_full: AssetKey,
    pub check_partial: AssetKey,
    pub clock_frame: AssetKey,
    pub clock_min: AssetKey,
    pub view_count_icon: AssetKey,
}

impl BadgeChrome {
    pub fn for_placement(placement: PlacementClass, metrics: &BadgeMetrics) -> Self {
        let (date_color, background, left_inset, checks, icons) = match placement {
            PlacementClass::BubbleIncoming => (
                ColorRole::IncomingSecondaryText, None, metrics.bubble_left_inset,
                CheckFamily::Bubble, IconVariant::BubbleIncoming,
            ),
            PlacementClass::BubbleOutgoing => (
                ColorRole::OutgoingSecondaryText, None, metrics.bubble_left_inset,
                CheckFamily::Bubble, IconVariant::BubbleOutgoing,
            ),
            PlacementClass::ImageIncoming | PlacementClass::ImageOutgoing => (
                ColorRole::MediaDateAndStatusText, Some(AssetKey::MediaBackground), 0.0,
                CheckFamily::Media, IconVariant::Media,
            ),
            PlacementClass::FreeIncoming | PlacementClass::FreeOutgoing => (
                ColorRole::ServicePrimaryText, Some(AssetKey::FreeBackground), 0.0,
                CheckFamily::Free, IconVariant::Free,
            ),
        };
        Self {
            date_color,
            background,
            left_inset,
            check_full: AssetKey::CheckFull(checks),
            check_partial: AssetKey::CheckPartial(checks),
            clock_frame: AssetKey::ClockFrame(icons),
            clock_min: AssetKey::ClockMin(icons),
            view_count_icon: AssetKey::ViewCountIcon(icons),
        }
    }
}

/// The constants that position a badge's parts.
///
/// The defaults match the standard chat appearance; they are only
/// configurable so that denser themes can tweak them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeMetrics {
    /// The space left of the date text inside a bubble.
    pub bubble_left_inset: f64,
    /// The width reserved for the clock or the checks.
    pub status_width: f64,
    /// The gap between the date text and the status area.
    pub check_spacing: f64,
    /// How far the sent check sits to the left of the read check.
    pub read_check_offset: f64,
    pub check_top: f64,
    /// The clock's center, relative to the end of the date text.
    pub clock_center_x: f64,
    pub clock_center_y: f64,
    /// The gap between the view-count icon and the date text.
    pub view_icon_spacing: f64,
    pub view_icon_top: f64,
    pub date_top: f64,
    /// Reaction badges are square, with this side length.
    pub reaction_size: f64,
    /// Extra space reserved before a non-empty run of reactions.
    pub reaction_run_padding: f64,
    /// The vertical shift of reaction badges relative to the date text.
    pub reaction_top_shift: f64,
    /// The insets applied around the content when a background image is shown.
    pub background_insets: EdgeInsets,
    /// A hairline adjustment applied to every vertical position.
    pub pixel_offset: f64,
    /// The rotation period of the clock's frame.
    pub clock_frame_period: f64,
    /// The rotation period of the clock's minute hand.
    pub clock_min_period: f64,
    /// A newly-shown check scales from this factor down to 1.0.
    pub check_scale_from: f64,
    pub check_scale_duration: f64,
}

impl Default for BadgeMetrics {
    fn default() -> Self {
        Self {
            bubble_left_inset: 10.0,
            status_width: 13.0,
            check_spacing: 5.0,
            read_check_offset: 6.0,
            check_top: 3.0,
            clock_center_x: 8.5,
            clock_center_y: 7.5,
            view_icon_spacing: 3.0,
            view_icon_top: 3.0,
            date_top: 1.0,
            reaction_size: 18.0,
            reaction_run_padding: 1.0,
            reaction_top_shift: -3.0,
            background_insets: EdgeInsets::new(2.0, 7.0, 2.0, 7.0),
            pixel_offset: -0.5,
            clock_frame_period: 6.0,
            clock_min_period: 1.0,
            check_scale_from: 1.3,
            check_scale_duration: 0.1,
        }
    }
}
