//! The measure phase of a status badge: computes its size and the frame of every part.
//!
//! This phase is pure. It only reads its inputs, so it can run on a background
//! thread; the resulting [`CommitPlan`] is then sent to the thread that owns the
//! badge's widgets, where [`CommitPlan::apply()`] reconciles it against the
//! previously-committed widgets.

use crate::{
    shared::{
        geometry::{EdgeInsets, Point, Rect, Size},
        strings::PresentationStrings,
        text_measure::TextMeasurer,
    },
    utils::compact_count,
};
use super::{
    chrome::{AssetKey, BadgeChrome, BadgeGraphics, BadgeMetrics, ColorRole},
    commit::{BadgeStyle, BadgeWidgetState},
    status::{OutgoingState, StatusBadgeSpec},
};

/// The shared resources needed to lay out a badge.
///
/// Everything is borrowed immutably, so one environment can be shared
/// by many concurrent layout calls.
#[derive(Clone, Copy)]
pub struct BadgeEnvironment<'a> {
    pub graphics: &'a dyn BadgeGraphics,
    pub measurer: &'a dyn TextMeasurer,
    pub strings: &'a PresentationStrings,
    pub metrics: &'a BadgeMetrics,
}

/// An image positioned within the badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PlacedImage {
    /// `None` if the theme lacks this image; the widget then stays blank.
    pub image: Option<AssetKey>,
    pub frame: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlacedText {
    pub text: String,
    pub color: ColorRole,
    pub frame: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlacedReaction {
    pub value: String,
    pub count: u32,
    pub frame: Rect,
}

/// The delivery status part of the badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum PlacedStatus {
    None,
    Clock {
        frame: PlacedImage,
        min: PlacedImage,
    },
    Checks {
        full: Option<AssetKey>,
        partial: Option<AssetKey>,
        sent: Rect,
        /// `None` while the message is unread, which hides the read check.
        read: Option<Rect>,
    },
}

/// Animation parameters carried from the layout metrics into the commit phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Motion {
    pub clock_frame_period: f64,
    pub clock_min_period: f64,
    pub check_scale_from: f64,
    pub check_scale_duration: f64,
}

/// The outcome of laying out a badge, ready to be committed to its widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan {
    pub(super) previous: Option<BadgeWidgetState>,
    pub(super) style: BadgeStyle,
    pub(super) background: Option<PlacedImage>,
    pub(super) view_icon: Option<PlacedImage>,
    pub(super) date: PlacedText,
    pub(super) status: PlacedStatus,
    pub(super) reactions: Vec<PlacedReaction>,
    pub(super) motion: Motion,
}

/// Builds the badge's text: the view count, the edited marker, then the date.
fn badge_text(spec: &StatusBadgeSpec, strings: &PresentationStrings) -> String {
    let mut text = if spec.edited {
        format!("{} {}", strings.edited_label, spec.date_text)
    } else {
        spec.date_text.clone()
    };
    if let Some(views) = spec.view_count {
        text = format!("{} {text}", compact_count(views, &strings.decimal_separator));
    }
    text
}

/// Measures a badge and plans its widgets.
///
/// `previous` is the widget state returned by the last commit of this badge,
/// or `None` for a badge that has never been committed.
/// The returned size is final: committing the plan never changes it.
pub fn layout(
    previous: Option<BadgeWidgetState>,
    spec: &StatusBadgeSpec,
    env: &BadgeEnvironment,
) -> (Size, CommitPlan) {
    let metrics = env.metrics;
    let chrome = BadgeChrome::for_placement(spec.placement, metrics);
    let offset = metrics.pixel_offset;

    let text = badge_text(spec, env.strings);
    let date_size = env.measurer.measure(&text, spec.constrained_size);

    let view_icon = spec.view_count.and_then(|_| env.graphics.image(chrome.view_count_icon));
    let view_icon_width = view_icon.map_or(0.0, |icon| icon.size.width + metrics.view_icon_spacing);

    let image_size = |key: AssetKey| env.graphics.image(key).map(|image| image.size).unwrap_or_default();
    let image_key = |key: AssetKey| env.graphics.image(key).map(|image| image.key);

    // Status positions are relative to the content area, before reactions are reserved.
    let mut left_inset = chrome.left_inset;
    let (status_width, status) = match spec.outgoing {
        OutgoingState::None | OutgoingState::Failed => (0.0, PlacedStatus::None),
        // Delivery checks belong to the sender; incoming placements keep only the pending clock.
        OutgoingState::Sent { .. } if !spec.placement.is_outgoing() => (0.0, PlacedStatus::None),
        OutgoingState::Sending => {
            let center = Point::new(
                left_inset + date_size.width + metrics.clock_center_x,
                metrics.clock_center_y + offset,
            );
            let hand = |key: AssetKey| PlacedImage {
                image: image_key(key),
                frame: Rect::centered_at(center, image_size(key)),
            };
            (metrics.status_width, PlacedStatus::Clock {
                frame: hand(chrome.clock_frame),
                min: hand(chrome.clock_min),
            })
        }
        OutgoingState::Sent { read } => {
            let check_size = image_size(chrome.check_full);
            let sent = Rect::new(
                Point::new(
                    left_inset + view_icon_width + date_size.width + metrics.check_spacing
                        + metrics.status_width - check_size.width - metrics.read_check_offset,
                    metrics.check_top + offset,
                ),
                check_size,
            );
            (metrics.status_width, PlacedStatus::Checks {
                full: image_key(chrome.check_full),
                partial: image_key(chrome.check_partial),
                sent,
                read: read.then(|| sent.offset_by(metrics.read_check_offset, 0.0)),
            })
        }
    };

    let background = chrome.background.and_then(|key| env.graphics.image(key));
    let insets = if background.is_some() {
        metrics.background_insets
    } else {
        EdgeInsets::default()
    };

    let reaction_inset = if spec.reactions.is_empty() {
        0.0
    } else {
        metrics.reaction_run_padding + spec.reactions.len() as f64 * metrics.reaction_size
    };
    left_inset += reaction_inset;

    let size = Size::new(
        left_inset + view_icon_width + date_size.width + status_width + insets.horizontal(),
        date_size.height + insets.vertical(),
    );

    // Shift the status into place past the reactions and the background's insets.
    let (status_dx, status_dy) = (insets.left + reaction_inset, insets.top);
    let status = match status {
        PlacedStatus::None => PlacedStatus::None,
        PlacedStatus::Clock { frame, min } => PlacedStatus::Clock {
            frame: PlacedImage { frame: frame.frame.offset_by(status_dx, status_dy), ..frame },
            min: PlacedImage { frame: min.frame.offset_by(status_dx, status_dy), ..min },
        },
        PlacedStatus::Checks { full, partial, sent, read } => PlacedStatus::Checks {
            full,
            partial,
            sent: sent.offset_by(status_dx, status_dy),
            read: read.map(|frame| frame.offset_by(status_dx, status_dy)),
        },
    };

    let reaction_top = insets.top + metrics.date_top + offset + metrics.reaction_top_shift;
    let reactions_left = left_inset - reaction_inset + insets.left;
    let reactions = spec.reactions.iter()
        .enumerate()
        .map(|(i, reaction)| PlacedReaction {
            value: reaction.value.clone(),
            count: reaction.count,
            frame: Rect::new(
                Point::new(reactions_left + i as f64 * metrics.reaction_size, reaction_top),
                Size::new(metrics.reaction_size, metrics.reaction_size),
            ),
        })
        .collect();

    let plan = CommitPlan {
        previous,
        style: BadgeStyle {
            theme: spec.theme,
            placement: spec.placement,
            outgoing: spec.outgoing,
        },
        background: background.map(|image| PlacedImage {
            image: Some(image.key),
            frame: Rect::new(Point::default(), size),
        }),
        view_icon: view_icon.map(|icon| PlacedImage {
            image: Some(icon.key),
            frame: Rect::new(
                Point::new(left_inset + insets.left, insets.top + metrics.view_icon_top + offset),
                icon.size,
            ),
        }),
        date: PlacedText {
            text,
            color: chrome.date_color,
            frame: Rect::new(
                Point::new(left_inset + insets.left + view_icon_width, insets.top + metrics.date_top + offset),
                date_size,
            ),
        },
        status,
        reactions,
        motion: Motion {
            clock_frame_period: metrics.clock_frame_period,
            clock_min_period: metrics.clock_min_period,
            check_scale_from: metrics.check_scale_from,
            check_scale_duration: metrics.check_scale_duration,
        },
    };
    (size, plan)
}
