//! The commit phase of a status badge: reconciles a [`CommitPlan`] against the
//! badge's retained widgets, producing the widget operations to perform.
//!
//! Widgets keep their identity across commits whenever possible, so that
//! running animations (the spinning clock) aren't restarted and only real
//! transitions (a check appearing) are animated.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::shared::geometry::Rect;
use super::{
    chrome::{AssetKey, ColorRole},
    layout::{CommitPlan, Motion, PlacedImage, PlacedReaction, PlacedStatus, PlacedText},
    status::{OutgoingState, PlacementClass, ThemeId},
};

/// Identifies one retained widget of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    Background,
    ViewCountIcon,
    Date,
    ClockFrame,
    ClockMin,
    SentCheck,
    ReadCheck,
    Reaction,
}

/// A single change that the rendering layer must apply to the badge's widgets.
///
/// Reaction badges only draw their value: a reaction whose count changed is
/// updated in [`BadgeWidgetState`] alone, without emitting an op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetOp {
    Create {
        id: WidgetId,
        kind: WidgetKind,
        image: Option<AssetKey>,
        frame: Rect,
        hidden: bool,
    },
    SetImage { id: WidgetId, image: Option<AssetKey> },
    SetFrame { id: WidgetId, frame: Rect },
    SetHidden { id: WidgetId, hidden: bool },
    SetText {
        id: WidgetId,
        text: String,
        color: Option<ColorRole>,
    },
    /// Starts a continuous clockwise rotation with the given period.
    StartRotation { id: WidgetId, period: f64 },
    /// Plays a one-shot scale animation.
    AnimateScale {
        id: WidgetId,
        from: f64,
        to: f64,
        duration: f64,
    },
    Remove { id: WidgetId },
}

/// The parts of a badge whose change requires re-resolving its images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BadgeStyle {
    pub theme: ThemeId,
    pub placement: PlacementClass,
    pub outgoing: OutgoingState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ImageSlot {
    id: WidgetId,
    image: Option<AssetKey>,
    frame: Rect,
}

#[derive(Debug, Clone, PartialEq)]
struct TextSlot {
    id: WidgetId,
    text: String,
    color: ColorRole,
    frame: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CheckSlot {
    image: ImageSlot,
    hidden: bool,
}

/// The sent and read checks, which always exist together.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CheckPair {
    sent: CheckSlot,
    read: CheckSlot,
}

/// `count` is state-only; see [`BadgeWidgetState::reaction_widget()`].
#[derive(Debug, Clone, PartialEq)]
struct ReactionSlot {
    id: WidgetId,
    value: String,
    count: u32,
    frame: Rect,
}

/// The widgets of a badge as of its last commit.
///
/// This must be passed back into the next [`layout()`](super::layout) call of
/// the same badge so that its widgets can be reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeWidgetState {
    next_id: u64,
    style: Option<BadgeStyle>,
    background: Option<ImageSlot>,
    view_icon: Option<ImageSlot>,
    date: Option<TextSlot>,
    clock_frame: Option<ImageSlot>,
    clock_min: Option<ImageSlot>,
    checks: Option<CheckPair>,
    reactions: Vec<ReactionSlot>,
}

impl BadgeWidgetState {
    /// Returns the widget showing the given reaction and its current count.
    pub fn reaction_widget(&self, value: &str) -> Option<(WidgetId, u32)> {
        self.reactions.iter()
            .find(|slot| slot.value == value)
            .map(|slot| (slot.id, slot.count))
    }

    /// Returns all live widgets, back to front.
    pub fn widgets(&self) -> Vec<(WidgetId, WidgetKind)> {
        let mut widgets = Vec::new();
        let images = [
            (self.background, WidgetKind::Background),
            (self.view_icon, WidgetKind::ViewCountIcon),
        ];
        widgets.extend(images.iter().filter_map(|(slot, kind)| slot.map(|s| (s.id, *kind))));
        widgets.extend(self.date.as_ref().map(|date| (date.id, WidgetKind::Date)));
        let clock = [
            (self.clock_frame, WidgetKind::ClockFrame),
            (self.clock_min, WidgetKind::ClockMin),
        ];
        widgets.extend(clock.iter().filter_map(|(slot, kind)| slot.map(|s| (s.id, *kind))));
        if let Some(checks) = &self.checks {
            widgets.push((checks.sent.image.id, WidgetKind::SentCheck));
            widgets.push((checks.read.image.id, WidgetKind::ReadCheck));
        }
        widgets.extend(self.reactions.iter().map(|slot| (slot.id, WidgetKind::Reaction)));
        widgets
    }

    /// Returns `true` if the given widget exists and is currently hidden.
    pub fn is_hidden(&self, id: WidgetId) -> bool {
        self.checks.is_some_and(|checks| {
            [checks.sent, checks.read].iter().any(|check| check.image.id == id && check.hidden)
        })
    }
}

/// The result of committing a [`CommitPlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeCommit {
    /// The badge's widgets after this commit; pass it into the next layout.
    pub widget: BadgeWidgetState,
    /// The changes to apply, in order.
    pub ops: Vec<WidgetOp>,
}

/// When a retained image widget must have its image replaced.
#[derive(Debug, Clone, Copy)]
enum ImageRefresh {
    /// Only after the theme, placement, or delivery state changed.
    OnStyleChange { style_changed: bool },
    /// Whenever the planned image differs from the current one.
    OnKeyChange,
}

/// Accumulates widget operations and allocates widget IDs.
struct Ops {
    next_id: u64,
    ops: Vec<WidgetOp>,
}

impl Ops {
    fn create(&mut self, kind: WidgetKind, image: Option<AssetKey>, frame: Rect, hidden: bool) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.ops.push(WidgetOp::Create { id, kind, image, frame, hidden });
        id
    }

    fn push(&mut self, op: WidgetOp) {
        self.ops.push(op);
    }

    fn update_frame(&mut self, id: WidgetId, current: &mut Rect, frame: Rect) {
        if *current != frame {
            *current = frame;
            self.ops.push(WidgetOp::SetFrame { id, frame });
        }
    }

    fn commit_image(
        &mut self,
        kind: WidgetKind,
        slot: Option<ImageSlot>,
        planned: Option<PlacedImage>,
        refresh: ImageRefresh,
    ) -> Option<ImageSlot> {
        match (slot, planned) {
            (None, None) => None,
            (Some(slot), None) => {
                self.push(WidgetOp::Remove { id: slot.id });
                None
            }
            (None, Some(planned)) => {
                let id = self.create(kind, planned.image, planned.frame, false);
                Some(ImageSlot { id, image: planned.image, frame: planned.frame })
            }
            (Some(mut slot), Some(planned)) => {
                let replace = match refresh {
                    ImageRefresh::OnStyleChange { style_changed } => style_changed,
                    ImageRefresh::OnKeyChange => slot.image != planned.image,
                };
                if replace {
                    slot.image = planned.image;
                    self.push(WidgetOp::SetImage { id: slot.id, image: planned.image });
                }
                self.update_frame(slot.id, &mut slot.frame, planned.frame);
                Some(slot)
            }
        }
    }

    fn commit_date(&mut self, slot: Option<TextSlot>, planned: PlacedText) -> TextSlot {
        let Some(mut slot) = slot else {
            let id = self.create(WidgetKind::Date, None, planned.frame, false);
            self.push(WidgetOp::SetText { id, text: planned.text.clone(), color: Some(planned.color) });
            return TextSlot { id, text: planned.text, color: planned.color, frame: planned.frame };
        };
        if slot.text != planned.text || slot.color != planned.color {
            self.push(WidgetOp::SetText { id: slot.id, text: planned.text.clone(), color: Some(planned.color) });
            slot.text = planned.text;
            slot.color = planned.color;
        }
        self.update_frame(slot.id, &mut slot.frame, planned.frame);
        slot
    }

    /// Commits one clock hand, starting its rotation when the hand first appears.
    fn commit_clock_hand(
        &mut self,
        kind: WidgetKind,
        slot: Option<ImageSlot>,
        planned: Option<PlacedImage>,
        style_changed: bool,
        period: f64,
    ) -> Option<ImageSlot> {
        let was_present = slot.is_some();
        let slot = self.commit_image(kind, slot, planned, ImageRefresh::OnStyleChange { style_changed })?;
        if !was_present {
            self.push(WidgetOp::StartRotation { id: slot.id, period });
        }
        Some(slot)
    }

    /// Shows or hides a retained check, returning `true` if it just became visible.
    fn update_check(&mut self, check: &mut CheckSlot, frame: Option<Rect>) -> bool {
        match frame {
            Some(frame) => {
                let appeared = check.hidden;
                if check.hidden {
                    check.hidden = false;
                    self.push(WidgetOp::SetHidden { id: check.image.id, hidden: false });
                }
                self.update_frame(check.image.id, &mut check.image.frame, frame);
                appeared
            }
            None => {
                if !check.hidden {
                    check.hidden = true;
                    self.push(WidgetOp::SetHidden { id: check.image.id, hidden: true });
                }
                false
            }
        }
    }

    fn create_check(&mut self, kind: WidgetKind, image: Option<AssetKey>, frame: Option<Rect>) -> CheckSlot {
        let hidden = frame.is_none();
        let frame = frame.unwrap_or_default();
        let id = self.create(kind, image, frame, hidden);
        CheckSlot { image: ImageSlot { id, image, frame }, hidden }
    }

    fn commit_checks(
        &mut self,
        pair: Option<CheckPair>,
        full: Option<AssetKey>,
        partial: Option<AssetKey>,
        sent: Rect,
        read: Option<Rect>,
        style_changed: bool,
        animated: bool,
        motion: &Motion,
    ) -> CheckPair {
        let (pair, appeared) = match pair {
            None => {
                let pair = CheckPair {
                    sent: self.create_check(WidgetKind::SentCheck, full, Some(sent)),
                    read: self.create_check(WidgetKind::ReadCheck, partial, read),
                };
                (pair, [true, read.is_some()])
            }
            Some(mut pair) => {
                if style_changed {
                    for (check, image) in [(&mut pair.sent, full), (&mut pair.read, partial)] {
                        check.image.image = image;
                        self.push(WidgetOp::SetImage { id: check.image.id, image });
                    }
                }
                let sent_appeared = self.update_check(&mut pair.sent, Some(sent));
                let read_appeared = self.update_check(&mut pair.read, read);
                (pair, [sent_appeared, read_appeared])
            }
        };
        if animated {
            for (check, appeared) in [pair.sent, pair.read].iter().zip(appeared) {
                if appeared {
                    self.push(WidgetOp::AnimateScale {
                        id: check.image.id,
                        from: motion.check_scale_from,
                        to: 1.0,
                        duration: motion.check_scale_duration,
                    });
                }
            }
        }
        pair
    }

    /// Reuses each reaction widget whose position still shows the same value.
    fn commit_reactions(&mut self, slots: Vec<ReactionSlot>, planned: Vec<PlacedReaction>) -> Vec<ReactionSlot> {
        let mut previous = slots.into_iter();
        let mut reactions = Vec::with_capacity(planned.len());
        for reaction in planned {
            match previous.next() {
                Some(mut slot) if slot.value == reaction.value => {
                    slot.count = reaction.count;
                    self.update_frame(slot.id, &mut slot.frame, reaction.frame);
                    reactions.push(slot);
                    continue;
                }
                Some(replaced) => self.push(WidgetOp::Remove { id: replaced.id }),
                None => {}
            }
            let id = self.create(WidgetKind::Reaction, None, reaction.frame, false);
            self.push(WidgetOp::SetText { id, text: reaction.value.clone(), color: None });
            reactions.push(ReactionSlot {
                id,
                value: reaction.value,
                count: reaction.count,
                frame: reaction.frame,
            });
        }
        for surplus in previous {
            self.push(WidgetOp::Remove { id: surplus.id });
        }
        reactions
    }
}

impl CommitPlan {
    /// Applies this plan to the badge's widgets.
    ///
    /// Newly-visible checks are only animated if `animated` is `true`.
    pub fn apply(self, animated: bool) -> BadgeCommit {
        let CommitPlan { previous, style, background, view_icon, date, status, reactions, motion } = self;
        let previous = previous.unwrap_or_default();
        let style_changed = previous.style != Some(style);
        let mut ops = Ops { next_id: previous.next_id, ops: Vec::new() };

        let background = ops.commit_image(
            WidgetKind::Background,
            previous.background,
            background,
            ImageRefresh::OnStyleChange { style_changed },
        );
        let view_icon = ops.commit_image(WidgetKind::ViewCountIcon, previous.view_icon, view_icon, ImageRefresh::OnKeyChange);
        let date = ops.commit_date(previous.date, date);

        let (clock_frame, clock_min) = match status {
            PlacedStatus::Clock { frame, min } => (Some(frame), Some(min)),
            _ => (None, None),
        };
        let clock_frame = ops.commit_clock_hand(
            WidgetKind::ClockFrame, previous.clock_frame, clock_frame, style_changed, motion.clock_frame_period,
        );
        let clock_min = ops.commit_clock_hand(
            WidgetKind::ClockMin, previous.clock_min, clock_min, style_changed, motion.clock_min_period,
        );

        let checks = match status {
            PlacedStatus::Checks { full, partial, sent, read } => Some(ops.commit_checks(
                previous.checks, full, partial, sent, read, style_changed, animated, &motion,
            )),
            _ => {
                if let Some(pair) = previous.checks {
                    ops.push(WidgetOp::Remove { id: pair.sent.image.id });
                    ops.push(WidgetOp::Remove { id: pair.read.image.id });
                }
                None
            }
        };

        let reactions = ops.commit_reactions(previous.reactions, reactions);

        trace!("Committed status badge {style:?} with {} widget ops", ops.ops.len());
        BadgeCommit {
            widget: BadgeWidgetState {
                next_id: ops.next_id,
                style: Some(style),
                background,
                view_icon,
                date: Some(date),
                clock_frame,
                clock_min,
                checks,
                reactions,
            },
            ops: ops.ops,
        }
    }
}
