//! Reconciles a history snapshot from a JSON fixture and prints the result,
//! along with the layout of any status badges in the fixture.
//!
//! Usage: `timeline-inspect <fixture.json> [--settings FILE] [--reverse] [--no-albums]`

use std::{collections::HashSet, fmt::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    persistence::{default_settings_path, load_settings},
    settings::TimelineSettings,
    shared::text_measure::MonospaceMeasurer,
    shared::geometry::Size,
    status_badge::{layout, BadgeEnvironment, OutgoingState, PlaceholderGraphics, PlacementClass, StatusBadgeSpec},
    timeline::{
        entry::MessageEntry,
        model::{HistorySnapshot, Media, MessageId},
        reconcile, ChatLocation, ContentTypeHint, ReconcilePolicy, TimelineEntry,
    },
    utils::badge_date_text,
};


#[derive(Parser, Debug)]
#[clap(name = "timeline-inspect", version, about = "Reconciles a chat history fixture into timeline entries.")]
struct Cli {
    /// The JSON fixture holding the chat location, the history snapshot, and badges to lay out.
    #[clap(value_parser)]
    fixture: PathBuf,

    /// The settings file to use instead of the one in the app's data directory.
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Print the entries newest-first.
    #[clap(short, long, action)]
    reverse: bool,

    /// Don't merge albums into a single entry.
    #[clap(long, action)]
    no_albums: bool,
}

/// The contents of a fixture file.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub location: ChatLocation,
    pub snapshot: HistorySnapshot,
    #[serde(default)]
    pub policy: PolicyOverrides,
    #[serde(default)]
    pub badges: Vec<StatusBadgeSpec>,
}

/// The per-view parts of a [`ReconcilePolicy`] that a fixture may set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    pub include_unread_marker: Option<bool>,
    pub include_chat_info_banner: bool,
    pub include_search_banner: bool,
    pub selected_message_ids: Option<Vec<MessageId>>,
    pub history_appears_cleared: bool,
    pub pending_removed_ids: Vec<MessageId>,
    pub discussion_read_override: Option<MessageId>,
    pub thread_outgoing_read_override: Option<MessageId>,
}

impl PolicyOverrides {
    fn apply_to(self, policy: &mut ReconcilePolicy) {
        if let Some(include) = self.include_unread_marker {
            policy.include_unread_marker = include;
        }
        policy.include_chat_info_banner = self.include_chat_info_banner;
        policy.include_search_banner = self.include_search_banner;
        policy.selected_message_ids = self.selected_message_ids.map(HashSet::from_iter);
        policy.history_appears_cleared = self.history_appears_cleared;
        policy.pending_removed_ids = self.pending_removed_ids.into_iter().collect();
        policy.discussion_read_override = self.discussion_read_override;
        policy.thread_outgoing_read_override = self.thread_outgoing_read_override;
    }
}

/// The largest badge text that a message bubble leaves room for.
const MESSAGE_BADGE_CONSTRAINT: Size = Size::new(200.0, 20.0);

/// Chooses where a message's badge is drawn from how its content is presented.
fn message_placement(entry: &MessageEntry) -> PlacementClass {
    match entry.attributes.content_type_hint {
        ContentTypeHint::AnimatedEmoji | ContentTypeHint::LargeEmoji => PlacementClass::FreeIncoming,
        ContentTypeHint::Generic if entry.message.media.iter().any(|m| matches!(m, Media::Photo)) => {
            PlacementClass::ImageIncoming
        }
        ContentTypeHint::Generic => PlacementClass::BubbleIncoming,
    }
}

/// Returns a one-line, human-readable description of a timeline entry.
pub fn describe_entry(entry: &TimelineEntry) -> String {
    match entry {
        TimelineEntry::Message(entry) => format!(
            "message #{} at {} {:?}{}{}{}",
            entry.message.id.id,
            badge_date_text(entry.message.timestamp, true),
            entry.message.text,
            if entry.is_read { "" } else { " (unread)" },
            match entry.attributes.rank {
                Some(ref rank) => format!(" [{rank:?}]"),
                None => String::new(),
            },
            match entry.message.reply_thread() {
                Some(thread) => format!(" ({} replies)", thread.count),
                None => String::new(),
            },
        ),
        TimelineEntry::MessageGroup(group) => format!(
            "album {} with messages {:?}",
            group.group_info.stable_id,
            group.members.iter().map(|m| m.message.id.id).collect::<Vec<_>>(),
        ),
        TimelineEntry::UnreadBoundary { .. } => "--- unread messages ---".into(),
        TimelineEntry::ReplyThreadHeadCount { count, is_channel_post, .. } => {
            let kind = if *is_channel_post { "comments" } else { "replies" };
            format!("--- {count} {kind} ---")
        }
        TimelineEntry::ChatInfoBanner { title, body } => format!("info banner {title:?}: {body:?}"),
        TimelineEntry::SearchBanner => "search banner".into(),
    }
}

/// Reconciles the fixture and lays out its badges, returning the printable report.
pub fn inspect(fixture: Fixture, settings: &TimelineSettings, reverse: bool, no_albums: bool) -> Result<String> {
    fixture.snapshot.validate()?;

    let mut policy = settings.policy();
    fixture.policy.apply_to(&mut policy);
    policy.reverse_output = reverse;
    if no_albums {
        policy.group_albums = false;
    }
    debug!("Reconciling {} records with {policy:?}", fixture.snapshot.records.len());

    let entries = reconcile(&fixture.location, &fixture.snapshot, &policy);
    let mut report = String::new();
    writeln!(report, "{} timeline entries:", entries.len())?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(report, "{i:>4}: {}", describe_entry(entry))?;
    }

    let measurer = MonospaceMeasurer::default();
    let env = BadgeEnvironment {
        graphics: &PlaceholderGraphics,
        measurer: &measurer,
        strings: &settings.strings,
        metrics: &settings.badge,
    };
    for (i, badge) in fixture.badges.iter().enumerate() {
        let (size, plan) = layout(None, badge, &env);
        let commit = plan.apply(false);
        writeln!(report, "badge {i}: {:?} {:?}, size {}x{}", badge.placement, badge.outgoing, size.width, size.height)?;
        for op in &commit.ops {
            writeln!(report, "    {op:?}")?;
        }
    }
    for entry in &entries {
        let TimelineEntry::Message(entry) = entry else { continue };
        let placement = message_placement(entry);
        let badge = StatusBadgeSpec::for_message(
            &entry.message,
            placement,
            OutgoingState::None,
            badge_date_text(entry.message.timestamp, true),
            MESSAGE_BADGE_CONSTRAINT,
        );
        let (size, _) = layout(None, &badge, &env);
        writeln!(report, "message #{} badge: {placement:?}, size {}x{}", entry.message.id.id, size.width, size.height)?;
    }
    Ok(report)
}

/// The entry point of `timeline-inspect`.
pub fn app_main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let settings = match cli.settings.or_else(default_settings_path) {
        Some(path) => load_settings(&path)?,
        None => {
            info!("No data directory available, using default settings.");
            TimelineSettings::default()
        }
    };
    let fixture_json = std::fs::read_to_string(&cli.fixture)
        .with_context(|| format!("Failed to read fixture {}", cli.fixture.display()))?;
    let fixture: Fixture = serde_json::from_str(&fixture_json)
        .with_context(|| format!("Failed to parse fixture {}", cli.fixture.display()))?;

    print!("{}", inspect(fixture, &settings, cli.reverse, cli.no_albums)?);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "location": { "Peer": { "namespace": "Group", "id": 3 } },
        "snapshot": {
            "records": [
                { "message": { "id": { "peer": { "namespace": "Group", "id": 3 }, "namespace": 0, "id": 1 }, "timestamp": 60, "text": "hello" }, "is_read": true },
                { "message": { "id": { "peer": { "namespace": "Group", "id": 3 }, "namespace": 0, "id": 2 }, "timestamp": 61, "media": ["Photo"], "group_info": { "stable_id": 9 } } },
                { "message": { "id": { "peer": { "namespace": "Group", "id": 3 }, "namespace": 0, "id": 3 }, "timestamp": 62, "media": ["Photo"], "group_info": { "stable_id": 9 } } }
            ]
        },
        "policy": { "include_search_banner": true },
        "badges": [
            { "outgoing": { "Sent": { "read": false } }, "placement": "BubbleOutgoing", "date_text": "9:41",
              "constrained_size": { "width": 200.0, "height": 20.0 } }
        ]
    }"#;

    #[test]
    fn fixture_is_reconciled_and_badges_laid_out() {
        let fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
        let report = inspect(fixture, &TimelineSettings::default(), false, false).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "3 timeline entries:");
        assert!(lines[1].contains("message #1"));
        assert!(lines[2].contains("album 9 with messages [2, 3]"));
        assert!(lines[3].ends_with("search banner"));
        assert!(lines[4].starts_with("badge 0: BubbleOutgoing"));
        assert!(report.contains("SentCheck"));
        // "HH:MM" is 5 glyphs of 6 wide, after the bubble's 10 inset.
        assert!(report.contains("message #1 badge: BubbleIncoming, size 40x13"), "{report}");
    }

    #[test]
    fn flags_override_settings() {
        let fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
        let report = inspect(fixture, &TimelineSettings::default(), true, true).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "4 timeline entries:");
        assert!(lines[1].ends_with("search banner"));
        assert!(lines[2].contains("message #3"));
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let mut fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
        let first = fixture.snapshot.records[0].clone();
        fixture.snapshot.records.push_back(first);
        let error = inspect(fixture, &TimelineSettings::default(), false, false).unwrap_err();
        assert!(error.to_string().contains("breaking ascending order"));
    }
}
