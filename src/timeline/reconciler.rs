//! Turns a history snapshot into the ordered list of timeline entries.
//!
//! [`reconcile()`] is a pure function: the same inputs always produce the same
//! entries, and nothing is cached between calls. The list layer is responsible
//! for diffing the result against the previously-displayed entries.
//!
//! The passes happen in a fixed order, since later passes position their
//! synthetic entries relative to what the earlier passes produced:
//! 1. message entries and albums, in source order,
//! 2. the unread boundary,
//! 3. the reply-thread head (root message + reply count separator),
//! 4. the chat info banner / empty-chat suppression, or the search banner,
//! 5. optional reversal.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, trace};

use super::{
    chat_info::apply_banners,
    emoji::classify_content,
    entry::{EntryAttributes, GroupMember, MessageEntry, MessageGroupEntry, Selection, TimelineEntry},
    model::{AdditionalDatum, AdminRank, GroupInfo, HistorySnapshot, Media, Message, MessageAttribute, MessageId, PeerId},
    policy::{ChatLocation, ReconcilePolicy, ReplyThreadInfo},
};


/// Builds the ordered list of timeline entries for the given history snapshot.
///
/// This never fails: missing side-channel data simply skips the enrichment
/// that would have used it. An empty result is a normal outcome, e.g., when
/// the history appears cleared or when an effectively-empty chat is hidden
/// in favor of its info banner.
pub fn reconcile(
    location: &ChatLocation,
    snapshot: &HistorySnapshot,
    policy: &ReconcilePolicy,
) -> Vec<TimelineEntry> {
    if policy.history_appears_cleared {
        return Vec::new();
    }

    let channel = ChannelContext::scan(location, snapshot);
    let mut entries = build_message_entries(snapshot, policy, &channel);
    insert_unread_boundary(snapshot, policy, &mut entries);

    let added_thread_head = match location {
        ChatLocation::ReplyThread(thread) => inject_thread_head(thread, snapshot, policy, &channel, &mut entries),
        ChatLocation::Peer(_) => false,
    };

    apply_banners(location, snapshot, policy, added_thread_head, &mut entries);

    if policy.reverse_output {
        entries.reverse();
    }
    trace!(
        "Reconciled {} records into {} timeline entries for {location:?}",
        snapshot.records.len(),
        entries.len(),
    );
    entries
}


/// Per-channel data gathered from the snapshot's side channel.
#[derive(Debug, Default)]
struct ChannelContext<'s> {
    admin_ranks: Option<&'s HashMap<PeerId, AdminRank>>,
    stickers_enabled: bool,
}

impl<'s> ChannelContext<'s> {
    /// Collects admin ranks and sticker restrictions, which only exist for channels.
    fn scan(location: &ChatLocation, snapshot: &'s HistorySnapshot) -> Self {
        let mut context = ChannelContext {
            admin_ranks: None,
            stickers_enabled: true,
        };
        let ChatLocation::Peer(peer_id) = location else {
            return context;
        };
        if !peer_id.is_channel() {
            return context;
        }
        for datum in &snapshot.additional_data {
            match datum {
                AdditionalDatum::CachedAdminRanks { peer, ranks } if peer == peer_id => {
                    context.admin_ranks = Some(ranks);
                }
                AdditionalDatum::PeerMetadata(peer) if peer.id() == *peer_id => {
                    if peer.bans_stickers() {
                        context.stickers_enabled = false;
                    }
                }
                _ => {}
            }
        }
        context
    }

    fn rank_of(&self, message: &Message) -> Option<AdminRank> {
        let author = message.author.as_ref()?;
        self.admin_ranks?.get(&author.id).cloned()
    }
}


/// The run of consecutive same-album messages that hasn't been emitted yet.
#[derive(Debug, Default)]
struct AlbumBucket {
    group_info: Option<GroupInfo>,
    members: Vec<GroupMember>,
}

impl AlbumBucket {
    /// Returns `true` if a message with the given group info can't join this bucket.
    fn breaks_on(&self, group_info: Option<GroupInfo>) -> bool {
        self.group_info.is_some() && self.group_info != group_info
    }

    fn push(&mut self, group_info: GroupInfo, member: GroupMember) {
        self.group_info = Some(group_info);
        self.members.push(member);
    }

    /// Empties this bucket, returning its contents as a single album entry.
    fn flush(&mut self) -> Option<TimelineEntry> {
        let group_info = self.group_info.take()?;
        let members = std::mem::take(&mut self.members);
        (!members.is_empty()).then_some(TimelineEntry::MessageGroup(MessageGroupEntry {
            group_info,
            members,
        }))
    }
}


fn selection_for(policy: &ReconcilePolicy, id: MessageId) -> Selection {
    match &policy.selected_message_ids {
        Some(selected) => Selection::Selectable { selected: selected.contains(&id) },
        None => Selection::None,
    }
}

/// Advances the read state of the message's reply thread to `read_up_to`.
///
/// Only the first reply-thread attribute is considered, and the read state is
/// never moved backwards. Returns the original message if nothing changed.
fn advance_discussion_read_state(message: &Arc<Message>, read_up_to: MessageId) -> Arc<Message> {
    let Some(thread) = message.reply_thread() else {
        return Arc::clone(message);
    };
    match thread.max_read_message_id {
        Some(max_read) if max_read < read_up_to.id => {
            let mut advanced = thread.clone();
            advanced.max_read_message_id = Some(read_up_to.id);
            let mut pending = Some(advanced);
            let attributes = message.attributes.iter()
                .map(|attr| match attr {
                    MessageAttribute::ReplyThread(_) if pending.is_some() => {
                        pending.take().map_or(MessageAttribute::Other, MessageAttribute::ReplyThread)
                    }
                    other => other.clone(),
                })
                .collect();
            Arc::new(message.with_updated_attributes(attributes))
        }
        _ => Arc::clone(message),
    }
}

fn entry_attributes(
    message: &Message,
    is_contact: bool,
    policy: &ReconcilePolicy,
    channel: &ChannelContext,
) -> EntryAttributes {
    EntryAttributes {
        rank: channel.rank_of(message),
        is_contact,
        content_type_hint: classify_content(
            message,
            policy.large_emoji_enabled,
            channel.stickers_enabled,
            policy.emoji.as_ref(),
        ),
        updating_media: policy.updating_media_overrides.get(&message.id).cloned(),
    }
}

/// Walks the snapshot's records in order, emitting message entries and albums.
fn build_message_entries(
    snapshot: &HistorySnapshot,
    policy: &ReconcilePolicy,
    channel: &ChannelContext,
) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(snapshot.records.len() + 3);
    let mut album = AlbumBucket::default();

    for record in &snapshot.records {
        let id = record.message.id;
        if policy.pending_removed_ids.contains(&id) {
            continue;
        }

        let is_read = match policy.thread_outgoing_read_override {
            Some(read_up_to) => read_up_to >= id,
            None => record.is_read,
        };
        let message = match policy.discussion_read_override {
            Some(read_up_to) => advance_discussion_read_state(&record.message, read_up_to),
            None => Arc::clone(&record.message),
        };

        if let Some(action) = message.media.iter()
            .filter_map(Media::action)
            .find(|action| action.is_structural_marker())
        {
            debug!("Skipping structural {action:?} message {id:?}");
            continue;
        }

        let attributes = entry_attributes(&message, record.author_is_contact, policy, channel);
        let selection = selection_for(policy, id);

        if policy.group_albums {
            if album.breaks_on(message.group_info) {
                entries.extend(album.flush());
            }
            if let Some(group_info) = message.group_info {
                album.push(group_info, GroupMember { message, is_read, selection, attributes });
                continue;
            }
        }
        entries.push(TimelineEntry::Message(MessageEntry {
            message,
            is_read,
            month_marker: record.month_marker,
            selection,
            attributes,
        }));
    }
    entries.extend(album.flush());
    entries
}

/// Inserts the read/unread boundary before the first entry that is newer than
/// the snapshot's read marker, unless that would be the very first entry.
fn insert_unread_boundary(
    snapshot: &HistorySnapshot,
    policy: &ReconcilePolicy,
    entries: &mut Vec<TimelineEntry>,
) {
    if !policy.include_unread_marker {
        return;
    }
    let Some(max_read_index) = snapshot.max_read_index else {
        return;
    };
    if let Some(position) = entries.iter().position(|entry| entry.index() > max_read_index)
        && position > 0
    {
        entries.insert(position, TimelineEntry::UnreadBoundary { index: max_read_index });
    }
}

/// Shows the thread's root message above its replies once the top of the thread is visible.
///
/// Returns `true` if the root was injected.
fn inject_thread_head(
    thread: &ReplyThreadInfo,
    snapshot: &HistorySnapshot,
    policy: &ReconcilePolicy,
    channel: &ChannelContext,
    entries: &mut Vec<TimelineEntry>,
) -> bool {
    if snapshot.has_earlier || snapshot.hole_earlier || snapshot.is_loading {
        return false;
    }
    let Some(messages) = snapshot.thread_head(thread.effective_top_id) else {
        return false;
    };
    let Some(root) = messages.first() else {
        return false;
    };

    let root_attributes = entry_attributes(root, false, policy, channel);
    let head = match root.group_info {
        Some(group_info) if messages.len() > 1 => TimelineEntry::MessageGroup(MessageGroupEntry {
            group_info,
            members: messages.iter()
                .map(|message| GroupMember {
                    message: Arc::clone(message),
                    is_read: false,
                    selection: Selection::None,
                    attributes: EntryAttributes {
                        updating_media: policy.updating_media_overrides.get(&message.id).cloned(),
                        ..root_attributes.clone()
                    },
                })
                .collect(),
        }),
        _ => TimelineEntry::Message(MessageEntry {
            message: Arc::clone(root),
            is_read: false,
            month_marker: None,
            selection: Selection::None,
            attributes: root_attributes,
        }),
    };
    entries.insert(0, head);
    entries.insert(1, TimelineEntry::ReplyThreadHeadCount {
        index: root.index(),
        is_channel_post: thread.is_channel_post,
        count: if snapshot.records.is_empty() { 0 } else { 1 },
    });
    debug!("Injected reply thread head {:?} ({} messages)", thread.effective_top_id, messages.len());
    true
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::timeline::{
        emoji::AnimatedEmojiSet,
        entry::ContentTypeHint,
        model::{ActionKind, Author, BotInfo, CachedPeerData, ChannelFlags, ChannelKind, BannedRights, BannedRightsFlags, HistoryRecord, MessageIndex, Peer, PeerNamespace, ReplyThreadAttribute},
    };

    fn chat() -> PeerId {
        PeerId::new(PeerNamespace::Group, 10)
    }

    fn channel() -> PeerId {
        PeerId::new(PeerNamespace::Channel, 20)
    }

    fn msg(peer: PeerId, id: i32) -> Message {
        Message {
            id: MessageId { peer, namespace: 0, id },
            timestamp: 1000 + id,
            text: format!("message {id}"),
            attributes: Vec::new(),
            media: Vec::new(),
            group_info: None,
            author: Some(Author { id: PeerId::new(PeerNamespace::User, 100 + i64::from(id)), display_name: String::new() }),
            chat_peer: None,
        }
    }

    fn in_album(mut message: Message, stable_id: u32) -> Message {
        message.group_info = Some(GroupInfo { stable_id });
        message
    }

    fn with_action(mut message: Message, action: ActionKind) -> Message {
        message.text.clear();
        message.media.push(Media::Action(action));
        message
    }

    fn record(message: Message) -> HistoryRecord {
        HistoryRecord { message: Arc::new(message), is_read: true, author_is_contact: false, month_marker: None }
    }

    fn snapshot(messages: Vec<Message>) -> HistorySnapshot {
        HistorySnapshot {
            records: messages.into_iter().map(record).collect(),
            ..Default::default()
        }
    }

    fn ids(entries: &[TimelineEntry]) -> Vec<i32> {
        entries.iter()
            .flat_map(|e| e.messages())
            .map(|m| m.id.id)
            .collect()
    }

    fn kinds(entries: &[TimelineEntry]) -> Vec<&'static str> {
        entries.iter()
            .map(|e| match e {
                TimelineEntry::Message(_) => "message",
                TimelineEntry::MessageGroup(_) => "group",
                TimelineEntry::UnreadBoundary { .. } => "unread",
                TimelineEntry::ReplyThreadHeadCount { .. } => "thread_count",
                TimelineEntry::ChatInfoBanner { .. } => "chat_info",
                TimelineEntry::SearchBanner => "search",
            })
            .collect()
    }

    #[test]
    fn cleared_history_short_circuits() {
        let snapshot = snapshot(vec![msg(chat(), 1)]);
        let policy = ReconcilePolicy { history_appears_cleared: true, include_search_banner: true, ..Default::default() };
        assert!(reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy).is_empty());
    }

    #[test]
    fn albums_are_grouped_and_flushed_in_order() {
        let snapshot = snapshot(vec![
            msg(chat(), 1),
            in_album(msg(chat(), 2), 7),
            in_album(msg(chat(), 3), 7),
            in_album(msg(chat(), 4), 8),
            msg(chat(), 5),
            in_album(msg(chat(), 6), 9),
        ]);
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &ReconcilePolicy::default());
        assert_eq!(kinds(&entries), ["message", "group", "group", "message", "group"]);
        assert_eq!(ids(&entries), [1, 2, 3, 4, 5, 6]);
        let TimelineEntry::MessageGroup(album) = &entries[1] else { panic!("expected an album") };
        assert_eq!(album.group_info, GroupInfo { stable_id: 7 });
        assert_eq!(album.members.len(), 2);
    }

    #[test]
    fn disabling_albums_never_merges() {
        let snapshot = snapshot(vec![
            in_album(msg(chat(), 1), 7),
            in_album(msg(chat(), 2), 7),
            msg(chat(), 3),
        ]);
        let location = ChatLocation::Peer(chat());
        let grouped = reconcile(&location, &snapshot, &ReconcilePolicy::default());
        let flat = reconcile(&location, &snapshot, &ReconcilePolicy { group_albums: false, ..Default::default() });
        assert_eq!(kinds(&flat), ["message", "message", "message"]);
        assert!(flat.len() >= grouped.len());
        assert_eq!(ids(&flat), ids(&grouped));
    }

    #[test]
    fn structural_action_messages_never_appear() {
        let snapshot = snapshot(vec![
            with_action(msg(chat(), 1), ActionKind::ChannelMigratedFromGroup),
            msg(chat(), 2),
            with_action(msg(chat(), 3), ActionKind::HistoryCleared),
            with_action(msg(chat(), 4), ActionKind::GroupMigratedToChannel),
            with_action(msg(chat(), 5), ActionKind::PhotoUpdated),
        ]);
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &ReconcilePolicy::default());
        assert_eq!(ids(&entries), [2, 5]);
    }

    #[test]
    fn pending_removals_are_hidden() {
        let snapshot = snapshot(vec![msg(chat(), 1), msg(chat(), 2), msg(chat(), 3)]);
        let policy = ReconcilePolicy {
            pending_removed_ids: HashSet::from([MessageId { peer: chat(), namespace: 0, id: 2 }]),
            ..Default::default()
        };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        assert_eq!(ids(&entries), [1, 3]);
    }

    #[test]
    fn selection_is_keyed_by_message_id() {
        let snapshot = snapshot(vec![msg(chat(), 1), msg(chat(), 2)]);
        let location = ChatLocation::Peer(chat());
        let entries = reconcile(&location, &snapshot, &ReconcilePolicy::default());
        assert!(entries.iter().all(|e| matches!(e, TimelineEntry::Message(m) if m.selection == Selection::None)));

        let policy = ReconcilePolicy {
            selected_message_ids: Some(HashSet::from([MessageId { peer: chat(), namespace: 0, id: 2 }])),
            ..Default::default()
        };
        let entries = reconcile(&location, &snapshot, &policy);
        let selections: Vec<_> = entries.iter()
            .filter_map(|e| match e { TimelineEntry::Message(m) => Some(m.selection), _ => None })
            .collect();
        assert_eq!(selections, [Selection::Selectable { selected: false }, Selection::Selectable { selected: true }]);
    }

    #[test]
    fn unread_boundary_goes_before_first_unread_entry() {
        let mut snapshot = snapshot(vec![msg(chat(), 1), msg(chat(), 2), msg(chat(), 3)]);
        snapshot.max_read_index = Some(snapshot.records[1].message.index());
        let policy = ReconcilePolicy { include_unread_marker: true, ..Default::default() };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        assert_eq!(kinds(&entries), ["message", "message", "unread", "message"]);
    }

    #[test]
    fn unread_boundary_is_never_first() {
        let mut snapshot = snapshot(vec![msg(chat(), 5), msg(chat(), 6)]);
        snapshot.max_read_index = Some(MessageIndex::lower_bound());
        let policy = ReconcilePolicy { include_unread_marker: true, ..Default::default() };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        assert_eq!(kinds(&entries), ["message", "message"]);

        // Everything read: nothing is newer than the marker, so no boundary either.
        snapshot.max_read_index = Some(snapshot.records[1].message.index());
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        assert_eq!(kinds(&entries), ["message", "message"]);
    }

    #[test]
    fn unread_boundary_uses_last_album_member() {
        let mut snapshot = snapshot(vec![
            msg(chat(), 1),
            in_album(msg(chat(), 2), 7),
            in_album(msg(chat(), 3), 7),
        ]);
        snapshot.max_read_index = Some(snapshot.records[1].message.index());
        let policy = ReconcilePolicy { include_unread_marker: true, ..Default::default() };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        assert_eq!(kinds(&entries), ["message", "unread", "group"]);
    }

    #[test]
    fn thread_outgoing_read_override_replaces_read_flags() {
        let mut snapshot = snapshot(vec![msg(chat(), 1), msg(chat(), 2), msg(chat(), 3)]);
        for record in snapshot.records.iter_mut() {
            record.is_read = false;
        }
        let policy = ReconcilePolicy {
            thread_outgoing_read_override: Some(MessageId { peer: chat(), namespace: 0, id: 2 }),
            ..Default::default()
        };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        let read: Vec<_> = entries.iter()
            .filter_map(|e| match e { TimelineEntry::Message(m) => Some(m.is_read), _ => None })
            .collect();
        assert_eq!(read, [true, true, false]);
    }

    #[test]
    fn discussion_read_override_only_advances_first_thread_attribute() {
        let thread = |max_read| MessageAttribute::ReplyThread(ReplyThreadAttribute {
            count: 3,
            latest_users: Vec::new(),
            comments_peer_id: None,
            max_message_id: Some(50),
            max_read_message_id: max_read,
        });
        let mut behind = msg(channel(), 1);
        behind.attributes = vec![MessageAttribute::Views { count: 1 }, thread(Some(10)), thread(Some(5))];
        let mut ahead = msg(channel(), 2);
        ahead.attributes = vec![thread(Some(40))];
        let mut unknown = msg(channel(), 3);
        unknown.attributes = vec![thread(None)];

        let snapshot = snapshot(vec![behind.clone(), ahead.clone(), unknown.clone()]);
        let policy = ReconcilePolicy {
            discussion_read_override: Some(MessageId { peer: channel(), namespace: 0, id: 30 }),
            ..Default::default()
        };
        let entries = reconcile(&ChatLocation::Peer(channel()), &snapshot, &policy);
        let messages: Vec<_> = entries.iter().flat_map(|e| e.messages()).collect();

        assert_eq!(messages[0].attributes[1], thread(Some(30)));
        assert_eq!(messages[0].attributes[2], thread(Some(5)));
        assert_eq!(messages[1].attributes, ahead.attributes);
        assert_eq!(messages[2].attributes, unknown.attributes);
        // The snapshot's own message is untouched.
        assert_eq!(snapshot.records[0].message.attributes, behind.attributes);
    }

    #[test]
    fn admin_ranks_and_sticker_bans_only_apply_to_channels() {
        let author = PeerId::new(PeerNamespace::User, 101);
        let mut ranks = HashMap::new();
        ranks.insert(author, AdminRank::Custom("editor".into()));
        let mut thumbs_up = msg(channel(), 1);
        thumbs_up.text = "👍".into();

        let mut snapshot = snapshot(vec![thumbs_up]);
        snapshot.additional_data = vec![
            AdditionalDatum::CachedAdminRanks { peer: channel(), ranks },
            AdditionalDatum::PeerMetadata(Peer::Channel {
                id: channel(),
                kind: ChannelKind::Broadcast,
                flags: ChannelFlags::empty(),
                default_banned_rights: Some(BannedRights { flags: BannedRightsFlags::BAN_SEND_STICKERS }),
            }),
        ];
        let policy = ReconcilePolicy {
            emoji: Arc::new(AnimatedEmojiSet::new(["👍"])),
            ..Default::default()
        };

        let entries = reconcile(&ChatLocation::Peer(channel()), &snapshot, &policy);
        let TimelineEntry::Message(entry) = &entries[0] else { panic!("expected a message") };
        assert_eq!(entry.attributes.rank, Some(AdminRank::Custom("editor".into())));
        assert_eq!(entry.attributes.content_type_hint, ContentTypeHint::LargeEmoji);

        // Outside a channel location, neither the ranks nor the ban are consulted.
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        let TimelineEntry::Message(entry) = &entries[0] else { panic!("expected a message") };
        assert_eq!(entry.attributes.rank, None);
        assert_eq!(entry.attributes.content_type_hint, ContentTypeHint::AnimatedEmoji);
    }

    #[test]
    fn sticker_bans_of_other_channels_are_ignored() {
        let mut thumbs_up = msg(channel(), 1);
        thumbs_up.text = "👍".into();
        let mut snapshot = snapshot(vec![thumbs_up]);
        snapshot.additional_data = vec![AdditionalDatum::PeerMetadata(Peer::Channel {
            id: PeerId::new(PeerNamespace::Channel, 21),
            kind: ChannelKind::Broadcast,
            flags: ChannelFlags::empty(),
            default_banned_rights: Some(BannedRights { flags: BannedRightsFlags::BAN_SEND_STICKERS }),
        })];
        let policy = ReconcilePolicy {
            emoji: Arc::new(AnimatedEmojiSet::new(["👍"])),
            ..Default::default()
        };
        let entries = reconcile(&ChatLocation::Peer(channel()), &snapshot, &policy);
        let TimelineEntry::Message(entry) = &entries[0] else { panic!("expected a message") };
        assert_eq!(entry.attributes.content_type_hint, ContentTypeHint::AnimatedEmoji);
    }

    #[test]
    fn updating_media_and_contacts_are_attached() {
        let mut snapshot = snapshot(vec![msg(chat(), 1)]);
        snapshot.records[0].author_is_contact = true;
        let id = snapshot.records[0].message.id;
        let update = crate::timeline::entry::UpdatingMedia { media: Some(Media::Photo), progress: 0.5 };
        let policy = ReconcilePolicy {
            updating_media_overrides: HashMap::from([(id, update.clone())]),
            ..Default::default()
        };
        let entries = reconcile(&ChatLocation::Peer(chat()), &snapshot, &policy);
        let TimelineEntry::Message(entry) = &entries[0] else { panic!("expected a message") };
        assert!(entry.attributes.is_contact);
        assert_eq!(entry.attributes.updating_media, Some(update));
    }

    fn thread_location() -> (ChatLocation, MessageId) {
        let top = MessageId { peer: channel(), namespace: 0, id: 500 };
        let location = ChatLocation::ReplyThread(ReplyThreadInfo {
            message_id: MessageId { peer: chat(), namespace: 0, id: 1 },
            effective_top_id: top,
            is_channel_post: true,
        });
        (location, top)
    }

    #[test]
    fn thread_head_is_injected_above_replies() {
        let (location, top) = thread_location();
        let mut snapshot = snapshot(vec![msg(chat(), 2), msg(chat(), 3)]);
        snapshot.additional_data.push(AdditionalDatum::ThreadHeadMessages {
            id: top,
            messages: vec![Arc::new(msg(channel(), 500))],
        });
        let entries = reconcile(&location, &snapshot, &ReconcilePolicy::default());
        assert_eq!(kinds(&entries), ["message", "thread_count", "message", "message"]);
        assert!(matches!(
            entries[1],
            TimelineEntry::ReplyThreadHeadCount { is_channel_post: true, count: 1, .. }
        ));
        let TimelineEntry::Message(head) = &entries[0] else { panic!("expected the root message") };
        assert!(!head.is_read);
        assert_eq!(head.selection, Selection::None);
    }

    #[test]
    fn thread_head_album_and_empty_thread_count() {
        let (location, top) = thread_location();
        let mut snapshot = snapshot(Vec::new());
        snapshot.additional_data.push(AdditionalDatum::ThreadHeadMessages {
            id: top,
            messages: vec![
                Arc::new(in_album(msg(channel(), 500), 3)),
                Arc::new(in_album(msg(channel(), 501), 3)),
            ],
        });
        let entries = reconcile(&location, &snapshot, &ReconcilePolicy::default());
        assert_eq!(kinds(&entries), ["group", "thread_count"]);
        assert!(matches!(entries[1], TimelineEntry::ReplyThreadHeadCount { count: 0, .. }));
    }

    #[test]
    fn thread_head_waits_for_top_of_history() {
        let (location, top) = thread_location();
        let mut snapshot = snapshot(vec![msg(chat(), 2)]);
        snapshot.additional_data.push(AdditionalDatum::ThreadHeadMessages {
            id: top,
            messages: vec![Arc::new(msg(channel(), 500))],
        });
        let tweaks: [fn(&mut HistorySnapshot); 3] = [
            |s| s.has_earlier = true,
            |s| s.hole_earlier = true,
            |s| s.is_loading = true,
        ];
        for tweak in tweaks {
            let mut snapshot = snapshot.clone();
            tweak(&mut snapshot);
            let entries = reconcile(&location, &snapshot, &ReconcilePolicy::default());
            assert_eq!(kinds(&entries), ["message"]);
        }
    }

    #[test]
    fn missing_thread_root_is_skipped() {
        let (location, _) = thread_location();
        let mut snapshot = snapshot(vec![msg(chat(), 2)]);
        snapshot.additional_data.push(AdditionalDatum::ThreadHeadMessages {
            id: MessageId { peer: channel(), namespace: 0, id: 999 },
            messages: vec![Arc::new(msg(channel(), 999))],
        });
        let entries = reconcile(&location, &snapshot, &ReconcilePolicy::default());
        assert_eq!(kinds(&entries), ["message"]);
    }

    /// A history mixing albums, structural actions, a read marker, a thread root and a bot banner.
    fn mixed_snapshot() -> HistorySnapshot {
        let (_, top) = thread_location();
        let mut snapshot = snapshot(vec![
            msg(chat(), 1),
            with_action(msg(chat(), 2), ActionKind::HistoryCleared),
            in_album(msg(chat(), 3), 7),
            in_album(msg(chat(), 4), 7),
            msg(chat(), 5),
            with_action(msg(chat(), 6), ActionKind::GroupMigratedToChannel),
            in_album(msg(chat(), 7), 8),
            in_album(msg(chat(), 8), 8),
            msg(chat(), 9),
        ]);
        snapshot.max_read_index = Some(snapshot.records[2].message.index());
        snapshot.additional_data = vec![
            AdditionalDatum::ThreadHeadMessages { id: top, messages: vec![Arc::new(msg(channel(), 500))] },
            AdditionalDatum::CachedPeerData {
                peer: chat(),
                data: CachedPeerData::User { bot_info: Some(BotInfo { description: "Answers questions.".into() }) },
            },
        ];
        snapshot
    }

    #[test]
    fn mixed_history_is_stable_across_policies() {
        let snapshot = mixed_snapshot();
        let (thread, _) = thread_location();
        for location in [ChatLocation::Peer(chat()), thread] {
            for include_unread_marker in [false, true] {
                for include_chat_info_banner in [false, true] {
                    for group_albums in [false, true] {
                        let policy = ReconcilePolicy {
                            include_unread_marker,
                            include_chat_info_banner,
                            include_search_banner: true,
                            group_albums,
                            ..Default::default()
                        };
                        let forward = reconcile(&location, &snapshot, &policy);
                        assert!(!forward.is_empty());

                        // Same inputs, same output.
                        assert_eq!(reconcile(&location, &snapshot, &policy), forward);

                        let reverse_policy = ReconcilePolicy { reverse_output: true, ..policy.clone() };
                        let mut reversed = reconcile(&location, &snapshot, &reverse_policy);
                        reversed.reverse();
                        assert_eq!(reversed, forward);

                        let shown = ids(&forward);
                        assert!(!shown.contains(&2) && !shown.contains(&6), "structural actions leaked: {shown:?}");

                        let kinds = kinds(&forward);
                        match kinds.iter().position(|kind| *kind == "unread") {
                            Some(position) => assert!(position > 0),
                            None => assert!(!include_unread_marker),
                        }
                        if matches!(location, ChatLocation::ReplyThread(_)) {
                            let head = usize::from(include_chat_info_banner);
                            assert_eq!(kinds[head..head + 2], ["message", "thread_count"]);
                        }
                        if include_chat_info_banner {
                            assert!(kinds.contains(&"chat_info"));
                        } else {
                            assert_eq!(kinds.last(), Some(&"search"));
                        }

                        let flat = reconcile(&location, &snapshot, &ReconcilePolicy { group_albums: false, ..policy.clone() });
                        let grouped = reconcile(&location, &snapshot, &ReconcilePolicy { group_albums: true, ..policy });
                        assert!(flat.len() >= grouped.len());
                        assert_eq!(ids(&flat), ids(&grouped));
                    }
                }
            }
        }
    }
}
