//! Heuristics that decide whether a message is displayed as a large or animated emoji.
//!
//! A message consisting only of a few emoji is rendered larger than normal text,
//! and a message consisting of a single emoji that has an animated sticker
//! counterpart is rendered as that animation instead.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use super::{entry::ContentTypeHint, model::{Media, Message}};

/// Messages with this many grapheme clusters or more are never shown as large emoji.
const MAX_LARGE_EMOJI_GRAPHEMES: usize = 10;

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Provides the emoji knowledge that the presentation layer owns.
pub trait EmojiCatalog: Send + Sync {
    /// Returns `true` if an animated sticker exists for the given emoji key.
    ///
    /// The key has already been normalized with [`basic_emoji()`].
    fn has_animated_emoji(&self, key: &str) -> bool;

    /// Returns `true` if `text` should be rendered as large emoji.
    fn is_eligible_for_large_emoji(&self, text: &str) -> bool {
        is_emoji_only(text)
    }
}

/// A catalog without any animated emoji.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimatedEmoji;

impl EmojiCatalog for NoAnimatedEmoji {
    fn has_animated_emoji(&self, _key: &str) -> bool {
        false
    }
}

/// A fixed set of emoji that have animated stickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimatedEmojiSet {
    keys: HashSet<String>,
}
impl AnimatedEmojiSet {
    pub fn new<I, S>(emoji: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: emoji.into_iter().map(|e| basic_emoji(e.as_ref())).collect(),
        }
    }
}

impl EmojiCatalog for AnimatedEmojiSet {
    fn has_animated_emoji(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Strips presentation selectors and skin-tone modifiers from an emoji,
/// producing the key under which its animated sticker is looked up.
pub fn basic_emoji(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{FE0E}' | '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}'))
        .collect()
}

pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Returns `true` if `text` contains at least one emoji and nothing else but whitespace.
pub fn is_emoji_only(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    text.graphemes(true)
        .all(|g| g.chars().all(char::is_whitespace) || is_emoji_grapheme(g))
}

fn is_emoji_grapheme(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    // Keycap sequences like "1️⃣" start with a plain ASCII character.
    if matches!(first, '0'..='9' | '#' | '*') {
        return grapheme.contains(COMBINING_KEYCAP);
    }
    is_pictographic(first)
        && chars.all(|c| is_pictographic(c) || is_emoji_modifier(c))
}

fn is_emoji_modifier(c: char) -> bool {
    matches!(c,
        ZERO_WIDTH_JOINER
        | COMBINING_KEYCAP
        | '\u{FE0E}' | '\u{FE0F}'
        | '\u{E0020}'..='\u{E007F}' // tag sequences (subdivision flags)
    )
}

fn is_pictographic(c: char) -> bool {
    matches!(c,
        '\u{00A9}' | '\u{00AE}'
        | '\u{203C}' | '\u{2049}' | '\u{2122}' | '\u{2139}'
        | '\u{2194}'..='\u{21AA}'
        | '\u{2300}'..='\u{23FF}'
        | '\u{24C2}'
        | '\u{25AA}'..='\u{25FE}'
        | '\u{2600}'..='\u{27BF}'
        | '\u{2934}' | '\u{2935}'
        | '\u{2B00}'..='\u{2BFF}'
        | '\u{3030}' | '\u{303D}' | '\u{3297}' | '\u{3299}'
        | '\u{1F000}'..='\u{1FAFF}'
    )
}

/// Decides how a message's content should be presented.
///
/// Dice always animate. Otherwise, only text-only messages are candidates,
/// and only when the user has enabled large emoji.
pub(crate) fn classify_content(
    message: &Message,
    large_emoji_enabled: bool,
    stickers_enabled: bool,
    catalog: &dyn EmojiCatalog,
) -> ContentTypeHint {
    if message.media.iter().any(|m| matches!(m, Media::Dice { .. })) {
        return ContentTypeHint::AnimatedEmoji;
    }
    if !large_emoji_enabled || !message.media.is_empty() {
        return ContentTypeHint::Generic;
    }
    let graphemes = grapheme_count(&message.text);
    if stickers_enabled
        && graphemes == 1
        && catalog.has_animated_emoji(&basic_emoji(&message.text))
    {
        ContentTypeHint::AnimatedEmoji
    } else if graphemes < MAX_LARGE_EMOJI_GRAPHEMES && catalog.is_eligible_for_large_emoji(&message.text) {
        ContentTypeHint::LargeEmoji
    } else {
        ContentTypeHint::Generic
    }
}
