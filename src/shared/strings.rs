//! Localized strings and number formatting conventions supplied by the presentation layer.

use serde::{Deserialize, Serialize};

/// The localized strings that the timeline and status badge need.
///
/// The defaults are the English strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationStrings {
    /// The body of the banner shown at the top of the "Replies" system chat.
    pub replies_description: String,
    /// The title of the banner showing a bot's description.
    pub bot_description_title: String,
    /// The marker prepended to the date of an edited message.
    pub edited_label: String,
    /// The decimal separator used when formatting compact counts, e.g., "1.2K".
    pub decimal_separator: String,
}

impl Default for PresentationStrings {
    fn default() -> Self {
        Self {
            replies_description: "This chat helps you keep track of replies to your comments in Channels.".into(),
            bot_description_title: "What can this bot do?".into(),
            edited_label: "edited".into(),
            decimal_separator: ".".into(),
        }
    }
}
