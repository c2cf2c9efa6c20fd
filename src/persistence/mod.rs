//! Modules for saving/restoring timeline data to/from persistent storage.

/// For persisting the user's timeline settings.
pub mod settings_state;
pub use settings_state::*;
