use std::{path::Path, sync::OnceLock};

use directories::ProjectDirs;

/// Reconciling a message history snapshot into the entries of a chat timeline.
pub mod timeline;
/// Laying out the date and delivery status badge of a message.
pub mod status_badge;
/// Types shared by the timeline and the status badge.
pub mod shared;

pub mod settings;
pub mod persistence;
pub mod cpu_worker;
pub mod error;
/// The `timeline-inspect` command-line tool.
pub mod inspect;

pub mod utils;


pub const APP_QUALIFIER: &str = "org";
pub const APP_ORGANIZATION: &str = "chat-timeline";
pub const APP_NAME: &str = "chat-timeline";

/// Returns the project directories, or `None` if the platform has no home directory.
pub fn project_dir() -> Option<&'static ProjectDirs> {
    static PROJECT_DIRS: OnceLock<Option<ProjectDirs>> = OnceLock::new();

    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
    })
    .as_ref()
}

pub fn app_data_dir() -> Option<&'static Path> {
    project_dir().map(ProjectDirs::data_dir)
}
