use std::{io::Write, path::{Path, PathBuf}};

use tracing::{error, info};

use crate::{app_data_dir, settings::TimelineSettings};


const SETTINGS_FILE_NAME: &str = "timeline_settings.json";


/// Returns the default location of the settings file, if the platform has a data directory.
pub fn default_settings_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(SETTINGS_FILE_NAME))
}

/// Save the given timeline settings to the file at `path`, creating its parent directory if needed.
pub fn save_settings(settings: &TimelineSettings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, settings)?;
    writer.flush()?;
    info!("Successfully saved timeline settings to {}", path.display());
    Ok(())
}

/// Loads the timeline settings from the file at `path`.
///
/// If the file doesn't exist or deserialization fails (e.g., due to incompatible format changes),
/// this function returns the default settings and backs up the old file if it exists.
pub fn load_settings(path: &Path) -> anyhow::Result<TimelineSettings> {
    let file_bytes = match std::fs::read(path) {
        Ok(fb) => fb,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No saved timeline settings found, using default.");
            return Ok(TimelineSettings::default());
        }
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice(&file_bytes) {
        Ok(settings) => {
            info!("Successfully loaded timeline settings from {}", path.display());
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to deserialize timeline settings: {e}. This may be due to an incompatible format from a previous version.");

            // Backup the old file to preserve the user's data
            let backup_path = path.with_extension("json.bak");
            if let Err(backup_err) = std::fs::rename(path, &backup_path) {
                error!("Failed to backup old timeline settings file: {backup_err}");
            } else {
                info!("Old timeline settings backed up to: {backup_path:?}");
            }
            Ok(TimelineSettings::default())
        }
    }
}
