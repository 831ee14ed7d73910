//! File-backed preference store.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{StudioError, Theme};
use crate::ports::PreferenceStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    theme: Theme,
}

/// Stores preferences as JSON, e.g. `{"theme":"dark"}`.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Store backed by `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    /// A missing file is `None`; an unreadable or corrupt one is logged and
    /// also treated as `None`.
    fn load_theme(&self) -> Result<Option<Theme>, StudioError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read preferences");
                return Ok(None);
            }
        };

        match serde_json::from_str::<Preferences>(&raw) {
            Ok(prefs) => Ok(Some(prefs.theme)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt preferences");
                Ok(None)
            }
        }
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StudioError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&Preferences { theme })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
