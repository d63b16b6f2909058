use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const IMPORT_FILE_PREFIX: &str = "roamport-settings";
const WORK_DIR_PREFIX: &str = "roamport-work";

/// Per-user locations a run reads and writes outside the legacy share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLayout {
    profile_dir: PathBuf,
    temp_dir: PathBuf,
}

impl MigrationLayout {
    pub fn new(profile_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile_dir: profile_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// The serialized settings handed to the importer. Its presence marks a
    /// completed migration for `user`, so every identity gets its own file.
    pub fn registry_import_path(&self, user: &str) -> PathBuf {
        self.temp_dir.join(format!("{IMPORT_FILE_PREFIX}-{user}.reg"))
    }

    pub fn work_dir_path(&self, suffix: &str) -> PathBuf {
        self.temp_dir.join(format!("{WORK_DIR_PREFIX}-{suffix}"))
    }
}

pub fn default_profile_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let profile = std::env::var("USERPROFILE")
            .context("USERPROFILE is not set; cannot resolve the local profile")?;
        return Ok(PathBuf::from(profile));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve the local profile")?;
    Ok(PathBuf::from(home))
}
