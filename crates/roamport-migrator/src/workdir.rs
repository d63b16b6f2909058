use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::MigrationLayout;

static WORK_DIR_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Scratch directory backing staged archives. Owned by one run and removed
/// once, either through [`WorkingDirectory::cleanup`] or on drop.
#[derive(Debug)]
pub struct WorkingDirectory {
    path: PathBuf,
    cleaned: bool,
}

impl WorkingDirectory {
    /// Picks a path that no earlier or concurrent run can share. Nothing is
    /// created until [`WorkingDirectory::ensure_created`] is called.
    pub fn reserve(layout: &MigrationLayout) -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system time is before unix epoch")?
            .as_nanos();
        let sequence = WORK_DIR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let suffix = format!("{}-{}-{}", std::process::id(), nanos, sequence);
        Ok(Self {
            path: layout.work_dir_path(&suffix),
            cleaned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_created(&self) -> Result<()> {
        fs::create_dir_all(&self.path)
            .with_context(|| format!("failed creating working dir: {}", self.path.display()))
    }

    /// Best-effort removal. Returns true only for the call that removed the
    /// directory; later calls are no-ops.
    pub fn cleanup(&mut self) -> bool {
        if self.cleaned {
            return false;
        }
        self.cleaned = true;
        if !self.path.exists() {
            return false;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed working directory");
                true
            }
            Err(err) => {
                warn!(path = %self.path.display(), "failed to remove working directory: {err}");
                false
            }
        }
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        self.cleanup();
    }
}
