use anyhow::{Context, Result};
use roamport_core::FileEntry;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub directories_created: usize,
    pub files_copied: usize,
}

/// Materializes `entries` from `source_root` under `destination_root`. Every
/// directory is created before any file is copied because listing order does
/// not put directories ahead of their contents. Existing files are overwritten.
pub fn copy_profile_data(
    source_root: &Path,
    destination_root: &Path,
    entries: &[FileEntry],
) -> Result<CopySummary> {
    let mut summary = CopySummary::default();

    for entry in entries.iter().filter(|entry| entry.is_directory) {
        let dst = destination_root.join(&entry.relative_path);
        fs::create_dir_all(&dst).with_context(|| format!("failed to create {}", dst.display()))?;
        summary.directories_created += 1;
    }

    for entry in entries.iter().filter(|entry| !entry.is_directory) {
        let src = source_root.join(&entry.relative_path);
        let dst = destination_root.join(&entry.relative_path);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&src, &dst).with_context(|| {
            format!("failed to copy {} to {}", src.display(), dst.display())
        })?;
        summary.files_copied += 1;
    }

    info!(
        stage = "copy",
        directories = summary.directories_created,
        files = summary.files_copied,
        destination = %destination_root.display(),
        "copied profile data"
    );
    Ok(summary)
}
