use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::WorkingDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArchives {
    pub settings_dir: PathBuf,
    pub data_dir: PathBuf,
}

/// Unpacks the settings and data archives into separate directories of the
/// run's working directory.
pub fn stage_archives(
    work_dir: &WorkingDirectory,
    settings_archive: &Path,
    data_archive: &Path,
) -> Result<StagedArchives> {
    work_dir.ensure_created()?;
    let settings_dir = work_dir.path().join("settings");
    let data_dir = work_dir.path().join("data");

    extract_zip(settings_archive, &settings_dir).context("failed to stage settings archive")?;
    extract_zip(data_archive, &data_dir).context("failed to stage data archive")?;

    info!(
        stage = "stage",
        work_dir = %work_dir.path().display(),
        "staged legacy archives"
    );
    Ok(StagedArchives {
        settings_dir,
        data_dir,
    })
}

pub(crate) fn extract_zip(archive_path: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open zip archive {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("invalid zip archive {}", archive_path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry {index} of {}",
                archive_path.display()
            )
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(anyhow!(
                "zip entry escapes the extraction root: {}",
                entry.name()
            ));
        };
        let out_path = dst.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut out_file = File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)
            .with_context(|| format!("failed to extract {}", out_path.display()))?;
    }

    Ok(())
}
