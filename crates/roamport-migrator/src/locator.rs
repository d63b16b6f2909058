use std::path::Path;

use roamport_core::{
    ErrorStage, LocatorConfig, MigrationError, ProfileDescriptor, ProfileType, StageResultExt,
};
use tracing::{info, warn};

use crate::{stage_archives, WorkingDirectory};

/// Probes the share for a legacy store and classifies it. An archived store
/// is staged into `work_dir`; a staging failure removes `work_dir` before the
/// error is returned.
pub fn locate_profile(
    config: &LocatorConfig,
    share_root: &Path,
    user: &str,
    work_dir: &mut WorkingDirectory,
) -> Result<ProfileDescriptor, MigrationError> {
    let managed = config.managed_store(share_root, user);
    if managed.is_dir() {
        let settings = managed.join(&config.managed_settings_file);
        if !settings.is_file() {
            return Err(MigrationError::Validation(format!(
                "managed store {} has no settings file {}",
                managed.display(),
                config.managed_settings_file
            )));
        }
        let data = managed.join(&config.managed_data_dir);
        if !data.is_dir() {
            warn!(
                stage = "locate",
                path = %data.display(),
                "managed store has no data directory"
            );
        }
        info!(stage = "locate", store = %managed.display(), "found managed store");
        return Ok(ProfileDescriptor::new(ProfileType::Managed, &settings, &data));
    }

    let archived = config.archived_store(share_root, user);
    if archived.is_dir() {
        let names = &config.archive_names;
        let settings_archive = archived.join(&names.settings);
        let data_archive = archived.join(&names.data);
        for archive in [&settings_archive, &data_archive] {
            if !archive.is_file() {
                return Err(MigrationError::Validation(format!(
                    "archived store {} is missing {}",
                    archived.display(),
                    archive.display()
                )));
            }
        }
        info!(stage = "locate", store = %archived.display(), "found archived store");

        let staged = match stage_archives(work_dir, &settings_archive, &data_archive)
            .stage(ErrorStage::Staging)
        {
            Ok(staged) => staged,
            Err(err) => {
                work_dir.cleanup();
                return Err(err);
            }
        };

        let settings = staged.settings_dir.join(&names.settings_file);
        if !settings.is_file() {
            work_dir.cleanup();
            return Err(MigrationError::Staging(format!(
                "settings archive {} did not contain {}",
                settings_archive.display(),
                names.settings_file
            )));
        }
        return Ok(ProfileDescriptor::new(
            ProfileType::Archived,
            &settings,
            &staged.data_dir,
        ));
    }

    info!(
        stage = "locate",
        user, "no legacy store found; profile already migrated"
    );
    Ok(ProfileDescriptor::already_migrated())
}
