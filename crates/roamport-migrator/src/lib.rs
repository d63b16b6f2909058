mod applier;
mod copier;
mod data_filter;
mod layout;
mod locator;
mod orchestrator;
mod registry_filter;
mod staging;
mod workdir;

pub use applier::{apply_registry_document, apply_registry_document_with_runner, ApplyOutcome};
pub use copier::{copy_profile_data, CopySummary};
pub use data_filter::{filter_data_set, list_entries, name_set};
pub use layout::{default_profile_dir, MigrationLayout};
pub use locator::locate_profile;
pub use orchestrator::{
    MigrationOrchestrator, MigrationReport, MigrationRequest, MigrationStage, SkipReason,
};
pub use registry_filter::{
    exclude_keys, filter_registry_document, include_keys, rewrite_prefix, RegistryFilterRules,
};
pub use staging::{stage_archives, StagedArchives};
pub use workdir::WorkingDirectory;
