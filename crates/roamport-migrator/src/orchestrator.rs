use anyhow::Context;
use roamport_core::{
    decode_text_bytes, ErrorStage, FilterList, MigrationError, ProfileDescriptor, ProfileType,
    RegistryDocument, SiteConfig, StageResultExt,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};

use crate::applier::run_command;
use crate::{
    apply_registry_document_with_runner, copy_profile_data, filter_data_set,
    filter_registry_document, list_entries, locate_profile, ApplyOutcome, CopySummary,
    MigrationLayout, RegistryFilterRules, WorkingDirectory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStage {
    Start,
    Located,
    DataStaged,
    DataFiltered,
    DataApplied,
    SettingsStaged,
    SettingsFiltered,
    SettingsApplied,
    Done,
    Aborted,
}

impl MigrationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Located => "located",
            Self::DataStaged => "data-staged",
            Self::DataFiltered => "data-filtered",
            Self::DataApplied => "data-applied",
            Self::SettingsStaged => "settings-staged",
            Self::SettingsFiltered => "settings-filtered",
            Self::SettingsApplied => "settings-applied",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Successor on the linear path. `Done` and `Aborted` are terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Located),
            Self::Located => Some(Self::DataStaged),
            Self::DataStaged => Some(Self::DataFiltered),
            Self::DataFiltered => Some(Self::DataApplied),
            Self::DataApplied => Some(Self::SettingsStaged),
            Self::SettingsStaged => Some(Self::SettingsFiltered),
            Self::SettingsFiltered => Some(Self::SettingsApplied),
            Self::SettingsApplied => Some(Self::Done),
            Self::Done | Self::Aborted => None,
        }
    }
}

/// Inputs supplied by the caller for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationRequest {
    pub share_root: PathBuf,
    pub user: String,
    pub include_settings: Option<PathBuf>,
    pub exclude_settings: Option<PathBuf>,
    pub include_data: Option<PathBuf>,
    pub exclude_data: Option<PathBuf>,
    /// Run even when the idempotency marker is present.
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MarkerPresent,
    AlreadyMigrated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub final_stage: MigrationStage,
    pub stages: Vec<MigrationStage>,
    pub skipped: Option<SkipReason>,
    pub descriptor: Option<ProfileDescriptor>,
    pub copy: CopySummary,
    pub settings: Option<ApplyOutcome>,
}

pub struct MigrationOrchestrator<'a> {
    layout: &'a MigrationLayout,
    config: &'a SiteConfig,
}

struct RunInputs {
    include_settings: Option<FilterList>,
    exclude_settings: Option<FilterList>,
    include_data: Option<FilterList>,
    exclude_data: Option<FilterList>,
}

struct StageTracker {
    visited: Vec<MigrationStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            visited: vec![MigrationStage::Start],
        }
    }

    fn current(&self) -> MigrationStage {
        self.visited
            .last()
            .copied()
            .unwrap_or(MigrationStage::Start)
    }

    fn advance(&mut self) {
        if let Some(next) = self.current().next() {
            info!(stage = next.as_str(), "migration stage reached");
            self.visited.push(next);
        }
    }

    fn finish(&mut self) {
        if self.current() != MigrationStage::Done {
            info!(stage = MigrationStage::Done.as_str(), "migration stage reached");
            self.visited.push(MigrationStage::Done);
        }
    }

    fn abort(&mut self) {
        self.visited.push(MigrationStage::Aborted);
    }
}

impl<'a> MigrationOrchestrator<'a> {
    pub fn new(layout: &'a MigrationLayout, config: &'a SiteConfig) -> Self {
        Self { layout, config }
    }

    pub fn run(&self, request: &MigrationRequest) -> Result<MigrationReport, MigrationError> {
        self.run_with_runner(request, run_command)
    }

    /// Runs every stage in order. The working directory is removed before
    /// this returns, whether the run finished or aborted.
    pub fn run_with_runner<RunCommand>(
        &self,
        request: &MigrationRequest,
        run_command: RunCommand,
    ) -> Result<MigrationReport, MigrationError>
    where
        RunCommand: FnMut(&mut Command, &str) -> anyhow::Result<()>,
    {
        validate_user(&request.user).inspect_err(|err| {
            error!(error_stage = err.stage().as_str(), "migration aborted: {err}");
        })?;

        let marker = self.layout.registry_import_path(&request.user);
        if marker.exists() && !request.force {
            info!(
                marker = %marker.display(),
                "import marker from a previous run found; skipping migration"
            );
            return Ok(MigrationReport {
                final_stage: MigrationStage::Done,
                stages: vec![MigrationStage::Done],
                skipped: Some(SkipReason::MarkerPresent),
                descriptor: None,
                copy: CopySummary::default(),
                settings: None,
            });
        }

        let inputs = load_inputs(request).inspect_err(|err| {
            error!(error_stage = err.stage().as_str(), "migration aborted: {err}");
        })?;

        let mut work_dir = WorkingDirectory::reserve(self.layout)
            .stage(ErrorStage::Staging)
            .inspect_err(|err| error!("migration aborted: {err}"))?;
        let mut tracker = StageTracker::new();
        let result = self.run_stages(request, &inputs, &mut work_dir, &mut tracker, run_command);
        work_dir.cleanup();

        match result {
            Ok(mut report) => {
                report.stages = tracker.visited;
                Ok(report)
            }
            Err(err) => {
                let failed_after = tracker.current();
                tracker.abort();
                error!(
                    stage = failed_after.as_str(),
                    error_stage = err.stage().as_str(),
                    "migration aborted: {err}"
                );
                Err(err)
            }
        }
    }

    fn run_stages<RunCommand>(
        &self,
        request: &MigrationRequest,
        inputs: &RunInputs,
        work_dir: &mut WorkingDirectory,
        tracker: &mut StageTracker,
        run_command: RunCommand,
    ) -> Result<MigrationReport, MigrationError>
    where
        RunCommand: FnMut(&mut Command, &str) -> anyhow::Result<()>,
    {
        let descriptor = locate_profile(
            &self.config.locator,
            &request.share_root,
            &request.user,
            work_dir,
        )?;
        tracker.advance();

        if descriptor.profile_type == ProfileType::AlreadyMigrated {
            tracker.finish();
            return Ok(MigrationReport {
                final_stage: MigrationStage::Done,
                stages: Vec::new(),
                skipped: Some(SkipReason::AlreadyMigrated),
                descriptor: Some(descriptor),
                copy: CopySummary::default(),
                settings: None,
            });
        }

        let (Some(data_root), Some(settings_source)) = (
            descriptor.data_source.clone(),
            descriptor.settings_source.clone(),
        ) else {
            return Err(MigrationError::Validation(format!(
                "{} profile is missing a settings or data source",
                descriptor.profile_type.as_str()
            )));
        };

        let listing = list_entries(&data_root).stage(ErrorStage::Staging)?;
        tracker.advance();

        let data_set = filter_data_set(
            &data_root,
            &listing,
            inputs.include_data.as_ref(),
            inputs.exclude_data.as_ref(),
        )
        .stage(ErrorStage::Filter)?;
        let descriptor = descriptor.with_data_set(data_set);
        tracker.advance();

        let entries = descriptor.data_set.as_deref().unwrap_or(&[]);
        let copy = copy_profile_data(&data_root, self.layout.profile_dir(), entries)
            .stage(ErrorStage::Apply)?;
        tracker.advance();

        let document = read_registry_export(&settings_source).stage(ErrorStage::Staging)?;
        tracker.advance();

        let rules = RegistryFilterRules {
            source_prefix: self.config.registry.source_prefix.clone(),
            target_prefix: self.config.registry.target_prefix.clone(),
            include: inputs.include_settings.clone(),
            exclude: inputs.exclude_settings.clone(),
        };
        let filtered = filter_registry_document(&document, &rules);
        let descriptor = descriptor.with_registry_document(filtered.clone());
        tracker.advance();

        let settings = apply_registry_document_with_runner(
            &filtered,
            &self.layout.registry_import_path(&request.user),
            &self.config.registry.importer,
            run_command,
        )
        .stage(ErrorStage::Apply)?;
        tracker.advance();
        tracker.finish();

        Ok(MigrationReport {
            final_stage: MigrationStage::Done,
            stages: Vec::new(),
            skipped: None,
            descriptor: Some(descriptor),
            copy,
            settings: Some(settings),
        })
    }
}

fn read_registry_export(path: &Path) -> anyhow::Result<RegistryDocument> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read settings {}", path.display()))?;
    let text = decode_text_bytes(&bytes)
        .with_context(|| format!("failed to decode settings {}", path.display()))?;
    Ok(RegistryDocument::parse(&text))
}

/// The identity names the marker file and the store directories, so it is
/// checked before either is looked at.
fn validate_user(user: &str) -> Result<(), MigrationError> {
    if user.trim().is_empty() {
        return Err(MigrationError::Validation(
            "user identity must not be empty".to_string(),
        ));
    }
    if user.contains(['/', '\\']) || user == ".." {
        return Err(MigrationError::Validation(format!(
            "user identity must not contain path separators: {user}"
        )));
    }
    Ok(())
}

/// Checks every caller-supplied path and reads the pattern sources before
/// anything touches the filesystem.
fn load_inputs(request: &MigrationRequest) -> Result<RunInputs, MigrationError> {
    if !request.share_root.is_dir() {
        return Err(MigrationError::Validation(format!(
            "share root is not a directory: {}",
            request.share_root.display()
        )));
    }

    Ok(RunInputs {
        include_settings: load_filter_list(
            "include-settings",
            request.include_settings.as_deref(),
        )?,
        exclude_settings: load_filter_list(
            "exclude-settings",
            request.exclude_settings.as_deref(),
        )?,
        include_data: load_filter_list("include-data", request.include_data.as_deref())?,
        exclude_data: load_filter_list("exclude-data", request.exclude_data.as_deref())?,
    })
}

fn load_filter_list(
    label: &str,
    path: Option<&Path>,
) -> Result<Option<FilterList>, MigrationError> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.is_file() {
        return Err(MigrationError::Validation(format!(
            "{label} pattern source does not exist: {}",
            path.display()
        )));
    }
    let list = FilterList::from_path(path).stage(ErrorStage::Filter)?;
    if list.is_empty() {
        warn!(source = label, path = %path.display(), "pattern source is empty");
    }
    Ok(Some(list))
}
