use anyhow::{anyhow, Context, Result};
use roamport_core::{encode_registry_text, RegistryDocument};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Imported,
    /// The document held only the header; the importer was not invoked.
    NoSettings,
}

pub fn apply_registry_document(
    document: &RegistryDocument,
    import_path: &Path,
    importer: &str,
) -> Result<ApplyOutcome> {
    apply_registry_document_with_runner(document, import_path, importer, run_command)
}

/// Writes `document` to `import_path` in the `.reg` encoding and runs the
/// importer on it. A failed import removes the file again.
pub fn apply_registry_document_with_runner<RunCommand>(
    document: &RegistryDocument,
    import_path: &Path,
    importer: &str,
    mut run_command: RunCommand,
) -> Result<ApplyOutcome>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<()>,
{
    if let Some(parent) = import_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(import_path, encode_registry_text(&document.to_reg_text())).with_context(|| {
        format!("failed to write registry import file {}", import_path.display())
    })?;

    if !document.has_settings() {
        info!(stage = "apply", "no settings to import");
        return Ok(ApplyOutcome::NoSettings);
    }

    let mut command = build_import_command(importer, import_path);
    if let Err(err) = run_command(&mut command, "registry import failed") {
        if let Err(remove_err) = fs::remove_file(import_path) {
            warn!(
                stage = "apply",
                path = %import_path.display(),
                "failed to remove registry import file after a failed import: {remove_err}"
            );
        }
        return Err(err);
    }

    info!(
        stage = "apply",
        lines = document.body().len(),
        "imported registry settings"
    );
    Ok(ApplyOutcome::Imported)
}

pub(crate) fn build_import_command(importer: &str, import_path: &Path) -> Command {
    let mut command = Command::new(importer);
    command.arg("import").arg(import_path);
    command
}

/// Runs `command` to completion. A non-zero exit becomes an error carrying
/// the captured error stream.
pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(anyhow!(
        "{context_message}: status={} stderr='{}'",
        output.status,
        stderr.trim()
    ))
}
