use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const USER_PLACEHOLDER: &str = "{user}";

/// Deployment-specific settings supplied from outside the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub locator: LocatorConfig,
    pub registry: RegistryConfig,
}

/// Where the legacy stores live, relative to the share root.
/// `{user}` in a root template is replaced with the migrating identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocatorConfig {
    pub managed_root: String,
    pub archived_root: String,
    pub managed_settings_file: String,
    pub managed_data_dir: String,
    pub archive_names: ArchiveNames,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchiveNames {
    pub settings: String,
    pub data: String,
    /// Registry export expected inside the extracted settings archive.
    pub settings_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Key prefix written by the export tool, rewritten to `target_prefix`.
    pub source_prefix: String,
    pub target_prefix: String,
    pub importer: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            managed_root: "profiles/{user}".to_string(),
            archived_root: "archive/{user}".to_string(),
            managed_settings_file: "settings.reg".to_string(),
            managed_data_dir: "data".to_string(),
            archive_names: ArchiveNames::default(),
        }
    }
}

impl Default for ArchiveNames {
    fn default() -> Self {
        Self {
            settings: "settings.zip".to_string(),
            data: "data.zip".to_string(),
            settings_file: "settings.reg".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            source_prefix: "HKEY_USERS\\RoamportHive".to_string(),
            target_prefix: "HKEY_CURRENT_USER".to_string(),
            importer: "reg".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse site config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise returns the built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read site config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid site config {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let locator = &self.locator;
        for (field, template) in [
            ("locator.managed_root", &locator.managed_root),
            ("locator.archived_root", &locator.archived_root),
        ] {
            validate_relative_template(field, template)?;
        }
        for (field, value) in [
            ("locator.managed_settings_file", &locator.managed_settings_file),
            ("locator.managed_data_dir", &locator.managed_data_dir),
            ("locator.archive_names.settings", &locator.archive_names.settings),
            ("locator.archive_names.data", &locator.archive_names.data),
            (
                "locator.archive_names.settings_file",
                &locator.archive_names.settings_file,
            ),
            ("registry.target_prefix", &self.registry.target_prefix),
            ("registry.importer", &self.registry.importer),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must not be empty"));
            }
        }
        Ok(())
    }
}

impl LocatorConfig {
    pub fn managed_store(&self, share_root: &Path, user: &str) -> PathBuf {
        expand_template(share_root, &self.managed_root, user)
    }

    pub fn archived_store(&self, share_root: &Path, user: &str) -> PathBuf {
        expand_template(share_root, &self.archived_root, user)
    }
}

fn expand_template(share_root: &Path, template: &str, user: &str) -> PathBuf {
    let expanded = template.replace(USER_PLACEHOLDER, user);
    let mut path = share_root.to_path_buf();
    for segment in expanded.split(['/', '\\']).filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

fn validate_relative_template(field: &str, template: &str) -> anyhow::Result<()> {
    if template.trim().is_empty() {
        return Err(anyhow!("{field} must not be empty"));
    }
    let normalized = template.replace('\\', "/");
    let path = Path::new(&normalized);
    for component in path.components() {
        if !matches!(component, Component::Normal(_) | Component::CurDir) {
            return Err(anyhow!(
                "{field} must be a relative path under the share root: {template}"
            ));
        }
    }
    Ok(())
}
