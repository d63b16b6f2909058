use std::path::{Path, PathBuf};

use serde::Serialize;

pub const REGISTRY_HEADER: &str = "Windows Registry Editor Version 5.00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Managed,
    Archived,
    AlreadyMigrated,
}

impl ProfileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Archived => "archived",
            Self::AlreadyMigrated => "already-migrated",
        }
    }
}

/// One entry of a recursive listing, relative to the listing root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileEntry {
    pub relative_path: PathBuf,
    pub is_directory: bool,
}

impl FileEntry {
    pub fn file(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_directory: false,
        }
    }

    pub fn directory(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_directory: true,
        }
    }

    /// Leaf name used for name-set membership.
    pub fn leaf_name(&self) -> Option<&str> {
        self.relative_path.file_name().and_then(|name| name.to_str())
    }
}

/// Ordered registry export lines. The first line is always [`REGISTRY_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistryDocument {
    lines: Vec<String>,
}

impl RegistryDocument {
    pub fn header_only() -> Self {
        Self {
            lines: vec![REGISTRY_HEADER.to_string()],
        }
    }

    /// Builds a document from raw export text. Leading blank lines and an
    /// existing header are dropped before the canonical header is prepended.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));
        let mut body = Vec::new();
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim() != REGISTRY_HEADER {
                body.push(line.to_string());
            }
            break;
        }
        body.extend(lines.map(str::to_string));
        Self::from_body(body)
    }

    /// Builds a document from the lines that follow the header.
    pub fn from_body(body: impl IntoIterator<Item = String>) -> Self {
        let mut document = Self::header_only();
        document.lines.extend(body);
        document
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn body(&self) -> &[String] {
        &self.lines[1..]
    }

    /// False when nothing but the header (and blank lines) remains.
    pub fn has_settings(&self) -> bool {
        self.body().iter().any(|line| !line.trim().is_empty())
    }

    /// CRLF-joined text with a trailing line break, as the importer expects.
    pub fn to_reg_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out
    }
}

/// The value built by the locator and extended by each later stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDescriptor {
    pub profile_type: ProfileType,
    pub settings_source: Option<PathBuf>,
    pub data_source: Option<PathBuf>,
    pub registry_document: Option<RegistryDocument>,
    pub data_set: Option<Vec<FileEntry>>,
}

impl ProfileDescriptor {
    pub fn new(profile_type: ProfileType, settings_source: &Path, data_source: &Path) -> Self {
        Self {
            profile_type,
            settings_source: Some(settings_source.to_path_buf()),
            data_source: Some(data_source.to_path_buf()),
            registry_document: None,
            data_set: None,
        }
    }

    pub fn already_migrated() -> Self {
        Self {
            profile_type: ProfileType::AlreadyMigrated,
            settings_source: None,
            data_source: None,
            registry_document: None,
            data_set: None,
        }
    }

    pub fn with_data_set(self, data_set: Vec<FileEntry>) -> Self {
        Self {
            data_set: Some(data_set),
            ..self
        }
    }

    pub fn with_registry_document(self, document: RegistryDocument) -> Self {
        Self {
            registry_document: Some(document),
            ..self
        }
    }
}
