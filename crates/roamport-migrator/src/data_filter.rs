use anyhow::{Context, Result};
use roamport_core::{FileEntry, FilterList};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursive listing of `root`, relative to it, in file-name order. A missing
/// root lists as empty.
pub fn list_entries(root: &Path) -> Result<Vec<FileEntry>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("failed to relativize {}", entry.path().display()))?
            .to_path_buf();
        entries.push(FileEntry {
            relative_path,
            is_directory: entry.file_type().is_dir(),
        });
    }
    Ok(entries)
}

/// Leaf names (lowercased) of everything beneath each pattern's anchor. A file
/// anchor contributes its own name. Ancestry is discarded, so unrelated
/// entries that share a leaf name are indistinguishable.
pub fn name_set(root: &Path, patterns: &FilterList) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for pattern in patterns.iter() {
        let Some(anchor) = resolve_anchor(root, pattern) else {
            warn!(stage = "filter", pattern, "data pattern is not a relative path; skipped");
            continue;
        };
        if anchor.is_file() {
            names.extend(leaf_key(&anchor));
            continue;
        }
        if !anchor.is_dir() {
            warn!(
                stage = "filter",
                anchor = %anchor.display(),
                "data pattern does not exist; skipped"
            );
            continue;
        }
        for entry in WalkDir::new(&anchor).min_depth(1) {
            let entry = entry.with_context(|| format!("failed to list {}", anchor.display()))?;
            names.extend(leaf_key(entry.path()));
        }
    }
    Ok(names)
}

/// Listing entries whose leaf name is in the include name-set, minus those in
/// the exclude name-set. No include list selects nothing; the exclude list is
/// only consulted when an include list is present.
pub fn filter_data_set(
    root: &Path,
    listing: &[FileEntry],
    include: Option<&FilterList>,
    exclude: Option<&FilterList>,
) -> Result<Vec<FileEntry>> {
    let Some(include) = include else {
        warn!(stage = "filter", "no data include patterns; no files selected");
        return Ok(Vec::new());
    };

    let included = name_set(root, include)?;
    let excluded = match exclude {
        Some(exclude) => name_set(root, exclude)?,
        None => BTreeSet::new(),
    };

    let selected: Vec<FileEntry> = listing
        .iter()
        .filter(|entry| {
            let Some(name) = entry.leaf_name().map(str::to_lowercase) else {
                return false;
            };
            included.contains(&name) && !excluded.contains(&name)
        })
        .cloned()
        .collect();

    debug!(
        stage = "filter",
        listed = listing.len(),
        selected = selected.len(),
        "filtered data set"
    );
    Ok(selected)
}

fn resolve_anchor(root: &Path, pattern: &str) -> Option<PathBuf> {
    let mut anchor = root.to_path_buf();
    let mut pushed = false;
    for segment in pattern.split(['/', '\\']).filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => {
                anchor.push(part);
                pushed = true;
            }
            (Some(Component::CurDir), None) => {}
            _ => return None,
        }
    }
    pushed.then_some(anchor)
}

fn leaf_key(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_lowercase)
}
