use roamport_core::{FilterList, RegistryDocument};
use tracing::{debug, warn};

/// Everything the settings transform needs, gathered before the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFilterRules {
    pub source_prefix: String,
    pub target_prefix: String,
    pub include: Option<FilterList>,
    pub exclude: Option<FilterList>,
}

/// Prefix rewrite, then include gating, then exclude gating.
pub fn filter_registry_document(
    document: &RegistryDocument,
    rules: &RegistryFilterRules,
) -> RegistryDocument {
    let rewritten = rewrite_prefix(document, &rules.source_prefix, &rules.target_prefix);
    let included = match &rules.include {
        Some(include) => include_keys(&rewritten, include),
        None => include_keys(&rewritten, &FilterList::default()),
    };
    match &rules.exclude {
        Some(exclude) => exclude_keys(&included, exclude),
        None => included,
    }
}

pub fn rewrite_prefix(
    document: &RegistryDocument,
    source_prefix: &str,
    target_prefix: &str,
) -> RegistryDocument {
    if source_prefix.is_empty() {
        return document.clone();
    }
    RegistryDocument::from_body(
        document
            .body()
            .iter()
            .map(|line| line.replace(source_prefix, target_prefix)),
    )
}

/// Keeps only key blocks matching one of `patterns`. Inclusion is opt-in: an
/// empty list leaves nothing but the header.
pub fn include_keys(document: &RegistryDocument, patterns: &FilterList) -> RegistryDocument {
    if patterns.is_empty() {
        warn!(
            stage = "filter",
            "no settings include patterns; every registry key is dropped"
        );
    }
    let body = gate_key_blocks(document.body(), true, |key| !matches_any(key, patterns));
    debug!(stage = "filter", kept = body.len(), "applied settings include patterns");
    RegistryDocument::from_body(body)
}

/// Drops key blocks matching one of `patterns`. An empty list is a no-op.
pub fn exclude_keys(document: &RegistryDocument, patterns: &FilterList) -> RegistryDocument {
    if patterns.is_empty() {
        return document.clone();
    }
    let body = gate_key_blocks(document.body(), false, |key| matches_any(key, patterns));
    debug!(stage = "filter", kept = body.len(), "applied settings exclude patterns");
    RegistryDocument::from_body(body)
}

/// Single pass carrying the deleting flag alongside each line. The flag only
/// changes on `[` lines; value lines inherit it from their key.
fn gate_key_blocks(
    body: &[String],
    initially_deleting: bool,
    deletes_key: impl Fn(&str) -> bool,
) -> Vec<String> {
    body.iter()
        .scan(initially_deleting, |deleting, line| {
            if let Some(key) = key_path(line) {
                *deleting = deletes_key(key);
            }
            Some((*deleting, line))
        })
        .filter(|(deleting, _)| !deleting)
        .map(|(_, line)| line.clone())
        .collect()
}

/// Key path of a `[` line, with the deletion marker and brackets removed.
fn key_path(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    let inner = inner.strip_prefix('-').unwrap_or(inner).trim_end();
    Some(inner.strip_suffix(']').unwrap_or(inner))
}

fn matches_any(key: &str, patterns: &FilterList) -> bool {
    patterns.iter().any(|pattern| key_matches(key, pattern))
}

/// A pattern names a key below the hive (`\Software\X`) or a full key path
/// (`HKEY_CURRENT_USER\Software\X`). It matches that key and its subkeys,
/// ignoring case. Neither the bare hive key nor a hive-only pattern matches.
pub(crate) fn key_matches(key: &str, pattern: &str) -> bool {
    let Some((_, below_hive)) = key.split_once('\\') else {
        return false;
    };
    let pattern = pattern.trim().trim_end_matches('\\').to_ascii_lowercase();
    if pattern.trim_start_matches('\\').is_empty() {
        return false;
    }
    if pattern.starts_with("hkey_") && !pattern.contains('\\') {
        return false;
    }

    let candidate = if pattern.starts_with("hkey_") {
        key.to_ascii_lowercase()
    } else {
        format!("\\{}", below_hive.to_ascii_lowercase())
    };
    let pattern = if pattern.starts_with("hkey_") || pattern.starts_with('\\') {
        pattern
    } else {
        format!("\\{pattern}")
    };

    candidate == pattern
        || candidate
            .strip_prefix(pattern.as_str())
            .is_some_and(|rest| rest.starts_with('\\'))
}

