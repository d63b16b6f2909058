use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::registry_text::decode_text_bytes;

/// Ordered patterns, one per source line. Blank lines are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterList {
    patterns: Vec<String>,
}

impl FilterList {
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read pattern source {}", path.display()))?;
        let text = decode_text_bytes(&bytes)
            .with_context(|| format!("failed to decode pattern source {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

impl FromIterator<String> for FilterList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}
