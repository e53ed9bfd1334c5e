//! Loading of rules overrides from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use dengue_patrol_core::Rules;

/// Reads and validates a rules file. Fields missing from the file keep their defaults.
pub(crate) fn load(path: &Path) -> Result<Rules> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid rules file {}", path.display()))
}

/// Parses rules from TOML text and rejects unusable values.
pub(crate) fn parse(text: &str) -> Result<Rules> {
    let rules: Rules = toml::from_str(text).context("failed to parse rules")?;
    rules.validate()?;
    Ok(rules)
}
