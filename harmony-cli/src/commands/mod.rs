//! Subcommand implementations and the state file they share.

pub mod agent;
pub mod resource;
pub mod status;
pub mod task;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use harmony_core::{snapshot, Harmony};

/// A loaded snapshot plus the path it came from.
pub struct Workspace {
    path: PathBuf,
    pub harmony: Harmony,
}

impl Workspace {
    /// Loads `state` (or the default state path). A missing file is an empty
    /// workspace.
    pub fn open(state: Option<PathBuf>) -> Result<Self> {
        let path = match state {
            Some(path) => path,
            None => snapshot::state_path().context("failed to resolve default state path")?,
        };
        let harmony = snapshot::load_or_default_from(&path)
            .with_context(|| format!("failed to load state from '{}'", path.display()))?;
        Ok(Self { path, harmony })
    }

    pub fn save(&self) -> Result<()> {
        snapshot::save_to(&self.path, &self.harmony)
            .with_context(|| format!("failed to save state to '{}'", self.path.display()))
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON output")?
    );
    Ok(())
}

/// Formats optional metadata as `k=v, k=v` for table cells.
pub(crate) fn metadata_cell(metadata: Option<&harmony_core::Metadata>) -> String {
    match metadata {
        Some(map) if !map.is_empty() => map
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

pub(crate) fn parse_meta(entries: &[String]) -> Result<Option<harmony_core::Metadata>> {
    harmony_core::types::parse_metadata(entries.iter().map(String::as_str))
        .context("invalid --meta entry")
}
