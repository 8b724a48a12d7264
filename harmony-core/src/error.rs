//! Error types for harmony-core.
//!
//! Registry lookups never fail; a missing id is reported as `false` / `None`.
//! Everything around the registries (parsing, checked facade operations,
//! snapshot I/O, the shared handle) reports through [`HarmonyError`].

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise outside the plain registry operations.
#[derive(Debug, Error)]
pub enum HarmonyError {
    /// A string did not name a variant of a closed enum field.
    #[error("invalid {field} '{value}'; expected one of: {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Identifiers must be non-empty.
    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },

    /// A metadata entry was not of the form `key=value`.
    #[error("invalid metadata entry '{entry}'; expected key=value")]
    InvalidMetadata { entry: String },

    /// Checked operation referenced an agent that is not registered.
    #[error("agent '{id}' is not registered")]
    AgentNotFound { id: String },

    /// Checked operation referenced a task that does not exist.
    #[error("task '{id}' does not exist")]
    TaskNotFound { id: String },

    /// A stored task claims it was updated before it was created.
    #[error("task '{id}' has updatedAt earlier than createdAt")]
    InvalidTimestamps { id: String },

    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The snapshot file did not exist at the expected path.
    #[error("snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {found} at {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.harmony/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A writer panicked while holding the shared registry lock.
    #[error("shared registry lock poisoned by a panicked writer")]
    LockPoisoned,
}
