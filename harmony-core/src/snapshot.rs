//! Opt-in YAML snapshots of a whole [`Harmony`].
//!
//! The registries are in-memory only; nothing is persisted unless a caller
//! saves a snapshot explicitly.
//!
//! # Storage layout
//!
//! ```text
//! ~/.harmony/
//!   state.yaml      (mode 0600; directory mode 0700)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - [`state_path`]: derives home from `dirs::home_dir()`
//! - `load_from` / `save_to` take the snapshot path itself (CLI `--state`)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::HarmonyError;
use crate::harmony::Harmony;
use crate::types::{Agent, Resource, Task};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk document. Entity lists are sorted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Captures the current contents of `harmony`.
    pub fn capture(harmony: &Harmony) -> Self {
        let mut agents = harmony.agents.list(None);
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        let mut resources = harmony.resources.list(None);
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        let mut tasks = harmony.tasks.list(None);
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            agents,
            resources,
            tasks,
        }
    }

    /// Rebuilds a `Harmony`. Duplicate ids resolve last-write-wins.
    ///
    /// Agent capabilities are collapsed the same way [`Agent::with_capabilities`]
    /// does. A task whose `updatedAt` precedes its `createdAt` is rejected with
    /// `HarmonyError::InvalidTimestamps`.
    pub fn restore(self) -> Result<Harmony, HarmonyError> {
        let mut harmony = Harmony::new();
        for mut agent in self.agents {
            let capabilities = std::mem::take(&mut agent.capabilities);
            harmony.agents.register(agent.with_capabilities(capabilities));
        }
        for resource in self.resources {
            harmony.resources.allocate(resource);
        }
        for task in self.tasks {
            if task.updated_at < task.created_at {
                return Err(HarmonyError::InvalidTimestamps { id: task.id.to_string() });
            }
            harmony.tasks.create(task);
        }
        Ok(harmony)
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.harmony/state.yaml`: pure, no I/O.
pub fn state_path_at(home: &Path) -> PathBuf {
    home.join(".harmony").join("state.yaml")
}

/// `state_path_at` convenience wrapper.
pub fn state_path() -> Result<PathBuf, HarmonyError> {
    Ok(state_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Loads the snapshot at `path`.
///
/// Returns `HarmonyError::SnapshotNotFound` if absent,
/// `HarmonyError::Parse` (with path + line context) if malformed, and
/// `HarmonyError::UnsupportedVersion` for any version but
/// [`SNAPSHOT_VERSION`].
pub fn load_from(path: &Path) -> Result<Harmony, HarmonyError> {
    if !path.exists() {
        return Err(HarmonyError::SnapshotNotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_yaml::from_str(&contents)
        .map_err(|e| HarmonyError::Parse { path: path.to_path_buf(), source: e })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(HarmonyError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    info!(
        path = %path.display(),
        agents = snapshot.agents.len(),
        resources = snapshot.resources.len(),
        tasks = snapshot.tasks.len(),
        "snapshot loaded"
    );
    snapshot.restore()
}

/// Like [`load_from`], but a missing file yields an empty `Harmony`.
pub fn load_or_default_from(path: &Path) -> Result<Harmony, HarmonyError> {
    match load_from(path) {
        Err(HarmonyError::SnapshotNotFound { .. }) => Ok(Harmony::new()),
        other => other,
    }
}

/// `load_from(state_path_at(home))`.
pub fn load_at(home: &Path) -> Result<Harmony, HarmonyError> {
    load_from(&state_path_at(home))
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically writes `harmony` to `path`.
///
/// Write flow: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
/// The parent directory is created (mode `0700`) if missing.
pub fn save_to(path: &Path, harmony: &Harmony) -> Result<(), HarmonyError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }
    let snapshot = Snapshot::capture(harmony);
    let yaml = serde_yaml::to_string(&snapshot)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    info!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// `save_to(state_path_at(home), …)`.
pub fn save_at(home: &Path, harmony: &Harmony) -> Result<(), HarmonyError> {
    save_to(&state_path_at(home), harmony)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, HarmonyError> {
    dirs::home_dir().ok_or(HarmonyError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), HarmonyError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), HarmonyError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), HarmonyError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), HarmonyError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
