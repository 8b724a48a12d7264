//! Harmony core library: keyed in-memory registries for agents, resources
//! and tasks.
//!
//! Public API surface:
//! - [`types`]: ids, closed enums, entity records
//! - [`filter`]: per-kind list filters
//! - [`registry`]: the generic [`Registry`] and its per-kind vocabulary
//! - [`harmony`]: the [`Harmony`] facade and checked cross-registry operations
//! - [`shared`]: [`SharedHarmony`], a thread-safe handle
//! - [`snapshot`]: opt-in YAML save / load
//! - [`error`]: [`HarmonyError`]

pub mod error;
pub mod filter;
pub mod harmony;
pub mod registry;
pub mod shared;
pub mod snapshot;
pub mod types;

pub use error::HarmonyError;
pub use filter::{AgentFilter, ResourceFilter, TaskFilter};
pub use harmony::{DanglingReference, Harmony, Summary};
pub use registry::{
    AgentRegistry, Entity, Registry, ResourceRegistry, StatusCount, TaskRegistry,
};
pub use shared::SharedHarmony;
pub use types::{
    Agent, AgentId, AgentKind, AgentStatus, Metadata, Resource, ResourceId, ResourceStatus, Task,
    TaskId, TaskPriority, TaskStatus,
};
