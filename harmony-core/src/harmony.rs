//! The `Harmony` facade: one registry per entity kind.
//!
//! Construction is explicit; there is no process-wide instance. Callers build
//! a `Harmony` and pass it where it is needed.
//!
//! The registries store `Task.assigned_to` and `Resource.owner` as weak
//! references and never validate them. The facade adds opt-in checked
//! operations ([`Harmony::assign_task`], [`Harmony::allocate_resource`]) and
//! a report of existing broken references ([`Harmony::dangling_references`]).

use serde::Serialize;

use crate::error::HarmonyError;
use crate::registry::{AgentRegistry, ResourceRegistry, StatusCount, TaskRegistry};
use crate::types::{AgentId, AgentStatus, Resource, ResourceId, ResourceStatus, TaskId, TaskStatus};

/// Owns exactly one registry of each kind.
#[derive(Debug, Clone, Default)]
pub struct Harmony {
    pub agents: AgentRegistry,
    pub resources: ResourceRegistry,
    pub tasks: TaskRegistry,
}

/// A stored reference to an agent id that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DanglingReference {
    ResourceOwner { resource: ResourceId, owner: AgentId },
    TaskAssignee { task: TaskId, agent: AgentId },
}

/// Per-status counts across all three registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub agents: Vec<StatusCount<AgentStatus>>,
    pub resources: Vec<StatusCount<ResourceStatus>>,
    pub tasks: Vec<StatusCount<TaskStatus>>,
}

impl Harmony {
    /// Three empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `task_id` to `agent_id`, requiring both to exist.
    ///
    /// Unlike [`TaskRegistry::assign`], a missing task or an unregistered
    /// agent is an error.
    pub fn assign_task(&mut self, task_id: &str, agent_id: &AgentId) -> Result<(), HarmonyError> {
        if !self.tasks.contains(task_id) {
            return Err(HarmonyError::TaskNotFound { id: task_id.to_owned() });
        }
        if !self.agents.contains(agent_id) {
            return Err(HarmonyError::AgentNotFound { id: agent_id.to_string() });
        }
        self.tasks.assign(task_id, agent_id.clone());
        Ok(())
    }

    /// Allocates `resource`, requiring its owner to be registered.
    pub fn allocate_resource(&mut self, resource: Resource) -> Result<(), HarmonyError> {
        if !self.agents.contains(&resource.owner) {
            return Err(HarmonyError::AgentNotFound { id: resource.owner.to_string() });
        }
        self.resources.allocate(resource);
        Ok(())
    }

    /// Every resource owner and task assignee that names an unregistered
    /// agent. Sorted.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let owners = self
            .resources
            .iter()
            .filter(|r| !self.agents.contains(&r.owner))
            .map(|r| DanglingReference::ResourceOwner {
                resource: r.id.clone(),
                owner: r.owner.clone(),
            });
        let assignees = self.tasks.iter().filter_map(|t| {
            let agent = t.assigned_to.as_ref()?;
            (!self.agents.contains(agent)).then(|| DanglingReference::TaskAssignee {
                task: t.id.clone(),
                agent: agent.clone(),
            })
        });
        let mut dangling: Vec<DanglingReference> = owners.chain(assignees).collect();
        dangling.sort();
        dangling
    }

    pub fn summary(&self) -> Summary {
        Summary {
            agents: self.agents.status_counts(),
            resources: self.resources.status_counts(),
            tasks: self.tasks.status_counts(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.resources.is_empty() && self.tasks.is_empty()
    }
}
