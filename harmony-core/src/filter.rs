//! Per-kind list filters.
//!
//! Every field is an equality predicate; unset fields match everything and
//! set fields are AND-combined. `Default` is the match-all filter.

use crate::types::{
    Agent, AgentId, AgentKind, AgentStatus, Resource, ResourceStatus, Task, TaskPriority,
    TaskStatus,
};

/// Narrows agents by type and status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    pub kind: Option<AgentKind>,
    pub status: Option<AgentStatus>,
}

impl AgentFilter {
    pub fn kind(mut self, kind: AgentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn status(mut self, status: AgentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        self.kind.map_or(true, |k| agent.kind == k)
            && self.status.map_or(true, |s| agent.status == s)
    }
}

/// Narrows resources by type, status and owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub kind: Option<String>,
    pub status: Option<ResourceStatus>,
    pub owner: Option<AgentId>,
}

impl ResourceFilter {
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn status(mut self, status: ResourceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn owner(mut self, owner: AgentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.kind.as_ref().map_or(true, |k| &resource.kind == k)
            && self.status.map_or(true, |s| resource.status == s)
            && self.owner.as_ref().map_or(true, |o| &resource.owner == o)
    }
}

/// Narrows tasks by assignee, status and priority.
///
/// An `assigned_to` predicate never matches an unassigned task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assigned_to: Option<AgentId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn assigned_to(mut self, agent: AgentId) -> Self {
        self.assigned_to = Some(agent);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.assigned_to
            .as_ref()
            .map_or(true, |a| task.assigned_to.as_ref() == Some(a))
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentId, ResourceId, TaskId};

    fn agent_id(s: &str) -> AgentId {
        AgentId::new(s).expect("agent id")
    }

    #[test]
    fn default_filters_match_everything() {
        let agent = Agent::new(agent_id("a1"), "Ada", AgentKind::Ai);
        let resource =
            Resource::new(ResourceId::new("r1").unwrap(), "Scanner", "scanner", agent_id("a1"));
        let task = Task::new(TaskId::new("t1").unwrap(), "Pack", "");
        assert!(AgentFilter::default().matches(&agent));
        assert!(ResourceFilter::default().matches(&resource));
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn agent_filter_requires_all_predicates() {
        let agent =
            Agent::new(agent_id("a1"), "Ada", AgentKind::Human).with_status(AgentStatus::Idle);
        assert!(AgentFilter::default().kind(AgentKind::Human).matches(&agent));
        assert!(!AgentFilter::default()
            .kind(AgentKind::Human)
            .status(AgentStatus::Active)
            .matches(&agent));
    }

    #[test]
    fn resource_kind_is_exact_match() {
        let resource =
            Resource::new(ResourceId::new("r1").unwrap(), "Forklift", "forklift", agent_id("a1"));
        assert!(ResourceFilter::default().kind("forklift").matches(&resource));
        assert!(!ResourceFilter::default().kind("Forklift").matches(&resource));
        assert!(!ResourceFilter::default().owner(agent_id("a2")).matches(&resource));
    }

    #[test]
    fn assignee_filter_skips_unassigned_tasks() {
        let task = Task::new(TaskId::new("t1").unwrap(), "Pack", "");
        assert!(!TaskFilter::default().assigned_to(agent_id("a1")).matches(&task));
        let task = task.with_assignee(agent_id("a1"));
        assert!(TaskFilter::default().assigned_to(agent_id("a1")).matches(&task));
    }
}
