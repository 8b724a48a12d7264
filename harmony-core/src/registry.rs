//! Generic keyed in-memory registry.
//!
//! One container, [`Registry<E>`], serves every entity kind. The kind-specific
//! parts (id type, status type, filter shape) are associated types on
//! [`Entity`]. Per-kind vocabulary (`register`, `allocate`, `create`, `assign`,
//! ...) lives on inherent impls for the concrete instantiations.
//!
//! # Semantics
//!
//! - `insert` is last-write-wins: a second entity with the same id replaces
//!   the first entirely, with no merge and no error.
//! - Lookups of a missing id report `false` / `None`; nothing here returns
//!   an error.
//! - `list` materializes a fresh `Vec`; iteration order is unspecified.
//!
//! Access is through `&self` / `&mut self`; wrap the owner in
//! [`crate::SharedHarmony`] to share across threads.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;
use tracing::debug;

use crate::filter::{AgentFilter, ResourceFilter, TaskFilter};
use crate::types::{
    Agent, AgentId, AgentStatus, Resource, ResourceId, ResourceStatus, Task, TaskId, TaskStatus,
};

// ---------------------------------------------------------------------------
// 1. Entity trait
// ---------------------------------------------------------------------------

/// A record that can be stored in a [`Registry`].
pub trait Entity: Clone + fmt::Debug {
    type Id: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display;
    type Status: Copy + Eq + fmt::Display + 'static;
    type Filter: Default;

    /// Human-readable kind, used in logs.
    const KIND: &'static str;

    /// Every status value, in declaration order.
    const STATUSES: &'static [Self::Status];

    fn id(&self) -> &Self::Id;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    fn matches(&self, filter: &Self::Filter) -> bool;
}

impl Entity for Agent {
    type Id = AgentId;
    type Status = AgentStatus;
    type Filter = AgentFilter;

    const KIND: &'static str = "agent";
    const STATUSES: &'static [AgentStatus] = AgentStatus::ALL;

    fn id(&self) -> &AgentId {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
    }

    fn matches(&self, filter: &AgentFilter) -> bool {
        filter.matches(self)
    }
}

impl Entity for Resource {
    type Id = ResourceId;
    type Status = ResourceStatus;
    type Filter = ResourceFilter;

    const KIND: &'static str = "resource";
    const STATUSES: &'static [ResourceStatus] = ResourceStatus::ALL;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn status(&self) -> ResourceStatus {
        self.status
    }

    fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
    }

    fn matches(&self, filter: &ResourceFilter) -> bool {
        filter.matches(self)
    }
}

impl Entity for Task {
    type Id = TaskId;
    type Status = TaskStatus;
    type Filter = TaskFilter;

    const KIND: &'static str = "task";
    const STATUSES: &'static [TaskStatus] = TaskStatus::ALL;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    /// Also refreshes `updated_at`.
    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.touch();
    }

    fn matches(&self, filter: &TaskFilter) -> bool {
        filter.matches(self)
    }
}

// ---------------------------------------------------------------------------
// 2. Generic registry
// ---------------------------------------------------------------------------

/// Keyed store of one entity kind.
#[derive(Debug, Clone)]
pub struct Registry<E: Entity> {
    entries: HashMap<E::Id, E>,
}

/// Registry of agents.
pub type AgentRegistry = Registry<Agent>;
/// Registry of resources.
pub type ResourceRegistry = Registry<Resource>;
/// Registry of tasks.
pub type TaskRegistry = Registry<Task>;

impl<E: Entity> Default for Registry<E> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

/// Number of entities currently in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: usize,
}

impl<E: Entity> Registry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entity`, replacing any entity with the same id.
    pub fn insert(&mut self, entity: E) {
        let id = entity.id().clone();
        match self.entries.insert(id.clone(), entity) {
            Some(_) => debug!(kind = E::KIND, %id, "replaced"),
            None => debug!(kind = E::KIND, %id, "inserted"),
        }
    }

    /// Removes the entity with `id`. Returns whether anything was removed.
    pub fn remove<Q>(&mut self, id: &Q) -> bool
    where
        E::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.remove(id) {
            Some(removed) => {
                debug!(kind = E::KIND, id = %removed.id(), "removed");
                true
            }
            None => false,
        }
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&E>
    where
        E::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        E::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(id)
    }

    /// Clones every entity that matches `filter` (all of them for `None`).
    pub fn list(&self, filter: Option<&E::Filter>) -> Vec<E> {
        match filter {
            Some(filter) => self
                .entries
                .values()
                .filter(|e| e.matches(filter))
                .cloned()
                .collect(),
            None => self.entries.values().cloned().collect(),
        }
    }

    /// Overwrites the status of `id`. Returns `false` if `id` is absent.
    pub fn update_status<Q>(&mut self, id: &Q, status: E::Status) -> bool
    where
        E::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get_mut(id) {
            Some(entity) => {
                entity.set_status(status);
                debug!(kind = E::KIND, id = %entity.id(), %status, "status updated");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<E::Id> {
        let mut ids: Vec<E::Id> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    /// Entity counts per status, in status declaration order. Zero counts
    /// are included.
    pub fn status_counts(&self) -> Vec<StatusCount<E::Status>> {
        E::STATUSES
            .iter()
            .map(|&status| StatusCount {
                status,
                count: self.entries.values().filter(|e| e.status() == status).count(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// 3. Per-kind vocabulary
// ---------------------------------------------------------------------------

impl Registry<Agent> {
    pub fn register(&mut self, agent: Agent) {
        self.insert(agent);
    }

    pub fn unregister<Q>(&mut self, id: &Q) -> bool
    where
        AgentId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(id)
    }
}

impl Registry<Resource> {
    /// Stores `resource` without checking that its owner is registered.
    pub fn allocate(&mut self, resource: Resource) {
        self.insert(resource);
    }

    pub fn release<Q>(&mut self, id: &Q) -> bool
    where
        ResourceId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(id)
    }
}

impl Registry<Task> {
    pub fn create(&mut self, task: Task) {
        self.insert(task);
    }

    pub fn delete<Q>(&mut self, id: &Q) -> bool
    where
        TaskId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(id)
    }

    /// Sets the assignee of `task_id` and refreshes `updated_at`.
    ///
    /// `agent_id` is stored as a weak reference: nothing checks that the
    /// agent exists. Returns `false` if the task is absent.
    pub fn assign<Q>(&mut self, task_id: &Q, agent_id: AgentId) -> bool
    where
        TaskId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get_mut(task_id) {
            Some(task) => {
                debug!(kind = Task::KIND, id = %task.id, agent = %agent_id, "assigned");
                task.assigned_to = Some(agent_id);
                task.touch();
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
