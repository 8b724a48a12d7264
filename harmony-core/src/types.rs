//! Domain types for the Harmony registries.
//!
//! Identifiers are non-empty newtypes; enumerated fields are closed enums that
//! only come into existence through `FromStr` or serde, so an unknown status
//! string is rejected at construction instead of being stored.
//! Field names on the wire are camelCase (`assignedTo`, `createdAt`, ...) and
//! enum values are snake_case (`in_use`, `in_progress`, ...).

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HarmonyError;

/// Open-ended, string-keyed metadata attached to any entity.
pub type Metadata = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Builds an identifier, rejecting empty or whitespace-only input.
            pub fn new(id: impl Into<String>) -> Result<Self, HarmonyError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(HarmonyError::EmptyId { kind: $kind });
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = HarmonyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = HarmonyError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = HarmonyError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered agent.
    AgentId,
    "agent"
);
entity_id!(
    /// Identifier of an allocated resource.
    ResourceId,
    "resource"
);
entity_id!(
    /// Identifier of a task.
    TaskId,
    "task"
);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

macro_rules! closed_enum {
    (@join $first:literal $(, $rest:literal)*) => {
        concat!($first $(, ", ", $rest)*)
    };
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize,
            Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = HarmonyError;

            /// Case-insensitive; `-` is accepted in place of `_`.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(HarmonyError::InvalidValue {
                        field: $field,
                        value: s.to_owned(),
                        expected: closed_enum!(@join $($text),+),
                    }),
                }
            }
        }
    };
}

closed_enum!(
    /// Whether an agent is a person or an automated actor.
    AgentKind, "agent type" {
        #[default]
        Human => "human",
        Ai => "ai",
    }
);

closed_enum!(
    /// Availability of an agent.
    AgentStatus, "agent status" {
        #[default]
        Active => "active",
        Idle => "idle",
        Offline => "offline",
    }
);

closed_enum!(
    /// Allocation state of a resource.
    ResourceStatus, "resource status" {
        #[default]
        Available => "available",
        InUse => "in_use",
        Maintenance => "maintenance",
    }
);

closed_enum!(
    /// Progress of a task.
    TaskStatus, "task status" {
        #[default]
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
);

closed_enum!(
    /// Urgency of a task.
    TaskPriority, "task priority" {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A human or AI actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    #[serde(default)]
    pub status: AgentStatus,
    /// Set-like: duplicates are collapsed by [`Agent::with_capabilities`].
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Agent {
    /// A new agent, `active`, with no capabilities and no metadata.
    pub fn new(id: AgentId, name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            status: AgentStatus::default(),
            capabilities: Vec::new(),
            metadata: None,
        }
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    /// Replaces the capability list, keeping the first occurrence of each entry.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for cap in capabilities.into_iter().map(Into::into) {
            if !deduped.contains(&cap) {
                deduped.push(cap);
            }
        }
        self.capabilities = deduped;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// An allocatable asset. `owner` is a weak reference to an agent id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Free-form category, e.g. "forklift" or "scanner".
    #[serde(rename = "type")]
    pub kind: String,
    pub owner: AgentId,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Resource {
    /// A new `available` resource.
    pub fn new(
        id: ResourceId,
        name: impl Into<String>,
        kind: impl Into<String>,
        owner: AgentId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
            owner,
            status: ResourceStatus::default(),
            metadata: None,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A unit of work. `assigned_to` is a weak reference to an agent id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<AgentId>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Task {
    /// A new unassigned `pending` task with `medium` priority, stamped now.
    pub fn new(id: TaskId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            assigned_to: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            created_at: now,
            updated_at: now,
            metadata: None,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, agent: AgentId) -> Self {
        self.assigned_to = Some(agent);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Refreshes `updated_at`. Never moves it backwards, even if the wall
    /// clock does, and never leaves it before `created_at`.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at).max(self.created_at);
    }
}

// ---------------------------------------------------------------------------
// Metadata parsing
// ---------------------------------------------------------------------------

/// Parses a `key=value` metadata entry.
///
/// The value is read as JSON when it parses (`count=3`, `tags=["a"]`) and
/// kept as a plain string otherwise (`zone=north`).
pub fn parse_metadata_entry(entry: &str) -> Result<(String, Value), HarmonyError> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| HarmonyError::InvalidMetadata { entry: entry.to_owned() })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(HarmonyError::InvalidMetadata { entry: entry.to_owned() });
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}

/// Collects `key=value` entries into [`Metadata`]; `None` when there are none.
pub fn parse_metadata<'a, I>(entries: I) -> Result<Option<Metadata>, HarmonyError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut metadata = Metadata::new();
    for entry in entries {
        let (key, value) = parse_metadata_entry(entry)?;
        metadata.insert(key, value);
    }
    Ok((!metadata.is_empty()).then_some(metadata))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_display_and_borrow() {
        let id = AgentId::new("a1").expect("id");
        assert_eq!(id.to_string(), "a1");
        let as_str: &str = id.borrow();
        assert_eq!(as_str, "a1");
    }

    #[test]
    fn empty_ids_are_rejected() {
        let err = TaskId::new("   ").unwrap_err();
        assert!(matches!(err, HarmonyError::EmptyId { kind: "task" }));
        assert!("".parse::<ResourceId>().is_err());
    }

    #[test]
    fn empty_id_rejected_on_deserialize() {
        let result: Result<AgentId, _> = serde_json::from_value(json!(""));
        assert!(result.is_err());
    }

    #[test]
    fn enum_parse_is_lenient_on_case_and_dashes() {
        assert_eq!("IN-PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!(" in_use ".parse::<ResourceStatus>().unwrap(), ResourceStatus::InUse);
        assert_eq!("AI".parse::<AgentKind>().unwrap(), AgentKind::Ai);
    }

    #[test]
    fn unknown_enum_value_lists_expected_variants() {
        let err = "sleeping".parse::<AgentStatus>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sleeping"), "got: {msg}");
        assert!(msg.contains("active, idle, offline"), "got: {msg}");
    }

    #[test]
    fn enum_display_matches_wire_name() {
        for status in TaskStatus::ALL {
            let wire = serde_json::to_value(status).expect("serialize");
            assert_eq!(wire, json!(status.to_string()));
        }
    }

    #[test]
    fn unknown_status_rejected_on_deserialize() {
        let result: Result<TaskStatus, _> = serde_json::from_value(json!("done"));
        assert!(result.is_err());
    }

    #[test]
    fn capabilities_are_deduplicated() {
        let agent = Agent::new(AgentId::new("a1").unwrap(), "Ada", AgentKind::Human)
            .with_capabilities(["pack", "pick", "pack"]);
        assert_eq!(agent.capabilities, vec!["pack", "pick"]);
        assert!(agent.has_capability("pick"));
        assert!(!agent.has_capability("drive"));
    }

    #[test]
    fn new_task_timestamps_match() {
        let task = Task::new(TaskId::new("t1").unwrap(), "Pack order", "");
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn touch_never_moves_backwards() {
        let mut task = Task::new(TaskId::new("t1").unwrap(), "x", "");
        let future = Utc::now() + chrono::Duration::hours(1);
        task.updated_at = future;
        task.touch();
        assert_eq!(task.updated_at, future);
    }

    #[test]
    fn touch_catches_up_with_future_creation_time() {
        let mut task = Task::new(TaskId::new("t1").unwrap(), "x", "");
        let created = Utc::now() + chrono::Duration::days(365);
        task.created_at = created;
        task.touch();
        assert_eq!(task.updated_at, created);
    }

    #[test]
    fn metadata_entry_values() {
        assert_eq!(parse_metadata_entry("count=3").unwrap(), ("count".to_string(), json!(3)));
        assert_eq!(
            parse_metadata_entry("zone=north").unwrap(),
            ("zone".to_string(), json!("north"))
        );
        assert_eq!(parse_metadata_entry("note=a=b").unwrap(), ("note".to_string(), json!("a=b")));
        assert!(matches!(
            parse_metadata_entry("novalue"),
            Err(HarmonyError::InvalidMetadata { .. })
        ));
        assert!(parse_metadata_entry("=x").is_err());
    }

    #[test]
    fn no_metadata_entries_yields_none() {
        assert_eq!(parse_metadata(Vec::<&str>::new()).unwrap(), None);
        let meta = parse_metadata(["shift=night"]).unwrap().expect("some");
        assert_eq!(meta["shift"], json!("night"));
    }
}
