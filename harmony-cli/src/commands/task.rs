//! `harmony task create|list|show|set-status|assign|delete`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use harmony_core::{AgentId, Task, TaskFilter, TaskId, TaskPriority, TaskStatus};

use super::{parse_meta, print_json, Workspace};

/// Manage tasks.
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a pending task. Replaces any task with the same id.
    Create(CreateArgs),

    /// List tasks, optionally filtered.
    List(ListArgs),

    /// Show a single task.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Change a task's status: pending | in_progress | completed | failed.
    SetStatus { id: String, status: TaskStatus },

    /// Assign a task to an agent.
    Assign {
        task: String,
        agent: AgentId,
        /// Skip the check that the agent is registered.
        #[arg(long)]
        unchecked: bool,
    },

    /// Delete a task.
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub id: TaskId,

    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// low | medium | high | urgent. Defaults to medium.
    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub assigned_to: Option<AgentId>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "priority")]
    priority: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "assigned to")]
    assigned_to: String,
    #[tabled(rename = "updated")]
    updated: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            priority: task.priority.to_string(),
            status: task.status.to_string(),
            assigned_to: task
                .assigned_to
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            updated: task.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub fn run(state: Option<PathBuf>, cmd: TaskCommand) -> Result<()> {
    let mut ws = Workspace::open(state)?;
    match cmd {
        TaskCommand::Create(args) => create(&mut ws, args),
        TaskCommand::List(args) => list(&ws, args),
        TaskCommand::Show { id, json } => show(&ws, &id, json),
        TaskCommand::SetStatus { id, status } => {
            if !ws.harmony.tasks.update_status(id.as_str(), status) {
                bail!("task '{id}' does not exist");
            }
            ws.save()?;
            println!("✓ Task '{id}' is now {status}");
            Ok(())
        }
        TaskCommand::Assign { task, agent, unchecked } => assign(&mut ws, &task, agent, unchecked),
        TaskCommand::Delete { id } => {
            if !ws.harmony.tasks.delete(id.as_str()) {
                bail!("task '{id}' does not exist");
            }
            ws.save()?;
            println!("✓ Deleted task '{id}'");
            Ok(())
        }
    }
}

fn create(ws: &mut Workspace, args: CreateArgs) -> Result<()> {
    let mut task = Task::new(args.id, args.title, args.description)
        .with_priority(args.priority.unwrap_or_default());
    task.metadata = parse_meta(&args.meta)?;
    let id = task.id.clone();
    ws.harmony.tasks.create(task);
    ws.save()?;
    println!("✓ Created task '{id}'");
    Ok(())
}

fn assign(ws: &mut Workspace, task: &str, agent: AgentId, unchecked: bool) -> Result<()> {
    if unchecked {
        if !ws.harmony.tasks.assign(task, agent.clone()) {
            bail!("task '{task}' does not exist");
        }
    } else {
        ws.harmony
            .assign_task(task, &agent)
            .with_context(|| format!("cannot assign '{task}' to '{agent}'"))?;
    }
    ws.save()?;
    println!("✓ Assigned task '{task}' to '{agent}'");
    Ok(())
}

fn list(ws: &Workspace, args: ListArgs) -> Result<()> {
    let filter = TaskFilter {
        assigned_to: args.assigned_to,
        status: args.status,
        priority: args.priority,
    };
    let mut tasks = ws.harmony.tasks.list(Some(&filter));
    tasks.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No tasks match.");
        return Ok(());
    }
    let mut table = Table::new(tasks.iter().map(TaskRow::from));
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(ws: &Workspace, id: &str, json: bool) -> Result<()> {
    let Some(task) = ws.harmony.tasks.get(id) else {
        bail!("task '{id}' does not exist");
    };
    if json {
        return print_json(task);
    }
    println!("{} {}", task.id, task.title);
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
    let mut table = Table::new([TaskRow::from(task)]);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
