//! `harmony agent register|list|show|set-status|unregister`

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use harmony_core::{Agent, AgentFilter, AgentId, AgentKind, AgentStatus};

use super::{metadata_cell, parse_meta, print_json, Workspace};

/// Manage agents.
#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// Register an agent. Replaces any agent with the same id.
    Register(RegisterArgs),

    /// List agents, optionally filtered.
    List(ListArgs),

    /// Show a single agent.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Change an agent's status: active | idle | offline.
    SetStatus { id: String, status: AgentStatus },

    /// Remove an agent. Resources and tasks that reference it are kept.
    Unregister { id: String },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub id: AgentId,

    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Agent type: human | ai.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: AgentKind,

    /// Initial status: active | idle | offline. Defaults to active.
    #[arg(long)]
    pub status: Option<AgentStatus>,

    /// Capability tag; repeat for several.
    #[arg(long = "capability", short = 'c', value_name = "CAPABILITY")]
    pub capabilities: Vec<String>,

    /// Metadata entry; repeat for several. Values that parse as JSON are kept
    /// as JSON.
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: Option<AgentKind>,

    #[arg(long)]
    pub status: Option<AgentStatus>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "type")]
    kind: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "capabilities")]
    capabilities: String,
    #[tabled(rename = "metadata")]
    metadata: String,
}

impl From<&Agent> for AgentRow {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.to_string(),
            name: agent.name.clone(),
            kind: agent.kind.to_string(),
            status: agent.status.to_string(),
            capabilities: if agent.capabilities.is_empty() {
                "-".to_string()
            } else {
                agent.capabilities.join(", ")
            },
            metadata: metadata_cell(agent.metadata.as_ref()),
        }
    }
}

pub fn run(state: Option<PathBuf>, cmd: AgentCommand) -> Result<()> {
    let mut ws = Workspace::open(state)?;
    match cmd {
        AgentCommand::Register(args) => register(&mut ws, args),
        AgentCommand::List(args) => list(&ws, args),
        AgentCommand::Show { id, json } => show(&ws, &id, json),
        AgentCommand::SetStatus { id, status } => {
            if !ws.harmony.agents.update_status(id.as_str(), status) {
                bail!("agent '{id}' is not registered");
            }
            ws.save()?;
            println!("✓ Agent '{id}' is now {status}");
            Ok(())
        }
        AgentCommand::Unregister { id } => {
            if !ws.harmony.agents.unregister(id.as_str()) {
                bail!("agent '{id}' is not registered");
            }
            ws.save()?;
            println!("✓ Unregistered agent '{id}'");
            Ok(())
        }
    }
}

fn register(ws: &mut Workspace, args: RegisterArgs) -> Result<()> {
    let mut agent = Agent::new(args.id, args.name, args.kind)
        .with_status(args.status.unwrap_or_default())
        .with_capabilities(args.capabilities);
    agent.metadata = parse_meta(&args.meta)?;

    let replaced = ws.harmony.agents.contains(&agent.id);
    let id = agent.id.clone();
    ws.harmony.agents.register(agent);
    ws.save()?;

    if replaced {
        println!("✓ Replaced agent '{id}'");
    } else {
        println!("✓ Registered agent '{id}'");
    }
    Ok(())
}

fn list(ws: &Workspace, args: ListArgs) -> Result<()> {
    let filter = AgentFilter { kind: args.kind, status: args.status };
    let mut agents = ws.harmony.agents.list(Some(&filter));
    agents.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        return print_json(&agents);
    }
    if agents.is_empty() {
        println!("No agents match.");
        return Ok(());
    }
    let mut table = Table::new(agents.iter().map(AgentRow::from));
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(ws: &Workspace, id: &str, json: bool) -> Result<()> {
    let Some(agent) = ws.harmony.agents.get(id) else {
        bail!("agent '{id}' is not registered");
    };
    if json {
        return print_json(agent);
    }
    let mut table = Table::new([AgentRow::from(agent)]);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
