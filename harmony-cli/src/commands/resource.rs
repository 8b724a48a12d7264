//! `harmony resource allocate|list|show|set-status|release`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use harmony_core::{AgentId, Resource, ResourceFilter, ResourceId, ResourceStatus};

use super::{metadata_cell, parse_meta, print_json, Workspace};

/// Manage resources.
#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// Allocate a resource to an owning agent. Replaces any resource with the
    /// same id.
    Allocate(AllocateArgs),

    /// List resources, optionally filtered.
    List(ListArgs),

    /// Show a single resource.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Change a resource's status: available | in_use | maintenance.
    SetStatus { id: String, status: ResourceStatus },

    /// Remove a resource.
    Release { id: String },
}

#[derive(Args, Debug)]
pub struct AllocateArgs {
    pub id: ResourceId,

    #[arg(long)]
    pub name: String,

    /// Free-form category, e.g. forklift or scanner.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: String,

    /// Owning agent id.
    #[arg(long)]
    pub owner: AgentId,

    /// Initial status. Defaults to available.
    #[arg(long)]
    pub status: Option<ResourceStatus>,

    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Skip the check that the owner is a registered agent.
    #[arg(long)]
    pub unchecked: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: Option<String>,

    #[arg(long)]
    pub status: Option<ResourceStatus>,

    #[arg(long)]
    pub owner: Option<AgentId>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "type")]
    kind: String,
    #[tabled(rename = "owner")]
    owner: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "metadata")]
    metadata: String,
}

impl From<&Resource> for ResourceRow {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            name: resource.name.clone(),
            kind: resource.kind.clone(),
            owner: resource.owner.to_string(),
            status: resource.status.to_string(),
            metadata: metadata_cell(resource.metadata.as_ref()),
        }
    }
}

pub fn run(state: Option<PathBuf>, cmd: ResourceCommand) -> Result<()> {
    let mut ws = Workspace::open(state)?;
    match cmd {
        ResourceCommand::Allocate(args) => allocate(&mut ws, args),
        ResourceCommand::List(args) => list(&ws, args),
        ResourceCommand::Show { id, json } => show(&ws, &id, json),
        ResourceCommand::SetStatus { id, status } => {
            if !ws.harmony.resources.update_status(id.as_str(), status) {
                bail!("resource '{id}' does not exist");
            }
            ws.save()?;
            println!("✓ Resource '{id}' is now {status}");
            Ok(())
        }
        ResourceCommand::Release { id } => {
            if !ws.harmony.resources.release(id.as_str()) {
                bail!("resource '{id}' does not exist");
            }
            ws.save()?;
            println!("✓ Released resource '{id}'");
            Ok(())
        }
    }
}

fn allocate(ws: &mut Workspace, args: AllocateArgs) -> Result<()> {
    let mut resource = Resource::new(args.id, args.name, args.kind, args.owner)
        .with_status(args.status.unwrap_or_default());
    resource.metadata = parse_meta(&args.meta)?;
    let id = resource.id.clone();
    let owner = resource.owner.clone();

    if args.unchecked {
        ws.harmony.resources.allocate(resource);
    } else {
        ws.harmony.allocate_resource(resource).with_context(|| {
            format!("cannot allocate '{id}'; register the owner first or pass --unchecked")
        })?;
    }
    ws.save()?;
    println!("✓ Allocated resource '{id}' to '{owner}'");
    Ok(())
}

fn list(ws: &Workspace, args: ListArgs) -> Result<()> {
    let filter = ResourceFilter { kind: args.kind, status: args.status, owner: args.owner };
    let mut resources = ws.harmony.resources.list(Some(&filter));
    resources.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        return print_json(&resources);
    }
    if resources.is_empty() {
        println!("No resources match.");
        return Ok(());
    }
    let mut table = Table::new(resources.iter().map(ResourceRow::from));
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(ws: &Workspace, id: &str, json: bool) -> Result<()> {
    let Some(resource) = ws.harmony.resources.get(id) else {
        bail!("resource '{id}' does not exist");
    };
    if json {
        return print_json(resource);
    }
    let mut table = Table::new([ResourceRow::from(resource)]);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
