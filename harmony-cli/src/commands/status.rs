//! `harmony status`: per-status counts and broken agent references.

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use harmony_core::{
    AgentStatus, DanglingReference, ResourceStatus, StatusCount, Summary, TaskStatus,
};

use super::{print_json, Workspace};

/// Arguments for `harmony status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReportJson<'a> {
    summary: &'a Summary,
    dangling: &'a [DanglingReference],
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "count")]
    count: usize,
}

impl StatusArgs {
    pub fn run(self, state: Option<PathBuf>) -> Result<()> {
        let ws = Workspace::open(state)?;
        let summary = ws.harmony.summary();
        let dangling = ws.harmony.dangling_references();
        for reference in &dangling {
            tracing::warn!(reference = %describe(reference), "dangling agent reference");
        }

        if self.json {
            return print_json(&StatusReportJson { summary: &summary, dangling: &dangling });
        }

        println!(
            "Harmony v{} | {} agents | {} resources | {} tasks",
            env!("CARGO_PKG_VERSION"),
            ws.harmony.agents.len(),
            ws.harmony.resources.len(),
            ws.harmony.tasks.len(),
        );
        print_counts("AGENTS", &summary.agents, agent_indicator);
        print_counts("RESOURCES", &summary.resources, resource_indicator);
        print_counts("TASKS", &summary.tasks, task_indicator);

        if dangling.is_empty() {
            println!("{} no dangling agent references", "■".green().bold());
        } else {
            println!(
                "{} {} dangling agent reference(s):",
                "■".yellow().bold(),
                dangling.len()
            );
            for reference in &dangling {
                println!("  - {}", describe(reference));
            }
        }
        Ok(())
    }
}

fn print_counts<S: Display + Copy>(
    title: &str,
    counts: &[StatusCount<S>],
    indicator: fn(S) -> String,
) {
    println!("{}", title.bold());
    let rows: Vec<CountRow> = counts
        .iter()
        .map(|c| CountRow { status: c.status.to_string(), count: c.count })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    let legend: Vec<String> = counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{} {}", indicator(c.status), c.status))
        .collect();
    if !legend.is_empty() {
        println!("{}", legend.join("  "));
    }
}

fn agent_indicator(status: AgentStatus) -> String {
    match status {
        AgentStatus::Active => "■".green().bold().to_string(),
        AgentStatus::Idle => "■".yellow().bold().to_string(),
        AgentStatus::Offline => "■".bright_black().bold().to_string(),
    }
}

fn resource_indicator(status: ResourceStatus) -> String {
    match status {
        ResourceStatus::Available => "■".green().bold().to_string(),
        ResourceStatus::InUse => "■".blue().bold().to_string(),
        ResourceStatus::Maintenance => "■".red().bold().to_string(),
    }
}

fn task_indicator(status: TaskStatus) -> String {
    match status {
        TaskStatus::Pending => "■".bright_black().bold().to_string(),
        TaskStatus::InProgress => "■".yellow().bold().to_string(),
        TaskStatus::Completed => "■".green().bold().to_string(),
        TaskStatus::Failed => "■".red().bold().to_string(),
    }
}

fn describe(reference: &DanglingReference) -> String {
    match reference {
        DanglingReference::ResourceOwner { resource, owner } => {
            format!("resource '{resource}' is owned by unregistered agent '{owner}'")
        }
        DanglingReference::TaskAssignee { task, agent } => {
            format!("task '{task}' is assigned to unregistered agent '{agent}'")
        }
    }
}
