use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

use harmony_core::{snapshot, AgentId, TaskStatus};

fn harmony_cmd(state: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("harmony"));
    cmd.arg("--state").arg(state).env_remove("HARMONY_STATE");
    cmd
}

fn state_file(dir: &TempDir) -> PathBuf {
    dir.path().join("state.yaml")
}

fn run_ok(state: &Path, args: &[&str]) {
    harmony_cmd(state).args(args).assert().success();
}

fn json_stdout(state: &Path, args: &[&str]) -> Value {
    let assert = harmony_cmd(state).args(args).assert().success();
    serde_json::from_slice(&assert.get_output().stdout).expect("stdout is JSON")
}

#[test]
fn pack_order_workflow() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args(["agent", "register", "a1", "--name", "Ada", "--type", "human", "-c", "pack"])
        .assert()
        .success()
        .stdout(contains("Registered agent 'a1'"));
    run_ok(&state, &["task", "create", "t1", "--title", "Pack order", "--priority", "high"]);
    harmony_cmd(&state)
        .args(["task", "assign", "t1", "a1"])
        .assert()
        .success()
        .stdout(contains("Assigned task 't1' to 'a1'"));
    run_ok(&state, &["task", "set-status", "t1", "completed"]);

    let done = json_stdout(&state, &["task", "list", "--status", "completed", "--json"]);
    let done = done.as_array().expect("array");
    assert_eq!(done.len(), 1);
    assert_eq!(done[0]["id"], "t1");
    assert_eq!(done[0]["assignedTo"], "a1");
    assert_eq!(done[0]["priority"], "high");

    let h = snapshot::load_from(&state).expect("state persisted");
    let task = h.tasks.get("t1").expect("t1");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.assigned_to, Some(AgentId::new("a1").unwrap()));
}

#[test]
fn checked_assign_fails_for_unknown_agent_and_unchecked_succeeds() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["task", "create", "t1", "--title", "Restock"]);

    harmony_cmd(&state)
        .args(["task", "assign", "t1", "ghost"])
        .assert()
        .failure()
        .stderr(contains("agent 'ghost' is not registered"));

    run_ok(&state, &["task", "assign", "t1", "ghost", "--unchecked"]);
    let task = json_stdout(&state, &["task", "show", "t1", "--json"]);
    assert_eq!(task["assignedTo"], "ghost");

    harmony_cmd(&state)
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("task 't1' is assigned to unregistered agent 'ghost'"));
}

#[test]
fn resource_allocation_requires_owner_unless_unchecked() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args([
            "resource", "allocate", "r1", "--name", "Forklift", "--type", "forklift", "--owner",
            "a1",
        ])
        .assert()
        .failure()
        .stderr(contains("register the owner first"));

    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);
    run_ok(
        &state,
        &[
            "resource", "allocate", "r1", "--name", "Forklift", "--type", "forklift", "--owner",
            "a1",
        ],
    );
    run_ok(
        &state,
        &[
            "resource", "allocate", "r2", "--name", "Scanner", "--type", "scanner", "--owner", "a1",
            "--status", "in_use", "--meta", "zone=north",
        ],
    );

    let forklifts = json_stdout(&state, &["resource", "list", "--type", "forklift", "--json"]);
    assert_eq!(forklifts.as_array().map(Vec::len), Some(1));

    let scanner = json_stdout(&state, &["resource", "show", "r2", "--json"]);
    assert_eq!(scanner["status"], "in_use");
    assert_eq!(scanner["metadata"]["zone"], "north");

    run_ok(&state, &["resource", "release", "r1"]);
    harmony_cmd(&state)
        .args(["resource", "release", "r1"])
        .assert()
        .failure()
        .stderr(contains("resource 'r1' does not exist"));
}

#[test]
fn invalid_enum_values_are_rejected_by_the_parser() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args(["agent", "register", "a1", "--name", "Ada", "--type", "robot"])
        .assert()
        .failure()
        .stderr(contains("human, ai"));
    assert!(!state.exists(), "failed commands must not write state");
}

#[test]
fn register_same_id_replaces() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human", "-c", "pack"]);
    harmony_cmd(&state)
        .args(["agent", "register", "a1", "--name", "Ada Lovelace", "--type", "human"])
        .assert()
        .success()
        .stdout(contains("Replaced agent 'a1'"));

    let agents = json_stdout(&state, &["agent", "list", "--json"]);
    let agents = agents.as_array().expect("array");
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["name"], "Ada Lovelace");
    assert_eq!(agents[0]["capabilities"].as_array().map(Vec::len), Some(0));
}

#[test]
fn missing_ids_exit_non_zero() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args(["agent", "show", "nobody"])
        .assert()
        .failure()
        .stderr(contains("agent 'nobody' is not registered"));
    harmony_cmd(&state)
        .args(["task", "set-status", "t404", "failed"])
        .assert()
        .failure()
        .stderr(contains("task 't404' does not exist"));
}

#[test]
fn agent_list_table_is_sorted_and_filtered() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "zed", "--name", "Zed", "--type", "ai"]);
    run_ok(&state, &["agent", "register", "amy", "--name", "Amy", "--type", "human"]);
    run_ok(
        &state,
        &["agent", "register", "bob", "--name", "Bob", "--type", "human", "--status", "offline"],
    );

    let assert = harmony_cmd(&state)
        .args(["agent", "list", "--type", "human"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let amy = stdout.find("amy").expect("amy listed");
    let bob = stdout.find("bob").expect("bob listed");
    assert!(amy < bob, "rows sorted by id:\n{stdout}");
    assert!(!stdout.contains("zed"), "ai agent filtered out:\n{stdout}");
}

#[test]
fn state_env_var_is_honoured() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    Command::new(assert_cmd::cargo::cargo_bin!("harmony"))
        .env("HARMONY_STATE", &state)
        .args(["task", "create", "t1", "--title", "From env"])
        .assert()
        .success();
    assert!(state.exists());
}

#[test]
fn status_json_reports_summary_and_dangling_references() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);
    run_ok(&state, &["task", "create", "t1", "--title", "Pack order"]);
    run_ok(&state, &["task", "assign", "t1", "ghost", "--unchecked"]);

    let report = json_stdout(&state, &["status", "--json"]);
    let agents = report["summary"]["agents"].as_array().expect("agent counts");
    assert!(agents.contains(&serde_json::json!({"status": "active", "count": 1})));
    let tasks = report["summary"]["tasks"].as_array().expect("task counts");
    assert_eq!(tasks.len(), 4, "every task status is reported");
    assert!(tasks.contains(&serde_json::json!({"status": "pending", "count": 1})));

    let dangling = report["dangling"].as_array().expect("dangling");
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0]["kind"], "task_assignee");
    assert_eq!(dangling[0]["task"], "t1");
    assert_eq!(dangling[0]["agent"], "ghost");
}

#[test]
fn status_json_lists_no_dangling_references_for_clean_state() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);

    let report = json_stdout(&state, &["status", "--json"]);
    assert_eq!(report["dangling"], serde_json::json!([]));
}

#[test]
fn agent_set_status_and_unregister() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);
    run_ok(
        &state,
        &[
            "resource", "allocate", "r1", "--name", "Forklift", "--type", "forklift", "--owner",
            "a1",
        ],
    );

    harmony_cmd(&state)
        .args(["agent", "set-status", "a1", "idle"])
        .assert()
        .success()
        .stdout(contains("Agent 'a1' is now idle"));
    let agent = json_stdout(&state, &["agent", "show", "a1", "--json"]);
    assert_eq!(agent["status"], "idle");

    harmony_cmd(&state)
        .args(["agent", "unregister", "a1"])
        .assert()
        .success()
        .stdout(contains("Unregistered agent 'a1'"));
    let h = snapshot::load_from(&state).expect("state persisted");
    assert!(h.agents.is_empty());
    assert_eq!(h.resources.len(), 1, "unregister does not cascade");

    let report = json_stdout(&state, &["status", "--json"]);
    assert_eq!(report["dangling"][0]["kind"], "resource_owner");
    assert_eq!(report["dangling"][0]["owner"], "a1");
}

#[test]
fn agent_and_task_mutations_on_missing_ids_fail() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args(["agent", "set-status", "nobody", "offline"])
        .assert()
        .failure()
        .stderr(contains("agent 'nobody' is not registered"));
    harmony_cmd(&state)
        .args(["agent", "unregister", "nobody"])
        .assert()
        .failure()
        .stderr(contains("agent 'nobody' is not registered"));
    harmony_cmd(&state)
        .args(["task", "delete", "t404"])
        .assert()
        .failure()
        .stderr(contains("task 't404' does not exist"));
    assert!(!state.exists(), "failed commands must not write state");
}

#[test]
fn task_delete_removes_only_that_task() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["task", "create", "t1", "--title", "Pack order"]);
    run_ok(&state, &["task", "create", "t2", "--title", "Restock"]);

    harmony_cmd(&state)
        .args(["task", "delete", "t1"])
        .assert()
        .success()
        .stdout(contains("Deleted task 't1'"));

    let tasks = json_stdout(&state, &["task", "list", "--json"]);
    let tasks = tasks.as_array().expect("array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], "t2");
}

#[test]
fn task_list_filters_by_assignee_and_priority() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);
    run_ok(&state, &["agent", "register", "a2", "--name", "Grace", "--type", "human"]);
    run_ok(&state, &["task", "create", "t1", "--title", "Pack", "--priority", "high"]);
    run_ok(&state, &["task", "create", "t2", "--title", "Restock", "--priority", "low"]);
    run_ok(&state, &["task", "create", "t3", "--title", "Count", "--priority", "high"]);
    run_ok(&state, &["task", "assign", "t1", "a1"]);
    run_ok(&state, &["task", "assign", "t2", "a1"]);
    run_ok(&state, &["task", "assign", "t3", "a2"]);

    let ids = |args: &[&str]| -> Vec<String> {
        let value = json_stdout(&state, args);
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|t| t["id"].as_str().expect("id").to_string())
            .collect()
    };
    assert_eq!(ids(&["task", "list", "--assigned-to", "a1", "--json"]), ["t1", "t2"]);
    assert_eq!(ids(&["task", "list", "--priority", "high", "--json"]), ["t1", "t3"]);
    assert_eq!(
        ids(&["task", "list", "--assigned-to", "a1", "--priority", "high", "--json"]),
        ["t1"]
    );
    assert!(ids(&["task", "list", "--assigned-to", "nobody", "--json"]).is_empty());
}

#[test]
fn resource_list_filters_by_owner_and_status() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);
    run_ok(&state, &["agent", "register", "a1", "--name", "Ada", "--type", "human"]);
    run_ok(&state, &["agent", "register", "a2", "--name", "Grace", "--type", "human"]);
    run_ok(
        &state,
        &[
            "resource", "allocate", "r1", "--name", "Forklift", "--type", "forklift", "--owner",
            "a1",
        ],
    );
    run_ok(
        &state,
        &[
            "resource", "allocate", "r2", "--name", "Scanner", "--type", "scanner", "--owner", "a1",
            "--status", "maintenance",
        ],
    );
    run_ok(
        &state,
        &["resource", "allocate", "r3", "--name", "Cart", "--type", "cart", "--owner", "a2"],
    );

    let ids = |args: &[&str]| -> Vec<String> {
        let value = json_stdout(&state, args);
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|r| r["id"].as_str().expect("id").to_string())
            .collect()
    };
    assert_eq!(ids(&["resource", "list", "--owner", "a1", "--json"]), ["r1", "r2"]);
    assert_eq!(ids(&["resource", "list", "--status", "available", "--json"]), ["r1", "r3"]);
    assert_eq!(
        ids(&["resource", "list", "--owner", "a1", "--status", "maintenance", "--json"]),
        ["r2"]
    );
}

#[test]
fn malformed_meta_entry_exits_non_zero() {
    let dir = TempDir::new().expect("tempdir");
    let state = state_file(&dir);

    harmony_cmd(&state)
        .args(["agent", "register", "a1", "--name", "Ada", "--type", "human", "--meta", "novalue"])
        .assert()
        .failure()
        .stderr(contains("invalid --meta entry"))
        .stderr(contains("novalue"));
    assert!(!state.exists(), "failed commands must not write state");
}
