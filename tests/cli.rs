//! CLI integration tests for goalsplit
//!
//! Runs the binary end-to-end against a small warehouse problem written
//! into a temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DOMAIN: &str = r#"
(define (domain warehouse)
  (:requirements :strips :typing)
  (:types robot location item)
  (:predicates (at ?r - robot ?l - location)
               (item-at ?i - item ?l - location)
               (holding ?r - robot ?i - item)
               (delivered ?i - item))
  (:action move
    :parameters (?r - robot ?from ?to - location)
    :precondition (at ?r ?from)
    :effect (and (at ?r ?to) (not (at ?r ?from))))
  (:action pick
    :parameters (?r - robot ?i - item ?l - location)
    :precondition (and (at ?r ?l) (item-at ?i ?l))
    :effect (and (holding ?r ?i) (not (item-at ?i ?l))))
  (:action drop
    :parameters (?r - robot ?i - item ?l - location)
    :precondition (and (holding ?r ?i) (at ?r ?l))
    :effect (and (delivered ?i) (not (holding ?r ?i)))))
"#;

const PROBLEM: &str = r#"
(define (problem warehouse-4)
  (:domain warehouse)
  (:objects r1 r2 - robot l1 l2 - location i1 i2 i3 i4 - item)
  (:init (at r1 l1) (at r2 l2)
         (item-at i1 l1) (item-at i2 l1) (item-at i3 l2) (item-at i4 l2))
  (:goal (and (delivered i1) (delivered i2) (delivered i3) (delivered i4))))
"#;

const EMPTY_PROBLEM: &str = r#"
(define (problem warehouse-empty)
  (:domain warehouse)
  (:objects r1 - robot l1 - location)
  (:init (at r1 l1))
  (:goal (and)))
"#;

const ROLES: &str = r#"{
    "domain": "warehouse",
    "goal_predicates": ["delivered"],
    "roles": {
        "location": {
            "extractors": [
                {"predicate": "item-at", "bindings": {"0": "goal:0"}, "value_arg": 1}
            ]
        }
    },
    "cluster_keys": ["location"],
    "agent_role_extractors": {
        "location": {"predicate": "at", "bindings": {"0": "agent:self"}, "value_arg": 1}
    }
}"#;

#[allow(deprecated)]
fn goalsplit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("goalsplit").unwrap();
    cmd.env_remove("GOALSPLIT_SEED");
    cmd
}

/// Writes the inputs into `dir` and returns the config path
fn write_fixture(dir: &Path, problem: &str, clustering: &str) -> PathBuf {
    fs::write(dir.join("domain.pddl"), DOMAIN).unwrap();
    fs::write(dir.join("problem.pddl"), problem).unwrap();
    fs::write(dir.join("roles.json"), ROLES).unwrap();

    let config = format!(
        "pddl:\n  domain_file: {}\n  problem_file: {}\nroles:\n  role_config_file: {}\n\
         multiagent:\n  agent_types: [robot]\nclustering:\n{}",
        dir.join("domain.pddl").display(),
        dir.join("problem.pddl").display(),
        dir.join("roles.json").display(),
        clustering
    );
    let path = dir.join("config.yaml");
    fs::write(&path, config).unwrap();
    path
}

fn default_fixture(dir: &Path) -> PathBuf {
    write_fixture(dir, PROBLEM, "  merge_compatible_subtasks: false\n")
}

fn run_stdout(config: &Path, extra: &[&str]) -> String {
    let output = goalsplit_cmd()
        .arg("run")
        .arg("--config")
        .arg(config)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "run failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_run_prints_decomposition_json() {
    let temp_dir = TempDir::new().unwrap();
    let config = default_fixture(temp_dir.path());

    let stdout = run_stdout(&config, &[]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["domain"], "warehouse");
    assert_eq!(report["problem"], "warehouse-4");
    let subtasks = report["subtasks"].as_array().unwrap();
    assert_eq!(subtasks.len(), 2);
    assert_eq!(subtasks[0]["role_signature"]["location"], "l1");
    assert_eq!(subtasks[0]["assigned_agent"], "r1");
    assert_eq!(subtasks[1]["assigned_agent"], "r2");
    assert_eq!(report["assignment"].as_object().unwrap().len(), 2);
    assert_eq!(report["agents"]["r1"]["type"], "robot");
    assert_eq!(
        report["capabilities"]["r2"],
        serde_json::json!(["drop", "move", "pick"])
    );
}

#[test]
fn test_run_writes_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = default_fixture(temp_dir.path());
    let out = temp_dir.path().join("results").join("run.json");

    goalsplit_cmd()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["subtasks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_same_seed_gives_identical_output() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(
        temp_dir.path(),
        PROBLEM,
        "  max_subtasks: 1\n  optimization_strategy: auto\n  strategy_randomness: 0.5\n",
    );

    let first = run_stdout(&config, &["--seed", "7"]);
    let second = run_stdout(&config, &["--seed", "7"]);
    assert_eq!(first, second);
}

#[test]
fn test_unsatisfiable_cap_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(
        temp_dir.path(),
        PROBLEM,
        "  max_subtasks: 1\n  merge_compatible_subtasks: false\n  max_retries: 0\n",
    );

    goalsplit_cmd()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot satisfy"));
}

#[test]
fn test_zero_goals_gives_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(temp_dir.path(), EMPTY_PROBLEM, "  max_retries: 1\n");

    let stdout = run_stdout(&config, &[]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(report["subtasks"].as_array().unwrap().is_empty());
    assert!(report["assignment"].as_object().unwrap().is_empty());
}

#[test]
fn test_missing_domain_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = default_fixture(temp_dir.path());
    fs::remove_file(temp_dir.path().join("domain.pddl")).unwrap();

    goalsplit_cmd()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_dry_run_prints_summary() {
    let temp_dir = TempDir::new().unwrap();
    let config = default_fixture(temp_dir.path());

    goalsplit_cmd()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task Summary"))
        .stdout(predicate::str::contains("delivered(i3)"))
        .stdout(predicate::str::contains("r1 (robot)"));
}

#[test]
fn test_schema_command() {
    goalsplit_cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("clustering"))
        .stdout(predicate::str::contains("max_goals_per_subtask"));
}

#[test]
fn test_diverse_writes_variants_and_analysis() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixture(temp_dir.path(), PROBLEM, "  max_subtasks: 30\n");
    let out_dir = temp_dir.path().join("diverse");

    goalsplit_cmd()
        .arg("diverse")
        .arg("--config")
        .arg(&config)
        .args(["-n", "2"])
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2/2 solutions"));

    for name in [
        "diverse_config_000.yaml",
        "diverse_config_001.yaml",
        "result_000.json",
        "result_001.json",
        "diversity_analysis.json",
        "diversity_summary.txt",
    ] {
        assert!(out_dir.join(name).exists(), "{} should exist", name);
    }

    let analysis: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("diversity_analysis.json")).unwrap())
            .unwrap();
    assert_eq!(analysis["total_solutions"], 2);
}

#[test]
fn test_bundled_config_runs_from_repo_root() {
    let stdout = goalsplit_cmd()
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .arg("run")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(report["problem"], "warehouse-6");
    let goals: usize = report["subtasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["goals"].as_array().unwrap().len())
        .sum();
    assert_eq!(goals, 6);
}
