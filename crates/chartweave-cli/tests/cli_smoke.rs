use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

const EMAIL_MAPPING: &str = r#"{
    "${categories}": { "fieldName": "day_name", "dataType": "array", "aggregationType": "list" },
    "${s1_name}": {
        "fieldName": "channel_name",
        "dataType": "string",
        "filters": { "channel_name": "Email" }
    },
    "s1_data": {
        "fieldName": "conversion_count",
        "dataType": "array",
        "aggregationType": "sum",
        "filters": { "channel_name": "Email" }
    }
}"#;

const EMAIL_TEMPLATE: &str = r#"{
    "coordinates": { "xAxis": { "type": "category", "data": "${categories}" } },
    "data": { "series": [{ "name": "${s1_name}", "data": "${s1_data}" }] }
}"#;

#[test]
fn cli_transforms_fixture_template() {
    let root = repo_root();
    let fixture = root
        .join("fixtures")
        .join("pie")
        .join("doughnut_chart.template.json");
    assert!(fixture.exists(), "fixture missing: {}", fixture.display());

    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    let output = Command::new(exe)
        .args([
            "transform",
            "--chart",
            "doughnut_chart",
            fixture.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let skeleton = stdout_json(&output);
    assert_eq!(skeleton["series"][0]["type"], "pie");
    assert_eq!(skeleton["series"][0]["data"], "${pie_data}");
}

#[test]
fn cli_catalogs_builtin_template() {
    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    let output = Command::new(exe)
        .args(["catalog", "--chart", "basic_gauge_chart"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let catalog = stdout_json(&output);
    assert_eq!(catalog["chartId"], "basic_gauge_chart");
    let names: Vec<&str> = catalog["placeholders"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert!(names.contains(&"${gauge_data}"));
}

#[test]
fn cli_dry_run_with_sample_data_passes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let template = tmp.path().join("email.json");
    let mapping = tmp.path().join("mapping.json");
    fs::write(&template, EMAIL_TEMPLATE).expect("write template");
    fs::write(&mapping, EMAIL_MAPPING).expect("write mapping");

    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    let output = Command::new(exe)
        .args([
            "dry-run",
            "--chart",
            "basic_line_chart",
            "--mapping",
            mapping.to_string_lossy().as_ref(),
            "--sample",
            "--strict",
            template.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report = stdout_json(&output);
    assert_eq!(report["passed"], true);
    assert_eq!(report["remainingPlaceholders"], serde_json::json!([]));
    assert_eq!(
        report["finalConfig"]["series"][0]["data"]
            .as_array()
            .unwrap()
            .len(),
        7
    );
}

#[test]
fn cli_validate_reports_failure_with_exit_code_3() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mapping = tmp.path().join("mapping.json");
    fs::write(&mapping, EMAIL_MAPPING).expect("write mapping");

    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    Command::new(exe)
        .args([
            "validate",
            "--chart",
            "basic_bar_chart",
            "--mapping",
            mapping.to_string_lossy().as_ref(),
            "--sample",
        ])
        .assert()
        .code(3);
}

#[test]
fn cli_reads_yaml_config_overrides() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("chartweave.yaml");
    fs::write(&config, "defaults:\n  tooltip:\n    trigger: item\n").expect("write config");
    let template = tmp.path().join("empty.json");
    fs::write(&template, "{}").expect("write template");

    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    let output = Command::new(exe)
        .args([
            "transform",
            "--chart",
            "basic_line_chart",
            "--config",
            config.to_string_lossy().as_ref(),
            template.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["tooltip"]["trigger"], "item");
}

#[test]
fn cli_usage_errors_exit_with_2() {
    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    Command::new(exe).args(["transform"]).assert().code(2);

    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    Command::new(exe)
        .args(["dry-run", "--chart", "basic_line_chart", "--mapping", "m.json"])
        .assert()
        .code(2);
}

#[test]
fn cli_lists_families() {
    let exe = assert_cmd::cargo_bin!("chartweave-cli");
    let output = Command::new(exe).arg("families").output().expect("run cli");
    assert!(output.status.success());
    let families = stdout_json(&output);
    assert_eq!(families.as_array().unwrap().len(), 4);
    assert_eq!(families[1]["code"], "PIE");
    assert_eq!(families[1]["chartTypes"][1], "doughnut_chart");
}
