use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn pbx_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pbx-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run pbx-sim")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json stdout")
}

#[test]
fn version_prints_the_package_version() {
    let output = pbx_sim(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn cell_prints_a_json_system() {
    let value = stdout_json(&pbx_sim(&["cell", "fcc", "--replicas", "2"]));
    assert_eq!(value["positions"].as_array().map(Vec::len), Some(32));
    assert_eq!(value["provenance"]["replicas"], serde_json::json!([2, 2, 2]));
    assert_eq!(value["provenance"]["seed"], 0);
}

#[test]
fn cell_streams_are_recorded_and_reproducible() {
    let args = ["cell", "bcc", "--replicas", "2", "--sigma", "0.1", "--seed", "9", "--stream", "2"];
    let first = stdout_json(&pbx_sim(&args));
    let second = stdout_json(&pbx_sim(&args));
    assert_eq!(first, second);
    assert_eq!(first["provenance"]["seed"], 9);
    assert_eq!(first["provenance"]["stream"], 2);

    let other = stdout_json(&pbx_sim(&[
        "cell", "bcc", "--replicas", "2", "--sigma", "0.1", "--seed", "9", "--stream", "3",
    ]));
    assert_ne!(first["positions"], other["positions"]);
}

#[test]
fn square_cells_reject_out_of_plane_replicas() {
    let output = pbx_sim(&["cell", "square", "--per-axis", "2,2,2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("replicas-2d"));
}

#[test]
fn custom_cells_take_box_and_basis_json() {
    let output = pbx_sim(&[
        "cell",
        "custom",
        "--box",
        "[2.0, 3.0]",
        "--basis",
        "[[0.0, 0.0, 0.0], [0.5, 0.5, 0.0]]",
        "--per-axis",
        "3,2,1",
        "--format",
        "xyz",
    ]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "12");
    assert_eq!(lines.len(), 14);
}

#[test]
fn box_describes_box_like_values() {
    let value = stdout_json(&pbx_sim(&["box", "[2.0, 3.0, 4.0]"]));
    assert_eq!(value["input_kind"], "axis-lengths-3");
    assert_eq!(value["dimensions"], 3);
    assert_eq!(value["volume"], 24.0);

    let flat = stdout_json(&pbx_sim(&["box", "[[2.0, 1.0], [0.0, 2.0]]"]));
    assert_eq!(flat["input_kind"], "matrix-2x2");
    assert_eq!(flat["dimensions"], 2);

    let bad = pbx_sim(&["box", "[0.0, 1.0, 1.0]"]);
    assert!(!bad.status.success());
}

#[test]
fn generate_writes_the_configured_output() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("run.yaml");
    fs::write(
        &config_path,
        "cell:\n  kind: bcc\ngenerate:\n  num_replicas: 2\n  sigma_noise: 0.05\nseed: 7\n",
    )
    .unwrap();
    let out_path = dir.path().join("out/system.json");
    let summary = stdout_json(&pbx_sim(&[
        "generate",
        "--config",
        config_path.to_str().unwrap(),
        "--out",
        out_path.to_str().unwrap(),
    ]));
    assert_eq!(summary["particles"], 16);
    assert_eq!(summary["format"], "json");

    let written: Value = serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["provenance"]["seed"], 7);

    let again = stdout_json(&pbx_sim(&[
        "generate",
        "--config",
        config_path.to_str().unwrap(),
        "--out",
        dir.path().join("again.json").to_str().unwrap(),
    ]));
    assert_eq!(summary["hash"], again["hash"]);
}
