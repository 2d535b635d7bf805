//! End-to-end tests of the `superstep` binary.

use std::io::Write;

use assert_cmd::Command;
use tempfile::NamedTempFile;

fn edge_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write edges");
    file
}

fn superstep() -> Command {
    let mut cmd = Command::cargo_bin("superstep").expect("binary");
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_run_sssp_prints_distances() {
    let edges = edge_file("# chain\n0 1\n1 2\n2 3\n3 4\n");
    let output = superstep()
        .args(["run", "--algorithm", "sssp", "--source", "0", "--edges"])
        .arg(edges.path())
        .output()
        .expect("run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let distances: Vec<f64> = rows
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["distance"].as_f64().expect("distance"))
        .collect();
    assert_eq!(distances, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(rows[4]["nodeId"], 4);
}

#[test]
fn test_run_wcc_undirected() {
    let edges = edge_file("1 0\n3 2\n");
    let output = superstep()
        .args(["run", "-a", "wcc", "--orientation", "undirected", "--nodes", "5", "--edges"])
        .arg(edges.path())
        .output()
        .expect("run");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let components: Vec<i64> = rows
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["component"].as_i64().expect("component"))
        .collect();
    assert_eq!(components, vec![0, 0, 2, 2, 4]);
}

#[test]
fn test_config_file_is_applied() {
    let mut config = NamedTempFile::new().expect("temp file");
    writeln!(config, "max_iterations = 7\nconcurrency = 3").expect("write config");
    let output = superstep()
        .arg("--config")
        .arg(config.path())
        .arg("config")
        .output()
        .expect("config");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.contains("max_iterations = 7"));
    assert!(text.contains("concurrency = 3"));
}

#[test]
fn test_estimate_prints_range() {
    let output = superstep()
        .args(["estimate", "--nodes", "10000", "--relationships", "100000", "--concurrency", "1", "-a", "sssp"])
        .output()
        .expect("estimate");
    assert!(output.status.success());
    let range: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(range["min"], 244_000);
    assert_eq!(range["max"], 244_000);
}

#[test]
fn test_bad_edge_file_fails() {
    let edges = edge_file("0 one\n");
    superstep()
        .args(["run", "-a", "pagerank", "--edges"])
        .arg(edges.path())
        .assert()
        .failure();
}

#[test]
fn test_sssp_source_outside_graph_fails() {
    let edges = edge_file("0 1\n1 2\n");
    let output = superstep()
        .args(["run", "--algorithm", "sssp", "--source", "7", "--edges"])
        .arg(edges.path())
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--source"), "{stderr}");
}
