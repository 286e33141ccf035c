//! Integration tests for the pipenet binary
//!
//! These run the built binary against exported payloads and check the
//! JSON it prints.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const APPLICATIONS: &str = r#"{"applications": [
    {"id": 1, "latitude": "56.4767", "longitude": "53.8036", "status": "in_progress",
     "team_id": 1, "team_name": "водосеть"},
    {"id": 2, "coordinates": {"lat": 56.4768, "lng": 53.8037}, "status": "new",
     "team": {"id": 1, "name": "водосеть"}},
    {"id": 3, "latitude": 50.0, "longitude": 50.0, "status": "new", "team_name": "канализация"},
    {"id": 4, "latitude": null, "longitude": null, "status": "new"},
    {"id": 5, "latitude": 56.4767, "longitude": 53.8036, "status": "completed", "line_id": 10},
    {"id": 6, "latitude": 40.0, "longitude": 40.0, "status": "new", "line_id": 20}
]}"#;

const NETWORK: &str = r#"[
    {"id": 10, "layer_type": "water", "object_type": "line",
     "geojson": {"type": "LineString", "coordinates": [[53.8000, 56.4767], [53.8100, 56.4767]]}},
    {"id": 20, "layer_type": "sewer", "object_type": "line",
     "geojson": {"type": "LineString", "coordinates": [[50.0000, 50.0000], [50.0000, 50.0100]]},
     "pipe_length": "12.5"},
    {"id": 30, "layer_type": "sewer", "object_type": "well",
     "geojson": {"type": "Point", "coordinates": [50.0, 50.0]}},
    {"id": 40, "layer_type": "water", "object_type": "line", "geojson": "not geojson"}
]"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("applications.json"), APPLICATIONS).unwrap();
        std::fs::write(dir.path().join("network.json"), NETWORK).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn run(&self, args: &[&str]) -> Output {
        run_in(self.dir.path(), args)
    }
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pipenet"))
        .args(args)
        .current_dir(dir)
        .env_remove("PIPENET_ASSOCIATION_TOLERANCE")
        .env_remove("PIPENET_TOLERANCE_UNIT")
        .env_remove("PIPENET_CLUSTER_TOLERANCE")
        .env_remove("PIPENET_INCLUDE_COMPLETED")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute pipenet")
}

fn json_data(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "pipenet failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

#[test]
fn test_length_json() {
    let fixture = Fixture::new();
    let data = json_data(&fixture.run(&["length", &fixture.path("network.json"), "--json"]));

    let pipes = data["pipes"].as_array().unwrap();
    assert_eq!(pipes.len(), 2);

    assert_eq!(pipes[0]["pipe_id"], 10);
    assert_eq!(pipes[0]["source"], "computed");
    let computed = pipes[0]["computed_m"].as_f64().unwrap();
    assert!(computed > 600.0 && computed < 630.0, "got {computed}");

    assert_eq!(pipes[1]["pipe_id"], 20);
    assert_eq!(pipes[1]["source"], "manual");
    assert_eq!(pipes[1]["display_m"].as_f64(), Some(12.5));
}

#[test]
fn test_associate_json() {
    let fixture = Fixture::new();
    let data = json_data(&fixture.run(&[
        "associate",
        &fixture.path("applications.json"),
        &fixture.path("network.json"),
        "--json",
    ]));

    assert_eq!(data["tolerance"]["unit"], "degrees");
    let applications = data["applications"].as_array().unwrap();
    // The completed application is left out by default
    let ids: Vec<i64> = applications.iter().map(|a| a["application_id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 6]);

    assert_eq!(applications[0]["resolution"]["kind"], "nearest");
    assert_eq!(applications[0]["resolution"]["pipe_id"], 10);
    assert_eq!(applications[3]["resolution"]["kind"], "unresolved");
    assert_eq!(applications[4]["resolution"]["kind"], "explicit");
    assert_eq!(applications[4]["resolution"]["pipe_id"], 20);

    assert_eq!(data["pipes_with_open_applications"], serde_json::json!([10, 20]));
}

#[test]
fn test_cluster_json() {
    let fixture = Fixture::new();
    let data = json_data(&fixture.run(&[
        "cluster",
        &fixture.path("applications.json"),
        "--cluster-tolerance",
        "0.001",
        "--json",
    ]));

    let groups = data["groups"].as_array().unwrap();
    let members: Vec<Value> = groups.iter().map(|g| g["member_ids"].clone()).collect();
    assert_eq!(
        members,
        vec![serde_json::json!([1, 2]), serde_json::json!([3]), serde_json::json!([6])]
    );
    assert_eq!(groups[0]["counts"]["water"], 2);
    assert_eq!(groups[0]["badge"], "2");
    assert_eq!(groups[0]["tone"], "water_active");
    assert_eq!(groups[0]["color"], "#0066ff");
    assert_eq!(groups[1]["counts"]["sewer"], 1);
}

#[test]
fn test_cluster_include_completed() {
    let fixture = Fixture::new();
    let data = json_data(&fixture.run(&[
        "cluster",
        &fixture.path("applications.json"),
        "--cluster-tolerance",
        "0.001",
        "--include-completed",
        "--json",
    ]));
    assert_eq!(data["groups"][0]["member_ids"], serde_json::json!([1, 2, 5]));
}

#[test]
fn test_config_sources() {
    let fixture = Fixture::new();
    let config_file = fixture.dir.path().join("pipenet.toml");
    std::fs::write(&config_file, "association_tolerance = 25.0\ntolerance_unit = \"meters\"\n").unwrap();

    let data = json_data(&fixture.run(&[
        "config",
        "--config",
        &config_file.display().to_string(),
        "--cluster-tolerance",
        "0.0005",
        "--json",
    ]));

    let values = &data["values"];
    assert_eq!(values["association_tolerance"]["value"], "25");
    assert_eq!(values["association_tolerance"]["source"], "file");
    assert_eq!(values["tolerance_unit"]["value"], "meters");
    assert_eq!(values["cluster_tolerance"]["value"], "0.0005");
    assert_eq!(values["cluster_tolerance"]["source"], "cli");
    assert_eq!(values["include_completed"]["source"], "default");
}

#[test]
fn test_missing_input_fails() {
    let fixture = Fixture::new();
    let output = fixture.run(&["length", &fixture.path("nope.json")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.json"), "stderr: {stderr}");
}

#[test]
fn test_human_output() {
    let fixture = Fixture::new();
    let output = fixture.run(&["length", &fixture.path("network.json")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pipe Lengths"));
    assert!(stdout.contains("12.50"));
}
