use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

const SHAPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Cli name="shapes">
  <Commands>
    <Command name="get" describe="Get a shape">
      <Arguments>
        <ArgumentRef name="shape"/>
        <ArgumentRef name="sides"/>
      </Arguments>
    </Command>
    <Command name="put" describe="Store a shape">
      <Arguments>
        <ArgumentRef name="shape" required="true"/>
      </Arguments>
    </Command>
  </Commands>
  <Arguments>
    <Argument name="shape" alias="s" describe="Name of the shape"/>
    <Argument name="sides" type="number" default="3"/>
  </Arguments>
</Cli>
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

fn dyncli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dyncli"))
        .args(args)
        .output()
        .expect("failed to run dyncli")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_prints_whole_document() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&["convert", "--input", input.to_str().unwrap()]);
    assert!(output.status.success(), "convert should succeed");

    let value = stdout_json(&output);
    assert_eq!(value["_"], json!("Cli"));
    assert_eq!(value["name"], json!("shapes"));
    assert!(value["_children"].is_array());
}

#[test]
fn convert_selection_coerces_attributes() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&[
        "convert",
        "--input",
        input.to_str().unwrap(),
        "--xpath",
        "/Cli/Arguments/Argument[@name='sides']",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([{"_": "Argument", "default": 3, "name": "sides", "type": "number"}])
    );
}

#[test]
fn convert_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);
    let target = dir.path().join("shapes.json");

    let output = dyncli(&[
        "convert",
        "--input",
        input.to_str().unwrap(),
        "--output",
        target.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let raw = fs::read_to_string(&target).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["name"], json!("shapes"));
}

#[test]
fn convert_rejects_malformed_xml() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "broken.xml", "<Cli><Commands></Cli>");

    let output = dyncli(&["convert", "--input", input.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr was: {stderr}");
}

// ---------------------------------------------------------------------------
// describe
// ---------------------------------------------------------------------------

#[test]
fn describe_named_command_resolves_refs() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&[
        "describe",
        "--input",
        input.to_str().unwrap(),
        "--command",
        "get",
    ]);
    assert!(output.status.success());

    let descriptors = stdout_json(&output);
    assert_eq!(descriptors.as_array().map(Vec::len), Some(1));
    assert_eq!(descriptors[0]["name"], json!("get"));
    assert_eq!(descriptors[0]["options"]["shape"]["alias"], json!("s"));
    assert_eq!(descriptors[0]["options"]["sides"]["default"], json!(3));
}

#[test]
fn describe_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&[
        "describe",
        "--input",
        input.to_str().unwrap(),
        "--command",
        "delete",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("delete"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_default_settings() {
    let dir = TempDir::new().unwrap();
    let settings = write_file(&dir, "shapes.yml", "name: shapes\ndefault_command: get\n");

    let output = dyncli(&["validate", "--settings", settings.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("valid"));
}

#[test]
fn validate_reports_colliding_labels() {
    let dir = TempDir::new().unwrap();
    let settings = write_file(
        &dir,
        "bad.yml",
        "name: shapes\nspec:\n  name: bad\n  labels:\n    element: _x\n    text: _x\n",
    );

    let output = dyncli(&["validate", "--settings", settings.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("_x"), "stderr was: {stderr}");
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_inserts_default_command() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);
    let settings = write_file(&dir, "shapes.yml", "name: shapes\ndefault_command: get\n");

    let output = dyncli(&[
        "run",
        "--input",
        input.to_str().unwrap(),
        "--settings",
        settings.to_str().unwrap(),
        "--",
        "-s",
        "square",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let argv = stdout_json(&output);
    assert_eq!(argv["shape"], json!("square"));
    assert_eq!(argv["sides"], json!(3));
    assert_eq!(argv["_"], json!(["get"]));
}

#[test]
fn run_parse_failure_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&["run", "--input", input.to_str().unwrap(), "--", "put"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--shape"), "stderr was: {stderr}");
}

#[test]
fn run_without_command_or_default_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&["run", "--input", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no default command"), "stderr was: {stderr}");
}

#[test]
fn run_help_prints_generated_usage() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "shapes.xml", SHAPES_XML);

    let output = dyncli(&["run", "--input", input.to_str().unwrap(), "--", "get", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--shape"), "stdout was: {stdout}");
    assert!(stdout.contains("Name of the shape"), "stdout was: {stdout}");
}
