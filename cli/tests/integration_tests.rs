use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_argflat");

/// Bundle with the Person/Hair/Color/Alpha records and two commands.
fn person_bundle() -> Value {
    let int = |name: &str| json!({"name": name, "type": {"primitive": "integer"}});
    json!({
        "version": "1.0.0",
        "name": "people",
        "records": [
            {"name": "Alpha", "fields": [int("a")]},
            {"name": "Color", "fields": [
                int("r"), int("g"), int("b"),
                {"name": "alpha", "type": {"record": "Alpha"}}
            ]},
            {"name": "Hair", "fields": [
                {"name": "color", "type": {"record": "Color"}},
                int("length")
            ]},
            {"name": "Person", "fields": [
                {"name": "name", "type": {"primitive": "string"}},
                {"name": "age", "type": {"primitive": "integer"}},
                {"name": "pet", "type": {"primitive": "string"}, "required": false, "default": "dog"},
                {"name": "hair", "type": {"record": "Hair"}}
            ]}
        ],
        "commands": [
            {"name": "get_hair", "parameters": [{"name": "hair", "type": {"record": "Hair"}}]},
            {"name": "get_person", "doc": "Get a person's information.", "parameters": [
                {"name": "person", "type": {"record": "Person"}},
                {"name": "thing", "type": {"primitive": "string"}}
            ]}
        ]
    })
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap())
        .expect("failed to write bundle");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run argflat")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_well_formed_bundle() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&["validate", bundle.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Validated 1 bundle file(s) with 2 command(s)."));
}

#[test]
fn validate_rejects_cyclic_bundle() {
    let dir = TempDir::new().unwrap();
    let cyclic = json!({
        "version": "1.0.0",
        "records": [
            {"name": "Node", "fields": [
                {"name": "value", "type": {"primitive": "integer"}},
                {"name": "next", "type": {"record": "Node"}}
            ]}
        ]
    });
    let bundle = write_json(&dir, "cyclic.json", &cyclic);

    let out = run(&["validate", bundle.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("cycle detected: Node -> Node"));
}

#[test]
fn validate_reads_yaml_bundles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("alpha.yaml");
    fs::write(
        &path,
        r#"version: "1.0.0"
records:
  - name: Alpha
    fields:
      - name: a
        type:
          primitive: integer
commands:
  - name: get_alpha
    parameters:
      - name: alpha
        type:
          record: Alpha
"#,
    )
    .unwrap();

    let out = run(&["validate", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_prints_flat_signature_as_json() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&[
        "inspect",
        bundle.to_str().unwrap(),
        "--command",
        "get_person",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let signatures: Value = serde_json::from_str(&stdout(&out)).unwrap();
    let names: Vec<&str> = signatures[0]["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["name", "age", "r", "g", "b", "a", "length", "thing", "pet"]
    );
    assert_eq!(signatures[0]["parameters"][5]["path"], "person.hair.color.alpha.a");
}

#[test]
fn inspect_uses_format_from_config() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());
    let config = dir.path().join("argflat.yaml");
    fs::write(&config, "format: markdown\n").unwrap();

    let out = run(&[
        "inspect",
        bundle.to_str().unwrap(),
        "--command",
        "get_hair",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("# get_hair"));
    assert!(text.contains("## Hair.Color.Alpha"));
    assert!(text.contains("| `--a` | int | required |  |"));
}

#[test]
fn inspect_unknown_command_lists_available() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&["inspect", bundle.to_str().unwrap(), "--command", "nope"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("available: get_hair, get_person"));
}

// ---------------------------------------------------------------------------
// call
// ---------------------------------------------------------------------------

#[test]
fn call_rebuilds_nested_records() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&[
        "call",
        bundle.to_str().unwrap(),
        "get_hair",
        "--r",
        "1",
        "--g",
        "2",
        "--b",
        "3",
        "--a",
        "4",
        "--length",
        "10",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let rebuilt: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(
        rebuilt,
        json!({"hair": {"color": {"r": 1, "g": 2, "b": 3, "alpha": {"a": 4}}, "length": 10}})
    );
}

#[test]
fn call_passes_plain_parameters_through() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&[
        "call",
        bundle.to_str().unwrap(),
        "get_person",
        "--name",
        "John",
        "--age",
        "30",
        "--r",
        "1",
        "--g",
        "2",
        "--b",
        "3",
        "--a",
        "4",
        "--length",
        "10",
        "--thing",
        "stuff",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let rebuilt: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(rebuilt["thing"], "stuff");
    assert_eq!(rebuilt["person"]["pet"], "dog");
    assert_eq!(rebuilt["person"]["hair"]["color"]["alpha"]["a"], 4);
}

#[test]
fn call_reports_invalid_leaf_with_path() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&[
        "call",
        bundle.to_str().unwrap(),
        "get_hair",
        "--r",
        "red",
        "--g",
        "2",
        "--b",
        "3",
        "--a",
        "4",
        "--length",
        "10",
    ]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error: hair.color.r: invalid value for r"));
}

#[test]
fn call_requires_missing_leaves_without_prompt() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&[
        "call",
        bundle.to_str().unwrap(),
        "get_hair",
        "--r",
        "1",
        "--g",
        "2",
        "--b",
        "3",
        "--length",
        "10",
    ]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("Invalid arguments for 'get_hair':\n"), "stderr: {err}");
    assert!(err.contains("required arguments were not provided"));
    assert!(err.contains("--a"));
}

#[test]
fn call_rejects_leaf_named_like_help_flag() {
    let dir = TempDir::new().unwrap();
    let bundle = json!({
        "version": "1.0.0",
        "records": [
            {"name": "Doc", "fields": [
                {"name": "title", "type": {"primitive": "string"}},
                {"name": "help", "type": {"primitive": "string"}}
            ]}
        ],
        "commands": [
            {"name": "write", "parameters": [{"name": "doc", "type": {"record": "Doc"}}]}
        ]
    });
    let bundle = write_json(&dir, "doc.json", &bundle);

    let out = run(&["call", bundle.to_str().unwrap(), "write", "--title", "x"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.contains("Cannot flatten 'write': leaf help at doc.help clashes with the reserved --help flag"),
        "stderr: {err}"
    );
}

#[test]
fn call_prompts_for_missing_leaves() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let mut child = Command::new(BIN)
        .args([
            "call",
            bundle.to_str().unwrap(),
            "get_hair",
            "--prompt",
            "--r",
            "1",
            "--g",
            "2",
            "--b",
            "3",
            "--length",
            "10",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run argflat");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"7\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("a [int]: "));

    let rebuilt: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(rebuilt["hair"]["color"]["alpha"]["a"], 7);
}

#[test]
fn call_help_lists_panels() {
    let dir = TempDir::new().unwrap();
    let bundle = write_json(&dir, "people.json", &person_bundle());

    let out = run(&["call", bundle.to_str().unwrap(), "get_person", "--", "--help"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let help = stdout(&out);
    assert!(help.contains("Get a person's information."));
    assert!(help.contains("Person.Hair.Color:"));
    assert!(help.contains("--length <INT>"));
}

#[test]
fn demo_bundle_validates() {
    let demo = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/person.yaml");
    let out = run(&["validate", demo]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("with 2 command(s)"));
}
