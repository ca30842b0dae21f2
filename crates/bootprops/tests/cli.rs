//! End-to-end runs of the `bootprops` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const METADATA: &str = r#"{
  "properties": [
    {
      "name": "server.port",
      "type": "java.lang.Integer",
      "description": "Server HTTP port.",
      "sourceType": "org.acme.web.ServerProperties",
      "defaultValue": 8080
    },
    {
      "name": "server.context-path",
      "type": "java.lang.String",
      "deprecation": { "replacement": "server.servlet.context-path" }
    },
    { "name": "demo.color", "type": "demo.Color" }
  ]
}"#;

const TYPES: &str = r#"{
  "demo.Color": { "kind": "enum", "constants": ["RED", "GREEN", "BLUE"] }
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(dir.path().join("metadata.json"), METADATA).unwrap();
        fs::write(dir.path().join("types.json"), TYPES).unwrap();
        Workspace { dir }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, command: &str, extra: &[&str], input: &Path) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bootprops"))
            .arg(command)
            .arg("--metadata")
            .arg(self.path("metadata.json"))
            .arg("--types")
            .arg(self.path("types.json"))
            .args(extra)
            .arg(input)
            .env("RUST_LOG", "off")
            .output()
            .expect("Failed to run bootprops")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_clean_file_succeeds() {
    let ws = Workspace::new();
    let input = ws.file("app.yml", "server:\n  port: 8080\ndemo:\n  color: RED\n");
    let output = ws.run("check", &["--json"], &input);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_reports_json_lines_and_fails_on_errors() {
    let ws = Workspace::new();
    let input = ws.file(
        "app.yml",
        "server:\n  port: eighty\n  context-path: /app\ndemo:\n  color: PINK\n",
    );
    let output = ws.run("check", &["--json"], &input);
    assert!(!output.status.success());

    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let codes: Vec<&str> = lines.iter().map(|v| v["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["type-mismatch", "deprecated", "type-mismatch"]);
    assert_eq!(lines[0]["line"], 2);
    assert_eq!(lines[1]["severity"], "warning");
}

#[test]
fn check_honours_settings() {
    let ws = Workspace::new();
    let settings = ws.file("bootprops.toml", "[severity]\ntype-mismatch = \"warning\"\n");
    let input = ws.file("app.yml", "server:\n  port: eighty\n");
    let settings = settings.to_string_lossy().into_owned();
    let output = ws.run("check", &["--settings", settings.as_str()], &input);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[type-mismatch] Expecting a 'Integer' but got 'eighty'"));
}

#[test]
fn complete_lists_proposals() {
    let ws = Workspace::new();
    let input = ws.file("app.yml", "demo:\n  color: \n");
    let offset = "demo:\n  color: ".len().to_string();
    let output = ws.run("complete", &["--offset", offset.as_str()], &input);
    assert!(output.status.success());
    let labels: Vec<String> = stdout(&output)
        .lines()
        .filter_map(|line| line.split_whitespace().next().map(str::to_string))
        .collect();
    assert_eq!(labels, vec!["BLUE", "GREEN", "RED"]);
}

#[test]
fn hover_prints_documentation() {
    let ws = Workspace::new();
    let input = ws.file("app.yml", "server:\n  port: 8080\n");
    let offset = "server:\n  po".len().to_string();
    let output = ws.run("hover", &["--offset", offset.as_str(), "--links"], &input);
    assert!(output.status.success());
    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("server.port"));
    assert!(lines.next().unwrap().contains("Default: <i>8080</i>"));
    assert_eq!(
        lines.next(),
        Some("-> org.acme.web.ServerProperties.setPort(Integer)")
    );
}

#[test]
fn bad_offset_is_an_error() {
    let ws = Workspace::new();
    let input = ws.file("app.yml", "server:\n");
    let output = ws.run("hover", &["--offset", "99"], &input);
    assert!(!output.status.success());
}
