//! CLI integration tests for `mg`
//!
//! Each test lays out a migrations directory, policy and banned-patterns file
//! in a temp dir and runs the compiled binary against them.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled mg binary (resolved at compile time)
fn mg_bin() -> String {
    env!("CARGO_BIN_EXE_mg").to_string()
}

const POLICY: &str = r#"requiredFields:
  - change_id
  - title
  - risk
  - change_type
  - owner
riskLevels: [low, medium, high]
changeTypes: [additive, modification, deprecation, removal]
filenamePattern: '^V\d{3}__.+\.sql$'
"#;

const BANNED: &str = "# Tables are retired through a deprecation cycle\nDROP\\s+TABLE\n";

fn header(risk: &str) -> String {
    format!(
        "/*---\nchange_id: CHG-0001\ntitle: Create orders\nticket: OPS-1\nrisk: {risk}\n\
         change_type: additive\nbackward_compatible: true\nowner: data-platform\n\
         reviewers: [\"alice\"]\n---*/\n"
    )
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("migrations")).unwrap();
        std::fs::create_dir(dir.path().join("policy")).unwrap();
        std::fs::write(dir.path().join("policy/migration-policy.yaml"), POLICY).unwrap();
        std::fs::write(dir.path().join("policy/banned-patterns.txt"), BANNED).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn migration(&self, name: &str, content: &str) {
        std::fs::write(self.path("migrations").join(name), content).unwrap();
    }

    /// Run with default positional arguments from the workspace root.
    fn run(&self) -> Output {
        Command::new(mg_bin())
            .current_dir(self.root())
            .env_remove("MG_FILENAME_PATTERN")
            .env_remove("MG_REPORT_JSON")
            .output()
            .expect("Failed to run mg")
    }

    fn run_with<P: AsRef<OsStr>>(&self, args: &[P]) -> Output {
        Command::new(mg_bin())
            .current_dir(self.root())
            .args(args)
            .env_remove("MG_FILENAME_PATTERN")
            .env_remove("MG_REPORT_JSON")
            .output()
            .expect("Failed to run mg")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn error_lines(output: &Output) -> Vec<String> {
    stderr(output)
        .lines()
        .filter(|l| l.contains("[ERROR]"))
        .map(String::from)
        .collect()
}

// ── End-to-end scenarios ────────────────────────────────────────────────

#[test]
fn valid_migration_exits_zero() {
    let ws = Workspace::new();
    ws.migration(
        "V001__init.sql",
        &format!("{}CREATE TABLE orders (id INT PRIMARY KEY);\n", header("low")),
    );

    let output = ws.run();
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );
    assert!(error_lines(&output).is_empty());
    assert!(stdout(&output).contains("Validation complete: 11 validations, 0 failures"));
}

#[test]
fn invalid_risk_exits_one() {
    let ws = Workspace::new();
    ws.migration(
        "V001__init.sql",
        &format!("{}CREATE TABLE orders (id INT);\n", header("extreme")),
    );

    let output = ws.run();
    assert_eq!(output.status.code(), Some(1));
    let errors = error_lines(&output);
    assert_eq!(errors.len(), 1, "errors: {:?}", errors);
    assert!(errors[0].contains("'extreme'"));
}

#[test]
fn misnamed_migration_exits_one() {
    let ws = Workspace::new();
    ws.migration(
        "init_schema.sql",
        &format!("{}CREATE TABLE orders (id INT);\n", header("low")),
    );

    let output = ws.run();
    assert_eq!(output.status.code(), Some(1));
    let errors = error_lines(&output);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("init_schema.sql"));
}

#[test]
fn empty_migrations_dir_exits_zero() {
    let ws = Workspace::new();

    let output = ws.run();
    assert!(output.status.success());
    assert!(stdout(&output).contains("[WARN] No migration files found"));
    assert!(!stdout(&output).contains("Validation complete"));
}

#[test]
fn banned_pattern_exits_one() {
    let ws = Workspace::new();
    ws.migration(
        "V002__drop_orders.sql",
        &format!("{}DROP TABLE dbo.Orders;\n", header("high")),
    );

    let output = ws.run();
    assert_eq!(output.status.code(), Some(1));
    let errors = error_lines(&output);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(r"DROP\s+TABLE"));
    assert!(errors[0].contains("V002__drop_orders.sql"));
}

// ── Output format and setup failures ────────────────────────────────────

#[test]
fn lines_are_timestamped_and_leveled() {
    let ws = Workspace::new();
    ws.migration("V001__init.sql", &format!("{}SELECT 1;\n", header("low")));

    let output = ws.run();
    for line in stdout(&output).lines() {
        // [YYYY-MM-DD HH:MM:SS] [LEVEL] message
        assert!(line.starts_with('['), "line: {line}");
        assert_eq!(&line[20..23], "] [", "line: {line}");
    }
    assert!(stdout(&output).contains("[SUCCESS]"));
}

#[test]
fn warnings_do_not_fail_the_run() {
    let ws = Workspace::new();
    let content = header("medium").replace(
        "backward_compatible: true",
        "backward_compatible: false",
    );
    ws.migration(
        "V003__reshape.sql",
        &format!(
            "{content}ALTER TABLE orders DROP COLUMN legacy;\n\
             ALTER TABLE orders ALTER COLUMN amount SET NOT NULL;\n"
        ),
    );

    let output = ws.run();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("needs special review"));
    assert!(out.contains("DROP COLUMN"));
    assert!(out.contains("ALTER COLUMN ... NOT NULL"));
}

#[test]
fn missing_banned_patterns_file_warns() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.path("policy/banned-patterns.txt")).unwrap();
    ws.migration(
        "V001__init.sql",
        &format!("{}DROP TABLE t;\n", header("low")),
    );

    let output = ws.run();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("skipping banned pattern checks"));
    assert!(stdout(&output).contains("Validation complete: 10 validations, 0 failures"));
}

#[test]
fn missing_policy_exits_one() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.path("policy/migration-policy.yaml")).unwrap();

    let output = ws.run();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Policy file not found"));
}

#[test]
fn missing_migrations_dir_exits_one() {
    let ws = Workspace::new();
    let missing = ws.path("does-not-exist");

    let output = ws.run_with(&[&missing]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Migrations directory not found"));
}

#[test]
fn positional_paths_are_honored() {
    let ws = Workspace::new();
    std::fs::create_dir(ws.path("db")).unwrap();
    std::fs::write(
        ws.path("db/V001__init.sql"),
        format!("{}SELECT 1;\n", header("low")),
    )
    .unwrap();
    std::fs::write(ws.path("policy.json"), r#"{"requiredFields": ["title"]}"#).unwrap();
    std::fs::write(ws.path("banned.txt"), "SELECT\n").unwrap();

    let output = ws.run_with(&[ws.path("db"), ws.path("policy.json"), ws.path("banned.txt")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Banned pattern 'SELECT'"));
}

#[test]
fn every_file_is_validated() {
    let ws = Workspace::new();
    ws.migration("V001__broken.sql", "SELECT 1;\n");
    ws.migration("V002__fine.sql", &format!("{}SELECT 2;\n", header("low")));

    let output = ws.run();
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("Validating V001__broken.sql"));
    assert!(out.contains("Validating V002__fine.sql"));
    assert!(stderr(&output).contains("Missing metadata header in V001__broken.sql"));
}

#[test]
fn non_utf8_migration_does_not_stop_the_run() {
    let ws = Workspace::new();
    ws.migration("V001__good.sql", &format!("{}SELECT 1;\n", header("low")));
    let mut latin1 = header("low").into_bytes();
    latin1.extend_from_slice(b"INSERT INTO cafes VALUES ('Caf\xe9');\n");
    std::fs::write(ws.path("migrations/V002__latin1.sql"), latin1).unwrap();

    let output = ws.run();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Validating V001__good.sql"));
    assert!(out.contains("Validating V002__latin1.sql"));
    assert!(out.contains("Validation complete: 22 validations, 0 failures"));
}

#[test]
fn override_flags_are_rejected() {
    let ws = Workspace::new();
    let output = ws.run_with(&["--report-json", "report.json"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn json_report_written_when_requested() {
    let ws = Workspace::new();
    ws.migration(
        "V001__init.sql",
        &format!("{}SELECT 1;\n", header("extreme")),
    );
    let report_path = ws.path("report.json");

    let output = Command::new(mg_bin())
        .current_dir(ws.root())
        .env_remove("MG_FILENAME_PATTERN")
        .env("MG_REPORT_JSON", &report_path)
        .output()
        .expect("Failed to run mg");
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["failures"], 1);
}
