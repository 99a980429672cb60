use super::*;
use mg_core::EventLevel;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("migrations")).unwrap();
        std::fs::write(
            dir.path().join("policy.yaml"),
            "requiredFields: [title, risk]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("banned.txt"), "DROP\\s+TABLE\n").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn migration(&self, name: &str, content: &str) {
        std::fs::write(self.path("migrations").join(name), content).unwrap();
    }

    fn cli(&self) -> Cli {
        Cli {
            migrations_dir: self.path("migrations"),
            policy_file: self.path("policy.yaml"),
            banned_patterns_file: self.path("banned.txt"),
            filename_pattern: None,
            report_json: None,
        }
    }
}

#[test]
fn build_report_validates_migrations() {
    let fx = Fixture::new();
    fx.migration(
        "V001__init.sql",
        "/*---\ntitle: Init\nrisk: low\n---*/\nCREATE TABLE t (id INT);",
    );

    let report = build_report(&fx.cli()).unwrap();
    assert_eq!(report.files, 1);
    assert_eq!(report.failures, 0);
    // header + 2 required + risk + naming + 1 banned + heuristic
    assert_eq!(report.validations, 7);
}

#[test]
fn missing_banned_patterns_warns_and_skips() {
    let fx = Fixture::new();
    fx.migration(
        "V001__init.sql",
        "/*---\ntitle: Init\nrisk: low\n---*/\nDROP TABLE t;",
    );
    let mut cli = fx.cli();
    cli.banned_patterns_file = fx.path("absent.txt");

    let report = build_report(&cli).unwrap();
    assert_eq!(report.failures, 0);
    assert_eq!(report.validations, 6);
    assert!(report
        .events
        .iter()
        .any(|e| e.level == EventLevel::Warn && e.message.contains("absent.txt")));
}

#[test]
fn missing_policy_is_fatal() {
    let fx = Fixture::new();
    let mut cli = fx.cli();
    cli.policy_file = fx.path("nope.yaml");

    let err = build_report(&cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Policy file not found"));
}

#[test]
fn missing_migrations_dir_is_fatal() {
    let fx = Fixture::new();
    let mut cli = fx.cli();
    cli.migrations_dir = fx.path("nowhere");

    let err = build_report(&cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Migrations directory not found"));
}

#[test]
fn filename_pattern_override_applies() {
    let fx = Fixture::new();
    fx.migration(
        "V1__init.sql",
        "/*---\ntitle: Init\nrisk: low\n---*/\nSELECT 1;",
    );

    let report = build_report(&fx.cli()).unwrap();
    assert_eq!(report.failures, 1);

    let mut cli = fx.cli();
    cli.filename_pattern = Some(r"^V\d+__.+\.sql$".to_string());
    let report = build_report(&cli).unwrap();
    assert_eq!(report.failures, 0);
}

#[test]
fn execute_writes_json_report() {
    let fx = Fixture::new();
    fx.migration(
        "V001__init.sql",
        "/*---\ntitle: Init\nrisk: low\n---*/\nSELECT 1;",
    );
    let mut cli = fx.cli();
    cli.report_json = Some(fx.path("report.json"));

    execute(&cli).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fx.path("report.json")).unwrap()).unwrap();
    assert_eq!(json["outcome"], "passed");
    assert_eq!(json["failures"], 0);
    assert_eq!(json["files"], 1);
    assert!(json["events"].as_array().unwrap().len() > 1);
}

#[test]
fn execute_signals_failure_with_exit_code() {
    let fx = Fixture::new();
    fx.migration("init_schema.sql", "/*---\ntitle: Init\nrisk: low\n---*/\n");

    let err = execute(&fx.cli()).unwrap_err();
    let code = err.downcast_ref::<ExitCode>().map(|c| c.0);
    assert_eq!(code, Some(1));
}
