use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{rtb, setup_test_db, temp_out};

/// init + one cost profile, two users and an allocation project with a March contract.
fn init_catalog(db_path: &str) {
    rtb()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for args in [
        vec!["profile", "add", "Dev", "--cost", "50"],
        vec!["user", "add", "Ana", "ana@example.com", "--role", "gestor", "--profile", "1"],
        vec!["user", "add", "Bruno", "bruno@example.com", "--cost", "30,5"],
        vec!["project", "add", "Portal", "--model", "alocacao", "--manager", "1", "--client", "ACME"],
        vec![
            "project", "contract", "1", "2025-03", "--profile", "1", "--hours", "10", "--price", "100",
            "--price-additional", "120", "--price-off-hours", "150", "--price-overtime", "200",
        ],
    ] {
        rtb().args(["--db", db_path]).args(&args).assert().success();
    }
}

#[test]
fn test_init_and_db_info() {
    let db_path = setup_test_db("cli_init");

    rtb()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("rTimebill initialization completed"));

    rtb()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Timesheet entries"));

    rtb()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_catalog_listing() {
    let db_path = setup_test_db("cli_catalog");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "user", "list"])
        .assert()
        .success()
        .stdout(contains("ana@example.com").and(contains("GESTOR")).and(contains("30.50")));

    rtb()
        .args(["--db", &db_path, "project", "list"])
        .assert()
        .success()
        .stdout(contains("Portal").and(contains("ALOCACAO")).and(contains("ACME")));

    rtb()
        .args(["--db", &db_path, "user", "add", "Ana 2", "ana@example.com"])
        .assert()
        .code(1)
        .stderr(contains("already registered"));
}

#[test]
fn test_timesheet_span_and_report() {
    let db_path = setup_test_db("cli_timesheet_report");
    init_catalog(&db_path);

    rtb()
        .args([
            "--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--user", "1",
            "--start", "09:00", "--end", "18:00",
        ])
        .assert()
        .success()
        .stdout(contains("9.00 h").and(contains("NORMAL")));

    rtb()
        .args([
            "--db", &db_path, "report", "project-month", "--from", "2025-03-01", "--to", "2025-03-31",
        ])
        .assert()
        .success()
        .stdout(contains("Portal").and(contains("2025-03")).and(contains("900.00")).and(contains("450.00")));
}

#[test]
fn test_manual_cap_exit_code() {
    let db_path = setup_test_db("cli_cap");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--user", "1", "--hours", "5"])
        .assert()
        .success();

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--user", "1", "--hours", "8"])
        .assert()
        .code(1)
        .stderr(contains("daily manual-entry cap exceeded"));
}

#[test]
fn test_timesheet_user_from_as_user() {
    let db_path = setup_test_db("cli_as_user");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--hours", "2"])
        .assert()
        .code(1)
        .stderr(contains("no user given"));

    rtb()
        .args([
            "--db", &db_path, "--as-user", "2", "timesheet", "2025-03-03", "--project", "1", "--hours", "2",
        ])
        .assert()
        .success()
        .stdout(contains("for user #2"));

    rtb()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("actor=2"));
}

#[test]
fn test_invalid_inputs_are_client_errors() {
    let db_path = setup_test_db("cli_invalid");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-02-30", "--project", "1", "--user", "1", "--hours", "1"])
        .assert()
        .code(1)
        .stderr(contains("invalid date"));

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--user", "1", "--hours", "abc"])
        .assert()
        .code(1)
        .stderr(contains("invalid hours"));

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "42", "--user", "1", "--hours", "1"])
        .assert()
        .code(1)
        .stderr(contains("Not found"));

    rtb()
        .args(["--db", &db_path, "report", "capacity", "--from", "2025-03-31", "--to", "2025-03-01"])
        .assert()
        .code(1);
}

#[test]
fn test_punches_and_compliance_report() {
    let db_path = setup_test_db("cli_punches");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "punch", "2", "2025-03-03", "entrada"])
        .assert()
        .success()
        .stdout(contains("ENTRADA"));

    rtb()
        .args(["--db", &db_path, "punch", "2", "2025-03-03", "saida"])
        .assert()
        .success()
        .stdout(contains("ENTRADA → SAIDA"));

    rtb()
        .args(["--db", &db_path, "punch", "2", "2025-03-03", "saida-almoco"])
        .assert()
        .code(1)
        .stderr(contains("cannot follow"));

    let out = temp_out("cli_compliance", "csv");
    rtb()
        .args([
            "--db", &db_path, "report", "compliance", "--from", "2025-03-01", "--to", "2025-03-31",
            "--format", "csv", "--file", &out,
        ])
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("missing"));
    assert!(csv.contains("Bruno"));
    assert!(csv.contains("ENTRADA SAIDA"));
}

#[test]
fn test_bank_movements() {
    let db_path = setup_test_db("cli_bank");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "bank", "add", "2", "4", "--note", "saturday"])
        .assert()
        .success();

    rtb()
        .args(["--db", &db_path, "bank", "add", "2", "-1.5"])
        .assert()
        .success()
        .stdout(contains("+2.50"));

    rtb()
        .args(["--db", &db_path, "bank", "balance", "2"])
        .assert()
        .success()
        .stdout(contains("saturday").and(contains("+2.50")));
}

#[test]
fn test_lifecycle_commands() {
    let db_path = setup_test_db("cli_lifecycle");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "user", "deactivate", "2"])
        .assert()
        .success();

    rtb()
        .args(["--db", &db_path, "user", "deactivate", "2"])
        .assert()
        .code(1)
        .stderr(contains("already inactive"));

    rtb()
        .args(["--db", &db_path, "punch", "2", "2025-03-03", "entrada"])
        .assert()
        .code(1)
        .stderr(contains("inactive"));

    rtb()
        .args(["--db", &db_path, "user", "activate", "2"])
        .assert()
        .success();

    rtb()
        .args(["--db", &db_path, "project", "status", "1", "pausado"])
        .assert()
        .success()
        .stdout(contains("PAUSADO"));
}

#[test]
fn test_report_exports() {
    let db_path = setup_test_db("cli_exports");
    init_catalog(&db_path);

    rtb()
        .args(["--db", &db_path, "timesheet", "2025-03-03", "--project", "1", "--user", "1", "--hours", "6"])
        .assert()
        .success();

    let json = temp_out("cli_profitability", "json");
    rtb()
        .args(["--db", &db_path, "report", "profitability", "--format", "json", "--file", &json])
        .assert()
        .success();
    let content = fs::read_to_string(&json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["rows"][0]["project"], "Portal");

    // an existing report file is only replaced with --force
    rtb()
        .args(["--db", &db_path, "report", "profitability", "--format", "json", "--file", &json])
        .assert()
        .code(1)
        .stderr(contains("--force"));
    rtb()
        .args(["--db", &db_path, "report", "profitability", "--format", "json", "--file", &json, "--force"])
        .assert()
        .success();

    let mut nested = std::env::temp_dir();
    nested.push("rtimebill_reports_out");
    fs::remove_dir_all(&nested).ok();
    let nested_csv = nested.join("month.csv").to_string_lossy().to_string();
    rtb()
        .args(["--db", &db_path, "report", "project-month", "--format", "csv", "--file", &nested_csv])
        .assert()
        .success();
    assert!(fs::metadata(&nested_csv).is_ok());

    let xlsx = temp_out("cli_capacity", "xlsx");
    rtb()
        .args([
            "--db", &db_path, "report", "capacity", "--from", "2025-03-01", "--format", "xlsx", "--file", &xlsx,
        ])
        .assert()
        .success();
    assert!(fs::metadata(&xlsx).unwrap().len() > 0);

    rtb()
        .args(["--db", &db_path, "report", "collaborator", "--format", "csv"])
        .assert()
        .code(1)
        .stderr(contains("--file is required"));
}

#[test]
fn test_config_check_and_migrate() {
    let mut home = std::env::temp_dir();
    home.push("rtimebill_cfg_home");
    fs::create_dir_all(&home).unwrap();
    let db_path = setup_test_db("cli_config");
    fs::write(home.join("rtimebill.conf"), format!("database: {db_path}\n")).unwrap();

    let cfg_cmd = |flag: &str| {
        let mut cmd = rtb();
        cmd.env("RTIMEBILL_HOME", &home).args(["config", flag]);
        cmd
    };

    cfg_cmd("--check")
        .assert()
        .success()
        .stdout(contains("Missing keys").and(contains("daily_manual_cap_hours")));

    cfg_cmd("--migrate").assert().success();

    cfg_cmd("--check")
        .assert()
        .success()
        .stdout(contains("up to date"));

    let migrated = fs::read_to_string(home.join("rtimebill.conf")).unwrap();
    assert!(migrated.contains("weeks_per_month"));

    cfg_cmd("--print")
        .assert()
        .success()
        .stdout(contains("report_max_rows"));
}
