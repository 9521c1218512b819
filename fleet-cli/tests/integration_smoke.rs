//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

/// `fleetctl` running in an empty directory with no database configured.
fn fleetctl(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fleetctl").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("FLEET_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .env_remove("FLEET_BIND_ADDR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_serve_help() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-migrations"));
}

#[test]
fn test_migrate_print_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .args(["migrate", "--print", "--dialect", "sqlite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS users"))
        .stdout(predicate::str::contains("AUTOINCREMENT"));
}

#[test]
fn test_migrate_print_mysql() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .args(["migrate", "--print", "--dialect", "mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ENGINE=InnoDB"));
}

#[test]
fn test_missing_connection_string_fails() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no database connection string"));
}

#[test]
fn test_check_config_masks_password() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .env("FLEET_DATABASE_URL", "mysql://fleet:hunter2@db/fleet")
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleet:***@db"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_check_config_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("fleet.toml"),
        "[database]\nurl = \"sqlite://fleet.db\"\n\n[http]\nbind_addr = \"127.0.0.1:9090\"\n",
    )
    .unwrap();

    fleetctl(&dir)
        .args(["check-config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bindAddr\": \"127.0.0.1:9090\""))
        .stdout(predicate::str::contains("Sqlite"));
}

#[test]
fn test_migrate_creates_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    fleetctl(&dir)
        .args(["migrate", "--database-url", "sqlite://fleet.db?mode=rwc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema up to date (17 tables)"));
    assert!(dir.path().join("fleet.db").exists());
}
