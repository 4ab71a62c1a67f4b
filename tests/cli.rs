use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--database"));
}

#[test]
fn exit_choice_ends_with_status_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.arg("--database").arg(dir.path().join("wb.db"));
    cmd.write_stdin("6\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--- World Bank Public Data Set ---"))
        .stdout(predicate::str::contains("6. Exit"))
        .stdout(predicate::str::contains("Goodbye."));
}

#[test]
fn database_path_can_come_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("env.db");
    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.env("WBI_DATABASE", &db).write_stdin("6\n");
    cmd.assert().success();
    assert!(db.exists());
}

#[test]
fn import_then_export_json() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("wb.db");
    let seed = dir.path().join("seed.csv");
    let out = dir.path().join("out.json");
    fs::write(
        &seed,
        "code,name,internet_users,adult_literacy_rate\nUSA,United States,87,99\nZWE,Zimbabwe,,86.5\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.arg("--database")
        .arg(&db)
        .arg("--import")
        .arg(&seed)
        .arg("--export")
        .arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Imported 2 countries"));

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);

    // the menu sees the imported rows
    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.arg("--database").arg(&db).write_stdin("2\n6\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Literacy: minimum 86.50, maximum 99.00"));
}

#[test]
fn unusable_database_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("future.db");
    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    let mut cmd = Command::cargo_bin("wbi-literacy").unwrap();
    cmd.arg("--database").arg(&db).write_stdin("6\n");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot open database"));
}
