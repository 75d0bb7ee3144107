#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{TempDir, tempdir};

#[allow(deprecated)]
fn run_cli(dir: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("HATIM_DB_PATH", dir.path().join("hatim.sqlite3"))
        .env("HATIM_LOCAL_STORAGE_PATH", dir.path().join("local.json"))
        .env("RUST_LOG", "off")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_builds_a_reading_grid() {
    let dir = tempdir().unwrap();
    run_cli(
        &dir,
        "new Ramazan Hatmi\nadd 200 Ali Yılmaz\nadd 404 Ayşe Demir\ndates 2025-03-07 2025-03-08\nshow\nstats\nquit\n",
    )
    .success()
    .stdout(str_contains("Created hatim local_"))
    .stdout(str_contains("07.03.2025 CUMA"))
    .stdout(str_contains("201-604"))
    .stdout(str_contains("Total pages     : 604"))
    .stdout(str_contains("Cycle complete  : 100.00%"));
}

#[test]
fn cli_reports_date_validation_errors() {
    let dir = tempdir().unwrap();
    run_cli(&dir, "new Hatim\ndates 2025-01-10 2025-01-05\nquit\n")
        .success()
        .stdout(str_contains("Start date must be on or before end date."));
}

#[test]
fn cli_requires_an_open_hatim() {
    let dir = tempdir().unwrap();
    run_cli(&dir, "add 20 Ali\nquit\n")
        .success()
        .stdout(str_contains("No hatim open."));
}

#[test]
fn cli_guest_hatims_persist_between_runs() {
    let dir = tempdir().unwrap();
    run_cli(&dir, "new Kalıcı Hatim\nadd 20 Ali\nquit\n").success();
    run_cli(&dir, "list\nquit\n")
        .success()
        .stdout(str_contains("Kalıcı Hatim"))
        .stdout(str_contains("participants=1 pages=20/604"));
}

#[test]
fn cli_delete_command_removes_hatim() {
    let dir = tempdir().unwrap();
    let assert = run_cli(&dir, "new Silinecek\ndelete\nlist\nquit\n").success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let after_delete = output
        .split("Deleted hatim local_")
        .nth(1)
        .expect("delete confirmation");
    assert!(
        after_delete.contains("No hatims yet."),
        "list should be empty after delete:\n{}",
        after_delete
    );
}

#[test]
fn cli_exports_spreadsheet_and_pdf() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("hatim.csv");
    let pdf_path = dir.path().join("ali.json");
    let script = format!(
        "new Hatim\nadd 300 Ali\nadd 304 Ayşe\ndates 2025-03-01 2025-03-02\nexport csv {}\nexport pdf {} 1\nquit\n",
        csv_path.display(),
        pdf_path.display()
    );
    run_cli(&dir, &script)
        .success()
        .stdout(str_contains("Exported csv"))
        .stdout(str_contains("Exported pdf"));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.contains("1,Ali,300,1-300,301-600"));
    let pdf = std::fs::read_to_string(&pdf_path).unwrap();
    assert!(pdf.contains("601-604"));
}

#[test]
fn cli_sign_in_switches_session() {
    let dir = tempdir().unwrap();
    run_cli(
        &dir,
        "signup lider@example.com secret1\nsignin lider@example.com secret1\nwhoami\nnew Bulut\nsignout\nwhoami\nquit\n",
    )
    .success()
    .stdout(str_contains("Registered lider@example.com."))
    .stdout(str_contains("Signed in as lider@example.com"))
    .stdout(str_contains("Guest session"));
}
