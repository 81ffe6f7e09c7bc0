use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_pack_help() {
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args(["pack", "--help"]);
    cmd.assert().success();
}

#[test]
fn test_profiles_lists_every_profile() {
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.arg("profiles");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("winrar_zip"))
        .stdout(predicate::str::contains("winrar_rar"))
        .stdout(predicate::str::contains("7zip_7z"))
        .stdout(predicate::str::contains("7zip_zip"))
        .stdout(predicate::str::contains("zpaq_zpaq"));
}

#[test]
fn test_pack_missing_args() {
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.arg("pack");
    cmd.assert().failure();
}

#[test]
fn test_pack_nonexistent_project_folder() {
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args(["pack", "/definitely/not/a/real/path"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("packing run failed"));
}

#[test]
fn test_pack_empty_project_folder() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args(["pack", &temp_dir.path().to_string_lossy()]);
    cmd.assert().success();
}

#[test]
fn test_pack_rejects_zero_budget() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args(["pack", &temp_dir.path().to_string_lossy(), "-s", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid --max-size-kb"));
}

#[test]
fn test_pack_rejects_unknown_profile() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args([
        "pack",
        &temp_dir.path().to_string_lossy(),
        "--profile",
        "tarball",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile"));
}

#[test]
fn test_pack_rejects_inverted_quality_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args([
        "pack",
        &temp_dir.path().to_string_lossy(),
        "--initial-jpeg-quality",
        "10",
        "--min-jpeg-quality",
        "90",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid quality bounds"));
}

#[test]
fn test_pack_missing_archiver_does_not_abort_the_run() {
    let project = common::create_project_dir();
    common::create_banner_folder(project.path(), "banner_a");
    common::create_banner_folder(project.path(), "banner_b");

    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args([
        "pack",
        &project.path().to_string_lossy(),
        "--archiver-path",
        "hyperzip-no-such-archiver",
        "--no-images",
        "--no-minify",
        "-j",
        "1",
    ]);
    // Each folder fails but the run itself completes.
    cmd.assert().success();

    assert!(!project.path().join("banner_a.zip").exists());
    assert!(!project.path().join("banner_b.zip").exists());
    // No staging leftovers either.
    assert!(!project.path().join("banner_a_temp").exists());
    assert!(!project.path().join("banner_b_temp").exists());
}

#[test]
fn test_pack_quiet_suppresses_output() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("hyperzip").unwrap();
    cmd.args(["-q", "pack", &temp_dir.path().to_string_lossy()]);
    cmd.assert().success().stdout(predicate::str::is_empty());
}
