use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    saves: PathBuf,
    backups: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let saves = temp.path().join("Against the Storm");
        let backups = temp.path().join("backups");
        fs::create_dir(&saves).unwrap();
        fs::write(
            saves.join("MetaSave.save"),
            r#"{"gameplay": {"hasActiveGame": true}}"#,
        )
        .unwrap();
        fs::write(saves.join("Profiles.save"), "{}").unwrap();
        fs::write(
            saves.join("Save.save"),
            r#"{"gameplay": {"year": 2, "season": 1}}"#,
        )
        .unwrap();
        fs::write(saves.join("WorldSave.save"), "world").unwrap();
        Self {
            _temp: temp,
            saves,
            backups,
        }
    }

    fn atss(&self) -> Command {
        let mut cmd = Command::cargo_bin("atss").unwrap();
        cmd.env("ATSS_SAVES_DIR", &self.saves)
            .env("ATSS_BACKUPS_DIR", &self.backups)
            .env_remove("RUST_LOG");
        cmd
    }

    fn backup_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.backups)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("Bak."))
            .collect();
        names.sort();
        names
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn save_creates_backup_with_note() {
    let fixture = Fixture::new();

    fixture
        .atss()
        .args(["save", "--note", "before embark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your current game save is from"))
        .stdout(predicate::str::contains("Backup created"))
        .stdout(predicate::str::contains("[Y2 clearance] before embark"));

    let names = fixture.backup_names();
    assert_eq!(names.len(), 1);
    let sidecar = read(&fixture.backups.join(&names[0]).join("atss.json"));
    assert!(sidecar.contains("\"note\": \"before embark\""));
    assert!(sidecar.contains("\"season\": 5"));
}

#[test]
fn list_without_backups() {
    let fixture = Fixture::new();

    fixture
        .atss()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn list_shows_saved_backup() {
    let fixture = Fixture::new();
    fixture.atss().arg("save").assert().success();

    fixture
        .atss()
        .args(["list", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"))
        .stdout(predicate::str::contains("Hash: "));
}

#[test]
fn restore_requires_force() {
    let fixture = Fixture::new();
    fixture.atss().arg("save").assert().success();
    fs::write(
        fixture.saves.join("Save.save"),
        r#"{"gameplay": {"year": 3, "season": 0}}"#,
    )
    .unwrap();

    fixture
        .atss()
        .args(["restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    assert!(read(&fixture.saves.join("Save.save")).contains("\"year\": 3"));
}

#[test]
fn restore_with_force_keeps_overwritten_state() {
    let fixture = Fixture::new();
    fixture.atss().arg("save").assert().success();
    // Same world save, so no process check is needed
    fs::write(
        fixture.saves.join("Save.save"),
        r#"{"gameplay": {"year": 3, "season": 0}}"#,
    )
    .unwrap();

    fixture
        .atss()
        .args(["restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"))
        .stdout(predicate::str::contains("Bak.overwritten"));

    assert!(read(&fixture.saves.join("Save.save")).contains("\"year\": 2"));
    assert!(read(&fixture.backups.join("Bak.overwritten").join("Save.save"))
        .contains("\"year\": 3"));

    fixture
        .atss()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[overwritten]"))
        .stdout(predicate::str::contains("Total: 2 backup(s)"));
}

#[test]
fn restore_unknown_backup_fails() {
    let fixture = Fixture::new();

    fixture
        .atss()
        .args(["restore", "Bak.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found: Bak.nope"));
}

#[test]
fn delete_requires_force() {
    let fixture = Fixture::new();
    fixture.atss().arg("save").assert().success();
    let name = fixture.backup_names().remove(0);

    fixture
        .atss()
        .args(["delete", &name])
        .assert()
        .success()
        .stdout(predicate::str::contains("To be deleted:"));
    assert_eq!(fixture.backup_names(), vec![name.clone()]);

    fixture
        .atss()
        .args(["delete", &name, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 backup(s)."));
    assert!(fixture.backup_names().is_empty());
}

#[test]
fn config_shows_paths() {
    let fixture = Fixture::new();

    fixture
        .atss()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Against the Storm.exe"))
        .stdout(predicate::str::contains(
            fixture.backups.to_string_lossy().to_string(),
        ));
    assert!(fixture.backups.join("settings.json").exists());
}

#[test]
fn missing_saves_directory_fails() {
    let fixture = Fixture::new();
    fs::remove_dir_all(&fixture.saves).unwrap();

    fixture
        .atss()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
