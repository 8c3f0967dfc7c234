use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let workspace = Self {
            root: TempDir::new().unwrap(),
        };
        for dir in ["drive", "backups", "tmp", "cwd"] {
            fs::create_dir_all(workspace.path(dir)).unwrap();
        }
        workspace
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join(name)
    }

    fn add_installation(&self, relative: &str) {
        let install = self.path("drive").join(relative);
        fs::create_dir_all(install.join("Drivers")).unwrap();
        fs::write(install.join("Drivers").join("plotter.drv"), "driver").unwrap();
        fs::write(install.join("Drivers").join("setup.exe"), "binary").unwrap();
        fs::write(install.join("Prefs.xml"), "<prefs/>").unwrap();
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("enroute-backup").unwrap();
        cmd.current_dir(self.path("cwd"))
            .env("TMPDIR", self.path("tmp"))
            .env("TMP", self.path("tmp"))
            .env("TEMP", self.path("tmp"))
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(self.path("drive"))
            .arg("--output")
            .arg(self.path("backups"));
        cmd
    }

    fn archives(&self) -> Vec<String> {
        entries(&self.path("backups"))
    }

    fn staging_dirs(&self) -> Vec<String> {
        entries(&self.path("tmp"))
    }
}

fn entries(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[test]
fn out_of_range_selection_exits_3_and_leaves_nothing() {
    let ws = Workspace::new();
    ws.add_installation("EnRoute9");

    ws.command()
        .args(["--select", "9", "--mode", "1", "--output-format", "plain"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid selection '9'"));

    assert!(ws.archives().is_empty());
    assert!(ws.staging_dirs().is_empty());
}

#[test]
fn invalid_mode_from_stdin_exits_3() {
    let ws = Workspace::new();
    ws.add_installation("EnRoute9");

    ws.command()
        .write_stdin("0\n7\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("[0]"))
        .stdout(predicate::str::contains("Backup mode:"));

    assert!(ws.archives().is_empty());
    assert!(ws.staging_dirs().is_empty());
}

#[test]
fn no_installations_exits_4() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.path("drive").join("Program Files")).unwrap();

    ws.command()
        .args(["--output-format", "plain"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No installations matching"));
}

#[test]
fn curated_backup_with_missing_items_exits_2_and_writes_archive() {
    let ws = Workspace::new();
    ws.add_installation("EnRoute9");

    ws.command()
        .args(["--select", "0", "--mode", "curated", "--output-format", "plain"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("item not found: Cutters"));

    let archives = ws.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("EnRoute_Backup_EnRoute9_"));
    assert!(archives[0].ends_with(".zip"));
    assert!(ws.staging_dirs().is_empty());
}

#[test]
fn configured_items_all_present_exits_0() {
    let ws = Workspace::new();
    ws.add_installation("Apps/EzyNest4");
    let config = ws.path("cwd").join("enroute-backup.toml");
    fs::write(
        &config,
        "[backup]\ncurated_items = [\"Drivers\", \"Prefs.xml\"]\n",
    )
    .unwrap();

    ws.command()
        .args(["--select", "all", "--mode", "1", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files_copied\": 2"));

    let archives = ws.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("EnRoute_Backup_All_"));
}

#[test]
fn dry_run_reports_plan_without_archive() {
    let ws = Workspace::new();
    ws.add_installation("EnRoute9");

    ws.command()
        .args(["--dry-run", "--mode", "full", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EnRoute9: 2 files planned, 1 excluded"));

    assert!(ws.archives().is_empty());
    assert!(ws.staging_dirs().is_empty());
}

#[test]
fn generate_config_writes_sample() {
    let ws = Workspace::new();
    let config = ws.path("cwd").join("sample.toml");

    Command::cargo_bin("enroute-backup")
        .unwrap()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("[discovery]"));
    assert!(content.contains("excluded_extensions"));
}
