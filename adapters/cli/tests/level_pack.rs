use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

const CONFIG: &str = r#"{
    "rawMapFile": "Levels/Level_1/Level_1_Map",
    "initialDirection": "downRight",
    "goals": { "oneStar": 10, "twoStars": 6, "threeStars": 3 }
}"#;

fn pack_dir(name: &str, map: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("iso-dimension-{}-{name}", std::process::id()));
    let level_dir = root.join("Levels").join("Level_1");
    fs::create_dir_all(&level_dir).expect("create level directory");
    fs::write(level_dir.join("Level_1_Config.isoconfig"), CONFIG).expect("write config");
    fs::write(level_dir.join("Level_1_Map.isomap"), map).expect("write map");
    fs::write(root.join("levels.toml"), "version = 1\ncount = 1\n").expect("write manifest");
    root
}

fn iso_dimension(manifest: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iso-dimension"))
        .args(args)
        .arg(manifest)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run iso-dimension")
}

#[test]
fn validate_reports_each_level() {
    let root = pack_dir("validate", "SXR\nRXF\n");
    let output = iso_dimension(&root.join("levels.toml"), &["validate"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "validate failed: {stdout}");
    assert!(stdout.contains("level 1: 2x3 grid"), "{stdout}");
    assert!(stdout.contains("1 teleport pairs"), "{stdout}");
    assert!(stdout.contains("Red portals: (0, 2) <-> (1, 0)"), "{stdout}");
    let _ = fs::remove_dir_all(root);
}

#[test]
fn validate_fails_on_broken_maps() {
    let root = pack_dir("broken", "SXX\nSXF\n");
    let output = iso_dimension(&root.join("levels.toml"), &["validate"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("level 1"), "{stdout}");
    let _ = fs::remove_dir_all(root);
}

#[test]
fn run_plays_a_scripted_level() {
    let root = pack_dir("run", "SXXF\n");
    let output = iso_dimension(
        &root.join("levels.toml"),
        &["run", "--level", "1", "--script", "wait:0.5,pause:0.2,resume:0.1", "--no-music"],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "run failed: {stdout}");
    assert!(stdout.contains("final state: playing"), "{stdout}");
    let _ = fs::remove_dir_all(root);
}
