use std::path::Path;
use std::process::Command;

fn scout() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scout"))
}

fn add_plugin_dir(root: &Path, name: &str, exports: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("plugin.toml"),
        format!("name = \"{}\"\n\n[exports]\n{}", name, exports),
    )
    .unwrap();
}

#[test]
fn test_scout_version() {
    let output = scout().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_scout_help() {
    let output = scout().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("discover"));
    assert!(stdout.contains("init"));
}

#[test]
fn test_scout_discover_strip_prefix() {
    let dir = tempfile::tempdir().unwrap();
    add_plugin_dir(dir.path(), "test-prefix-bacon-maker", "name = \"bacon\"\n");
    add_plugin_dir(dir.path(), "test-prefix-cake-maker", "name = \"cake\"\n");

    for mode in [None, Some("--sync")] {
        let mut cmd = scout();
        cmd.args(["discover", "--prefix", "test-prefix", "--strategy", "strip-prefix"])
            .args(["--no-cwd", "--no-global", "--search-path"])
            .arg(dir.path())
            .env_remove("PLUGSCOUT_PATH");
        if let Some(flag) = mode {
            cmd.arg(flag);
        }
        let output = cmd.output().unwrap();

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let dictionary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(
            dictionary,
            serde_json::json!({
                "bacon-maker": {"name": "bacon"},
                "cake-maker": {"name": "cake"},
            })
        );
    }
}

#[test]
fn test_scout_discover_seeds_search_paths_from_env() {
    let seeded = tempfile::tempdir().unwrap();
    let configured = tempfile::tempdir().unwrap();
    add_plugin_dir(seeded.path(), "sx-env-only", "id = \"env\"\n");
    add_plugin_dir(seeded.path(), "sx-a", "id = \"shared\"\norigin = \"env\"\n");
    add_plugin_dir(configured.path(), "sx-b", "id = \"shared\"\norigin = \"flag\"\n");

    let output = scout()
        .args(["discover", "--no-cwd", "--no-global", "--strategy", "property"])
        .args(["--key-property", "id", "--search-path"])
        .arg(configured.path())
        .env("PLUGSCOUT_PATH", seeded.path())
        .env("RUST_LOG", "info")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let dictionary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dictionary["env"], serde_json::json!({"id": "env"}));
    // seeded directory is scanned first, so the configured copy wins the shared key
    assert_eq!(dictionary["shared"]["origin"], "flag");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let expected = format!("{}:{}", seeded.path().display(), configured.path().display());
    assert!(stderr.contains(&expected), "{}", stderr);
}

#[test]
fn test_scout_discover_missing_export_fails() {
    let dir = tempfile::tempdir().unwrap();
    add_plugin_dir(dir.path(), "sx-bacon", "name = \"bacon\"\n");

    let output = scout()
        .args(["discover", "--no-cwd", "--no-global", "--import-named", "factory", "--search-path"])
        .arg(dir.path())
        .env_remove("PLUGSCOUT_PATH")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("factory"));
}

#[test]
fn test_scout_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scout.toml");

    let output = scout().arg("init").arg(&path).output().unwrap();

    assert!(output.status.success());
    assert!(std::fs::read_to_string(&path).unwrap().contains("[discovery]"));
}
