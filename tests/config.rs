//! Configuration system tests
//!
//! Tests for config paths, engine config, and layered keymap loading.

mod common;

use std::fs;

use chordmap::config::EngineConfig;
use chordmap::config_paths;
use chordmap::keymap::{
    check_keymap_yaml, load_keymap_file, load_keymaps, workspace_keymap_path, KeyAction,
    KeybindingRegistry, KeymapError, KeymapSources, Scope, StatusText,
};
use chordmap::ChordRuntime;

use common::{executed, Driver};

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    if let Some(dir) = config_paths::config_dir() {
        assert!(dir.to_string_lossy().contains("chordmap"));
    }
}

#[test]
fn test_keymap_and_config_files_are_yaml() {
    if let (Some(keymap), Some(config)) = (config_paths::keymap_file(), config_paths::config_file())
    {
        assert!(keymap.ends_with("keymap.yaml"));
        assert!(config.ends_with("config.yaml"));
        assert_eq!(keymap.parent(), config.parent());
    }
}

#[test]
fn test_logs_dir_under_config_dir() {
    if let (Some(logs), Some(config)) = (config_paths::logs_dir(), config_paths::config_dir()) {
        assert!(logs.starts_with(config));
    }
}

#[test]
fn test_workspace_keymap_path() {
    let path = workspace_keymap_path(std::path::Path::new("/project"));
    assert!(path.ends_with(".chordmap/keymap.yaml"));
}

// ========================================================================
// Engine Config Tests
// ========================================================================

#[test]
fn test_engine_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::load_from(&dir.path().join("config.yaml"));
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.chord_timeout().as_millis(), 5000);
}

#[test]
fn test_engine_config_reads_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "chord_timeout_ms: 1500\n").unwrap();
    assert_eq!(EngineConfig::load_from(&path).chord_timeout_ms, 1500);
}

#[test]
fn test_engine_config_malformed_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "chord_timeout_ms: [not a number\n").unwrap();
    assert_eq!(EngineConfig::load_from(&path), EngineConfig::default());
}

// ========================================================================
// Keymap File Tests
// ========================================================================

#[test]
fn test_load_keymap_file_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_keymap_file(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, KeymapError::Io { .. }));
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn test_load_keymap_file_skips_bad_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.yaml");
    fs::write(
        &path,
        r#"
bindings:
  - key: "ctrl+s"
    command: save
  - key: "ctrl+hyper+s"
    command: broken
  - key: "ctrl+o"
    command: open
    when: "a &&"
  - key: "ctrl+p"
    command: print
    when: "   "
"#,
    )
    .unwrap();

    let bindings = load_keymap_file(&path).unwrap();
    let commands: Vec<_> = bindings.iter().map(|b| b.command.as_str()).collect();
    assert_eq!(commands, vec!["save", "print"]);
    assert!(bindings[1].when.is_none());
}

#[test]
fn test_check_keymap_reports_entry_indices() {
    let problems = check_keymap_yaml(
        r#"
bindings:
  - key: "ctrl+s"
    command: save
  - key: ""
    command: empty
  - key: "ctrl+o"
    command: open
    when: "x =~ /abc"
"#,
    )
    .unwrap();
    let indices: Vec<_> = problems.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2]);
    assert!(matches!(problems[0].1, KeymapError::InvalidKey(_)));
    assert!(matches!(problems[1].1, KeymapError::InvalidCondition(_)));
}

#[test]
fn test_check_keymap_structural_error() {
    assert!(matches!(
        check_keymap_yaml("bindings: 42"),
        Err(KeymapError::Yaml(_))
    ));
}

// ========================================================================
// Layered Loading Tests
// ========================================================================

#[test]
fn test_load_keymaps_layers_user_and_workspace() {
    let home = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();

    let user = home.path().join("keymap.yaml");
    fs::write(
        &user,
        "bindings:\n  - key: \"ctrlcmd+s\"\n    command: user.save\n",
    )
    .unwrap();

    let workspace_file = workspace_keymap_path(workspace.path());
    fs::create_dir_all(workspace_file.parent().unwrap()).unwrap();
    fs::write(
        &workspace_file,
        "bindings:\n  - key: \"ctrlcmd+s\"\n    command: workspace.save\n  - key: \"f9\"\n    command: workspace.build\n",
    )
    .unwrap();

    let sources = KeymapSources {
        user: Some(user),
        workspace: Some(workspace_file),
    };
    let mut registry = KeybindingRegistry::new();
    let summary = load_keymaps(&mut registry, &sources);

    assert!(summary.default > 0);
    assert_eq!(summary.user, 1);
    assert_eq!(summary.workspace, 2);
    assert_eq!(summary.total(), registry.len());

    let mut driver = Driver::new(ChordRuntime::with_status(registry, StatusText::new()));
    assert_eq!(driver.press("ctrlcmd+s"), executed("workspace.save"));
    assert_eq!(driver.press("f9"), executed("workspace.build"));

    driver.runtime.reset_keybindings();
    assert_eq!(
        driver.press("ctrlcmd+s"),
        executed("workbench.action.files.save")
    );
    assert_eq!(driver.press("f9"), KeyAction::NoMatch);
}

#[test]
fn test_load_keymaps_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "bindings: {oops").unwrap();

    let sources = KeymapSources {
        user: Some(dir.path().join("absent.yaml")),
        workspace: Some(broken),
    };
    let mut registry = KeybindingRegistry::new();
    let summary = load_keymaps(&mut registry, &sources);

    assert_eq!(summary.user, 0);
    assert_eq!(summary.workspace, 0);
    assert!(registry.bindings(Scope::User).is_empty());
    assert_eq!(registry.len(), summary.default);
}

#[test]
fn test_runtime_uses_configured_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "chord_timeout_ms: 250\n").unwrap();
    let config = EngineConfig::load_from(&path);

    let runtime = ChordRuntime::new(KeybindingRegistry::new()).with_timeout(config.chord_timeout());
    assert_eq!(runtime.timeout().as_millis(), 250);
}
