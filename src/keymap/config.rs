//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into Keybinding structs.
//!
//! ```yaml
//! bindings:
//!   - key: "ctrlcmd+k ctrlcmd+c"
//!     command: editor.action.addCommentLine
//!     when: editorFocus && !editorReadonly
//!     priority: 100
//!   - key: "meta+left"
//!     command: cursorHome
//!     platform: macos
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::binding::Keybinding;
use super::error::KeymapError;
use super::sequence::KeySequence;
use super::when::WhenClause;

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub command: String,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub platform: Option<String>,
}

impl BindingConfig {
    /// Whether this entry applies to the platform we are running on
    pub fn applies_to_current_platform(&self) -> bool {
        self.platform
            .as_deref()
            .map_or(true, |platform| platform == current_platform())
    }

    /// Build a binding, checking the key string and when-clause
    pub fn to_keybinding(&self) -> Result<Keybinding, KeymapError> {
        KeySequence::parse(&self.key)?;

        let mut binding = Keybinding::new(self.command.as_str(), self.key.as_str())
            .args(self.args.clone())
            .priority(self.priority);
        if let Some(when) = self.when.as_deref().filter(|w| !w.trim().is_empty()) {
            binding = binding.when(WhenClause::parse(when)?);
        }
        Ok(binding)
    }
}

/// Parse the YAML structure without validating individual entries
pub fn parse_keymap_config(yaml: &str) -> Result<KeymapConfig, KeymapError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse keybindings from YAML string
///
/// Entries for other platforms are dropped. Entries with a malformed key
/// string or when-clause are logged and skipped.
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<Keybinding>, KeymapError> {
    let config = parse_keymap_config(yaml)?;

    let mut bindings = Vec::with_capacity(config.bindings.len());
    for entry in config
        .bindings
        .iter()
        .filter(|e| e.applies_to_current_platform())
    {
        match entry.to_keybinding() {
            Ok(binding) => bindings.push(binding),
            Err(e) => tracing::warn!("Skipping keymap entry for {}: {}", entry.command, e),
        }
    }
    Ok(bindings)
}

/// Load keybindings from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Vec<Keybinding>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|source| KeymapError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_keymap_yaml(&content)
}

/// Every problem with the entries of a keymap, paired with the entry's index
///
/// Only a structurally invalid document is an `Err`.
pub fn check_keymap_yaml(yaml: &str) -> Result<Vec<(usize, KeymapError)>, KeymapError> {
    let config = parse_keymap_config(yaml)?;
    Ok(config
        .bindings
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| entry.to_keybinding().err().map(|e| (i, e)))
        .collect())
}

/// Get the current platform identifier
fn current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
bindings:
  - key: "ctrlcmd+s"
    command: save
  - key: "ctrlcmd+k ctrlcmd+c"
    command: comment
    when: editorFocus
    priority: 100
    args: [1, "two"]
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].command, "save");
        assert_eq!(bindings[0].priority, 0);
        assert_eq!(bindings[1].keybinding, "ctrlcmd+k ctrlcmd+c");
        assert_eq!(bindings[1].priority, 100);
        assert_eq!(bindings[1].when, Some(WhenClause::defined("editorFocus")));
        assert_eq!(bindings[1].args, vec![Value::from(1), Value::from("two")]);
    }

    #[test]
    fn test_parse_yaml_with_platform() {
        let yaml = r#"
bindings:
  - key: "ctrlcmd+s"
    command: save
  - key: "meta+left"
    command: cursorHome
    platform: macos
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();

        // On macOS, should have 2 bindings; on other platforms, 1
        #[cfg(target_os = "macos")]
        assert_eq!(bindings.len(), 2);

        #[cfg(not(target_os = "macos"))]
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let yaml = r#"
bindings:
  - key: "ctrl+nokey"
    command: broken
  - key: "ctrl+b"
    command: badWhen
    when: "a &&"
  - key: "ctrl+g"
    command: good
"#;
        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].command, "good");
    }

    #[test]
    fn test_blank_when_means_unconditional() {
        let yaml = "bindings:\n  - key: f5\n    command: run\n    when: \"  \"\n";
        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert!(bindings[0].when.is_none());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(matches!(
            parse_keymap_yaml("bindings: [oops"),
            Err(KeymapError::Yaml(_))
        ));
    }

    #[test]
    fn test_check_reports_entry_problems() {
        let yaml = r#"
bindings:
  - key: "ctrl+s"
    command: save
  - key: "ctrl++"
    command: broken
  - key: "f5"
    command: run
    when: "(a"
"#;
        let problems = check_keymap_yaml(yaml).unwrap();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].0, 1);
        assert!(matches!(problems[0].1, KeymapError::InvalidKey(_)));
        assert_eq!(problems[1].0, 2);
        assert!(matches!(problems[1].1, KeymapError::InvalidCondition(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_keymap_file(Path::new("/nonexistent/chordmap/keymap.yaml")).unwrap_err();
        assert!(matches!(err, KeymapError::Io { .. }));
    }
}
