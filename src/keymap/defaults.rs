//! Default keybindings and layered keymap loading
//!
//! The default keymap ships inside the binary. User and workspace keymaps are
//! optional YAML files registered into their own scopes on top of it.

use std::path::{Path, PathBuf};

use super::binding::Keybinding;
use super::config::{load_keymap_file, parse_keymap_yaml};
use super::registry::KeybindingRegistry;
use super::scope::Scope;

/// Default keymap YAML embedded at compile time
pub const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Directory inside a workspace that holds its keymap
pub const WORKSPACE_DIR: &str = ".chordmap";

/// Bindings from the embedded default keymap
pub fn default_bindings() -> Vec<Keybinding> {
    match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(bindings) => bindings,
        Err(e) => {
            tracing::warn!("Failed to parse embedded keymap: {}", e);
            Vec::new()
        }
    }
}

/// `<workspace>/.chordmap/keymap.yaml`
pub fn workspace_keymap_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_DIR).join("keymap.yaml")
}

/// Where the USER and WORKSPACE keymaps are read from
#[derive(Debug, Clone, Default)]
pub struct KeymapSources {
    pub user: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
}

impl KeymapSources {
    /// User keymap from the config directory, workspace keymap from `workspace`
    pub fn discover(workspace: Option<&Path>) -> Self {
        Self {
            user: crate::config_paths::keymap_file(),
            workspace: workspace.map(workspace_keymap_path),
        }
    }
}

/// Number of bindings registered per scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub default: usize,
    pub user: usize,
    pub workspace: usize,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.default + self.user + self.workspace
    }
}

/// Register the embedded defaults into the DEFAULT scope
pub fn load_default_keymap(registry: &mut KeybindingRegistry) -> usize {
    let count = registry.register_keybindings(default_bindings(), Scope::Default);
    tracing::info!("Loaded embedded default keymap ({} bindings)", count);
    count
}

/// Register defaults plus any user and workspace keymaps
///
/// A missing keymap file is not an error. An unreadable or malformed one is
/// logged and contributes nothing.
pub fn load_keymaps(registry: &mut KeybindingRegistry, sources: &KeymapSources) -> LoadSummary {
    LoadSummary {
        default: load_default_keymap(registry),
        user: load_scope_file(registry, sources.user.as_deref(), Scope::User),
        workspace: load_scope_file(registry, sources.workspace.as_deref(), Scope::Workspace),
    }
}

fn load_scope_file(registry: &mut KeybindingRegistry, path: Option<&Path>, scope: Scope) -> usize {
    let Some(path) = path else {
        return 0;
    };
    if !path.exists() {
        tracing::debug!("No {} keymap at {}", scope, path.display());
        return 0;
    }

    match load_keymap_file(path) {
        Ok(bindings) => {
            let count = registry.register_keybindings(bindings, scope);
            tracing::info!(
                "Loaded {} keymap from {} ({} bindings)",
                scope,
                path.display(),
                count
            );
            count
        }
        Err(e) => {
            tracing::warn!("Failed to load {} keymap from {}: {}", scope, path.display(), e);
            0
        }
    }
}
