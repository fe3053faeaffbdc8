//! chordmap - keybinding resolution engine
//!
//! Turns a stream of keyboard events into at most one resolved command,
//! with multi-key chords, layered scope overrides, contextual when-clauses
//! and collision detection. See [`keymap`] for the engine itself.

pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod logging;

// Re-export commonly used types
pub use config::EngineConfig;
pub use keymap::{ChordRuntime, KeyAction, KeyEvent, Keybinding, KeybindingRegistry, Scope};
