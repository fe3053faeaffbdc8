//! Keybinding resolution engine
//!
//! This module turns a stream of key events into at most one command
//! invocation. It supports:
//! - Multi-key chords (`ctrlcmd+k ctrlcmd+c`) with a continuation timeout
//! - Layered scopes (DEFAULT < USER < WORKSPACE) with per-scope priorities
//! - Contextual when-clauses evaluated by an injected matcher
//! - Collision validation (full, partial and shadowed bindings)
//!
//! # Architecture
//!
//! ```text
//! KeyEvent → KeyCode → ChordSession → KeybindingRegistry::get_keybindings_for_key_sequence
//!          → CommandExecutor (full match) | AwaitMore (partial) | NoMatch
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! let mut registry = KeybindingRegistry::new();
//! load_keymaps(&mut registry, &KeymapSources::discover(Some(workspace)));
//! let mut runtime = ChordRuntime::new(registry);
//! let action = runtime.run(&event, Instant::now(), &context, &mut executor);
//! ```

mod binding;
mod collision;
mod command;
mod config;
mod context;
mod defaults;
mod error;
mod layout;
mod recorder;
mod registry;
mod resolve;
mod runtime;
mod scope;
mod sequence;
mod session;
mod status;
mod types;
mod when;

pub use binding::{Keybinding, KeybindingWeight, ScopedKeybinding};
pub use collision::{classify, CollisionKind, CollisionResult, KeybindingConflict};
pub use command::{CommandExecutor, CommandLog, PASSTHROUGH_COMMAND};
pub use config::{
    check_keymap_yaml, load_keymap_file, parse_keymap_config, parse_keymap_yaml, BindingConfig,
    KeymapConfig,
};
pub use context::{ContextMatcher, ContextValue, KeyContext};
pub use defaults::{
    default_bindings, load_default_keymap, load_keymaps, workspace_keymap_path, KeymapSources,
    LoadSummary, DEFAULT_KEYMAP_YAML,
};
pub use error::{InvalidKeyCodeError, KeymapError, ParseError, WhenParseError};
pub use layout::{KeyboardLayout, StandardLayout};
pub use recorder::KeyRecorder;
pub use registry::{KeybindingRef, KeybindingRegistry, KeybindingsChanged};
pub use runtime::{ChordRuntime, ChordState, KeyAction, DEFAULT_CHORD_TIMEOUT};
pub use scope::{Scope, ScopeStore};
pub use sequence::{KeySequence, SequenceMatch};
pub use session::{ChordSession, TimerToken};
pub use status::{pending_chord_text, ChordStatus, NoStatus, StatusText, KEYBINDING_STATUS_ID};
pub use types::{Key, KeyCode, KeyEvent, Modifiers};
pub use when::{when_equal, WhenClause};

#[cfg(test)]
mod tests;
