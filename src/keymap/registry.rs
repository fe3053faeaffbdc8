//! Keybinding registry: scoped storage, collision checks and accelerator labels

use std::sync::mpsc::{self, Receiver, Sender};

use super::binding::{Keybinding, ScopedKeybinding};
use super::collision::{classify, CollisionResult, KeybindingConflict};
use super::command::PASSTHROUGH_COMMAND;
use super::context::ContextMatcher;
use super::error::ParseError;
use super::layout::{KeyboardLayout, StandardLayout};
use super::scope::{Scope, ScopeStore};
use super::sequence::KeySequence;
use super::types::{Key, KeyCode};
use super::when::when_equal;

/// Notification sent whenever registrations change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindingsChanged {
    pub affects_commands: Vec<String>,
}

/// What to unregister: every binding with a key string, or one specific binding
#[derive(Debug, Clone, Copy)]
pub enum KeybindingRef<'a> {
    Key(&'a str),
    Binding(&'a Keybinding),
}

impl<'a> From<&'a str> for KeybindingRef<'a> {
    fn from(key: &'a str) -> Self {
        KeybindingRef::Key(key)
    }
}

impl<'a> From<&'a Keybinding> for KeybindingRef<'a> {
    fn from(binding: &'a Keybinding) -> Self {
        KeybindingRef::Binding(binding)
    }
}

/// Stores keybindings per scope and answers questions about them
pub struct KeybindingRegistry {
    store: ScopeStore,
    layout: Box<dyn KeyboardLayout>,
    listeners: Vec<Sender<KeybindingsChanged>>,
}

impl KeybindingRegistry {
    /// Create an empty registry using the standard US layout
    pub fn new() -> Self {
        Self::with_layout(Box::new(StandardLayout))
    }

    pub fn with_layout(layout: Box<dyn KeyboardLayout>) -> Self {
        Self {
            store: ScopeStore::new(),
            layout,
            listeners: Vec::new(),
        }
    }

    pub fn layout(&self) -> &dyn KeyboardLayout {
        self.layout.as_ref()
    }

    /// Switch keyboard layout, invalidating every cached resolution
    pub fn set_layout(&mut self, layout: Box<dyn KeyboardLayout>) {
        tracing::debug!("Keyboard layout changed to {}", layout.id());
        self.layout = layout;
        self.clear_resolved_keybindings();
    }

    pub fn bindings(&self, scope: Scope) -> &[Keybinding] {
        self.store.bindings(scope)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Receive a message for every registration change
    pub fn subscribe(&mut self) -> Receiver<KeybindingsChanged> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    fn notify(&mut self, affects_commands: Vec<String>) {
        let event = KeybindingsChanged { affects_commands };
        // Drop listeners whose receiver is gone
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Register a binding at the front of `scope`
    ///
    /// A binding whose key string does not parse is logged and skipped; the
    /// return value tells whether it was stored.
    pub fn register_keybinding(&mut self, mut binding: Keybinding, scope: Scope) -> bool {
        binding.invalidate();
        if let Err(e) = binding.resolve(self.layout.as_ref()) {
            tracing::warn!(
                "Could not register keybinding:\n  {}\n{}",
                binding.stringify(),
                e
            );
            return false;
        }

        let command = binding.command.clone();
        self.store.insert_front(scope, binding);
        self.notify(vec![command]);
        true
    }

    /// Register several bindings, returning how many were stored
    pub fn register_keybindings(
        &mut self,
        bindings: impl IntoIterator<Item = Keybinding>,
        scope: Scope,
    ) -> usize {
        bindings
            .into_iter()
            .map(|binding| self.register_keybinding(binding, scope))
            .filter(|registered| *registered)
            .count()
    }

    /// Remove bindings from `scope` whose key string is equivalent to the target's
    ///
    /// When a full binding carrying a when-clause is given, the when-clause must
    /// match as well. Returns how many bindings were removed.
    pub fn unregister_keybinding<'a>(
        &mut self,
        target: impl Into<KeybindingRef<'a>>,
        scope: Scope,
    ) -> usize {
        let target = target.into();
        let (key, when) = match target {
            KeybindingRef::Key(key) => (key, None),
            KeybindingRef::Binding(binding) => (binding.keybinding.as_str(), binding.when.as_ref()),
        };
        let wanted = normalize_key_string(key);

        let mut removed = Vec::new();
        self.store.remove_where(scope, |binding| {
            let matches = normalize_key_string(&binding.keybinding) == wanted
                && (when.is_none() || when_equal(binding.when.as_ref(), when));
            if matches {
                removed.push(binding.command.clone());
            }
            matches
        });

        let count = removed.len();
        if count > 0 {
            self.notify(removed);
        }
        count
    }

    /// Resolve a binding's key string against the active layout (cached)
    pub fn resolve_keybinding<'b>(
        &self,
        binding: &'b Keybinding,
    ) -> Result<&'b KeySequence, ParseError> {
        binding.resolve(self.layout.as_ref())
    }

    /// Clear every cached resolution so bindings are re-resolved on next use
    pub fn clear_resolved_keybindings(&mut self) {
        self.store.invalidate_all();
    }

    /// Collisions of `binding` against `bindings`, limited to equal when-clauses
    fn same_context_collisions<'b>(
        &self,
        bindings: &'b [Keybinding],
        binding: &Keybinding,
    ) -> CollisionResult<'b> {
        let sequence = match self.resolve_keybinding(binding) {
            Ok(sequence) => sequence,
            Err(e) => {
                tracing::warn!("Cannot check keybinding {}: {}", binding.stringify(), e);
                return CollisionResult::default();
            }
        };
        classify(bindings, sequence, self.layout.as_ref())
            .filter(|other| when_equal(other.when.as_ref(), binding.when.as_ref()))
    }

    /// Check `binding` for collisions in `bindings`, logging the most severe one
    pub fn contains_keybinding(&self, bindings: &[Keybinding], binding: &Keybinding) -> bool {
        let collisions = self.same_context_collisions(bindings, binding);
        let describe = |list: &[&Keybinding]| {
            list.iter()
                .map(|b| b.stringify())
                .collect::<Vec<_>>()
                .join(", ")
        };

        if !collisions.full.is_empty() {
            tracing::warn!(
                "Collided keybinding is ignored; {} collided with {}",
                binding.stringify(),
                describe(&collisions.full)
            );
            return true;
        }
        if !collisions.partial.is_empty() {
            tracing::warn!(
                "Shadowing keybinding is ignored; {} shadows {}",
                binding.stringify(),
                describe(&collisions.partial)
            );
            return true;
        }
        if !collisions.shadow.is_empty() {
            tracing::warn!(
                "Shadowed keybinding is ignored; {} would be shadowed by {}",
                binding.stringify(),
                describe(&collisions.shadow)
            );
            return true;
        }
        false
    }

    pub fn contains_keybinding_in_scope(&self, binding: &Keybinding, scope: Scope) -> bool {
        self.contains_keybinding(self.store.bindings(scope), binding)
    }

    /// The most severe conflict of `binding` against `bindings`, if any
    pub fn validate_keybinding(
        &self,
        bindings: &[Keybinding],
        binding: &Keybinding,
    ) -> Option<KeybindingConflict> {
        self.same_context_collisions(bindings, binding).conflict()
    }

    pub fn validate_keybinding_in_scope(
        &self,
        binding: &Keybinding,
        scope: Scope,
    ) -> Option<KeybindingConflict> {
        self.validate_keybinding(self.store.bindings(scope), binding)
    }

    /// User-visible labels for each key code of a binding
    pub fn accelerator_for(
        &self,
        binding: &Keybinding,
        separator: &str,
    ) -> Result<Vec<String>, ParseError> {
        let sequence = self.resolve_keybinding(binding)?;
        Ok(self.accelerator_for_sequence(sequence, separator))
    }

    pub fn accelerator_for_sequence(&self, sequence: &KeySequence, separator: &str) -> Vec<String> {
        sequence
            .iter()
            .map(|code| self.accelerator_for_key_code(code, separator))
            .collect()
    }

    /// Label for one key code, modifiers first (meta, ctrl, alt, shift)
    pub fn accelerator_for_key_code(&self, code: &KeyCode, separator: &str) -> String {
        let mac = cfg!(target_os = "macos");
        let mut parts = Vec::new();
        if code.mods.meta() {
            parts.push(if mac {
                "⌘".to_string()
            } else if cfg!(target_os = "windows") {
                "Win".to_string()
            } else {
                "Meta".to_string()
            });
        }
        if code.mods.ctrl() {
            parts.push(if mac { "⌃" } else { "Ctrl" }.to_string());
        }
        if code.mods.alt() {
            parts.push(if mac { "⌥" } else { "Alt" }.to_string());
        }
        if code.mods.shift() {
            parts.push(if mac { "⇧" } else { "Shift" }.to_string());
        }
        if let Some(key) = code.key {
            parts.push(self.accelerator_for_key(key));
        }
        parts.join(separator)
    }

    /// Label for a single key, using the layout's character for it
    pub fn accelerator_for_key(&self, key: Key) -> String {
        if cfg!(target_os = "macos") {
            match key {
                Key::Left => return "←".to_string(),
                Key::Right => return "→".to_string(),
                Key::Up => return "↑".to_string(),
                Key::Down => return "↓".to_string(),
                Key::Backspace => return "⌫".to_string(),
                Key::Enter => return "⏎".to_string(),
                _ => {}
            }
        }

        let character = self.layout.keyboard_character(key);
        if key.is_letter() || key.is_function() {
            character.to_uppercase()
        } else if character.chars().count() > 1 {
            let mut chars = character.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => character,
            }
        } else {
            character
        }
    }

    /// Bindings for a command from the most specific scope that has any
    pub fn get_keybindings_for_command(&self, command: &str) -> Vec<ScopedKeybinding> {
        for scope in Scope::BY_AUTHORITY {
            let found: Vec<ScopedKeybinding> = self
                .store
                .bindings(scope)
                .iter()
                .filter(|b| b.command == command)
                .map(|b| ScopedKeybinding {
                    binding: b.clone(),
                    scope,
                })
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    pub fn get_scoped_keybindings_for_command(
        &self,
        scope: Scope,
        command: &str,
    ) -> Vec<&Keybinding> {
        self.store
            .bindings(scope)
            .iter()
            .filter(|b| b.command == command)
            .collect()
    }

    /// A binding is enabled when it has no when-clause or the clause holds
    pub fn is_enabled(
        &self,
        binding: &Keybinding,
        context: &dyn ContextMatcher,
        target: Option<&str>,
    ) -> bool {
        match &binding.when {
            Some(when) => context.matches(when, target),
            None => true,
        }
    }

    /// Whether the command is the passthrough pseudo-command
    pub fn is_pseudo_command(command: &str) -> bool {
        command == PASSTHROUGH_COMMAND
    }

    /// Drop every non-DEFAULT binding
    pub fn reset_keybindings(&mut self) {
        self.store.reset();
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout-independent canonical form of a raw key string, for equality checks
fn normalize_key_string(key: &str) -> String {
    match KeySequence::parse(key) {
        Ok(sequence) => sequence.to_string(),
        Err(_) => key.trim().to_lowercase(),
    }
}
