//! Keybinding struct representing a registration of a key string to a command

use std::cell::OnceCell;

use serde_json::Value;

use super::error::ParseError;
use super::layout::KeyboardLayout;
use super::scope::Scope;
use super::sequence::KeySequence;
use super::when::WhenClause;

/// Well-known priority tiers; higher wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeybindingWeight {
    Default = 0,
    EditorCore = 1,
    EditorContrib = 100,
    WorkbenchContrib = 200,
    BuiltinExtension = 300,
    ExternalExtension = 400,
}

impl From<KeybindingWeight> for i32 {
    fn from(weight: KeybindingWeight) -> Self {
        weight as i32
    }
}

/// A single keybinding registration
///
/// `keybinding` is the raw, unresolved key string. The resolved key sequence is
/// computed lazily against the active keyboard layout and cached until the
/// layout changes.
#[derive(Debug, Clone)]
pub struct Keybinding {
    /// The command identifier to execute
    pub command: String,
    /// Raw key string such as `ctrlcmd+k ctrlcmd+c`
    pub keybinding: String,
    /// Condition that must hold for this binding to activate
    pub when: Option<WhenClause>,
    /// Arguments passed to the command
    pub args: Vec<Value>,
    /// Higher priority wins among matches in the same scope
    pub priority: i32,
    resolved: OnceCell<KeySequence>,
}

impl Keybinding {
    pub fn new(command: impl Into<String>, keybinding: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            keybinding: keybinding.into(),
            when: None,
            args: Vec::new(),
            priority: KeybindingWeight::Default.into(),
            resolved: OnceCell::new(),
        }
    }

    /// Add a condition to this binding (builder pattern)
    pub fn when(mut self, when: WhenClause) -> Self {
        self.when = Some(when);
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn priority(mut self, priority: impl Into<i32>) -> Self {
        self.priority = priority.into();
        self
    }

    /// The cached key sequence, if this binding has been resolved
    pub fn resolved(&self) -> Option<&KeySequence> {
        self.resolved.get()
    }

    /// Resolve the key string against `layout`, reusing the cached sequence
    pub fn resolve(&self, layout: &dyn KeyboardLayout) -> Result<&KeySequence, ParseError> {
        if let Some(sequence) = self.resolved.get() {
            return Ok(sequence);
        }
        let sequence = KeySequence::parse(&self.keybinding)?
            .iter()
            .map(|code| layout.resolve_key_code(*code))
            .collect();
        Ok(self.resolved.get_or_init(|| sequence))
    }

    /// Drop the cached resolution
    pub fn invalidate(&mut self) {
        self.resolved.take();
    }

    /// Check if this is a chord (multi-keystroke) binding
    pub fn is_chord(&self) -> bool {
        self.keybinding.split_whitespace().count() > 1
    }

    /// Compact JSON form used in log messages
    pub fn stringify(&self) -> String {
        serde_json::json!({
            "command": self.command,
            "keybinding": self.keybinding,
        })
        .to_string()
    }
}

/// A copy of a binding together with the scope it was found in
#[derive(Debug, Clone)]
pub struct ScopedKeybinding {
    pub binding: Keybinding,
    pub scope: Scope,
}
