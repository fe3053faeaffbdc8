//! Chord runtime: turns key events into at most one command invocation
//!
//! The runtime owns the registry and a single [`ChordSession`]. Each key event
//! is appended to the pending sequence and resolved; a full match executes,
//! a partial match waits for more keys until the timeout elapses, and
//! anything else resets to idle and lets the event through.

use std::time::{Duration, Instant};

use super::binding::Keybinding;
use super::command::CommandExecutor;
use super::context::ContextMatcher;
use super::layout::KeyboardLayout;
use super::registry::KeybindingRegistry;
use super::session::{ChordSession, TimerToken};
use super::status::{pending_chord_text, ChordStatus, NoStatus, KEYBINDING_STATUS_ID};
use super::types::{KeyCode, KeyEvent};

/// How long a partial chord waits for its continuation
pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(5000);

/// Result of handling one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// A full match fired this command
    Executed { command: String },
    /// A passthrough binding matched; the host should handle the key itself
    Passthrough { command: String },
    /// Keystroke is part of a chord, await more input
    AwaitMore(TimerToken),
    /// No binding matches; the pending chord was dropped
    NoMatch,
    /// Event was already handled, was modifier-only, or the runtime is disposed
    Ignored,
}

impl KeyAction {
    /// Whether the host should suppress its default handling of the event
    pub fn prevents_default(&self) -> bool {
        matches!(self, KeyAction::Executed { .. } | KeyAction::AwaitMore(_))
    }
}

/// Whether the runtime is in the middle of a chord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordState {
    Idle,
    AwaitingContinuation,
}

enum Outcome {
    Fired { command: String, passthrough: bool },
    Partial,
    Nothing,
}

/// Dispatches key events to commands, tracking the pending chord between them
pub struct ChordRuntime<S = NoStatus> {
    registry: KeybindingRegistry,
    session: ChordSession,
    status: S,
    timeout: Duration,
    disposed: bool,
}

impl ChordRuntime<NoStatus> {
    /// Create a runtime without a status surface
    pub fn new(registry: KeybindingRegistry) -> Self {
        Self::with_status(registry, NoStatus)
    }
}

impl<S: ChordStatus> ChordRuntime<S> {
    pub fn with_status(registry: KeybindingRegistry, status: S) -> Self {
        Self {
            registry,
            session: ChordSession::new(),
            status,
            timeout: DEFAULT_CHORD_TIMEOUT,
            disposed: false,
        }
    }

    /// Set the chord continuation timeout (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &KeybindingRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut KeybindingRegistry {
        &mut self.registry
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn state(&self) -> ChordState {
        if self.session.is_pending() {
            ChordState::AwaitingContinuation
        } else {
            ChordState::Idle
        }
    }

    /// Keys typed so far in the pending chord, as canonical key strings
    pub fn pending_keys(&self) -> String {
        self.session.keys().to_string()
    }

    /// Deadline of the running chord timer, for hosts that schedule callbacks
    pub fn deadline(&self) -> Option<Instant> {
        self.session.deadline()
    }

    /// Handle one key event
    pub fn run(
        &mut self,
        event: &KeyEvent,
        now: Instant,
        context: &dyn ContextMatcher,
        executor: &mut dyn CommandExecutor,
    ) -> KeyAction {
        if self.disposed || event.default_prevented {
            return KeyAction::Ignored;
        }

        let code = KeyCode::from_event(event);
        if code.is_modifier_only() {
            return KeyAction::Ignored;
        }

        // A new key always supersedes the outstanding timer
        self.session.cancel_timer();

        if let Err(e) = self.registry.layout().validate_key_code(&code) {
            tracing::warn!("Dropping key event: {}", e);
            self.reset_chord();
            return KeyAction::NoMatch;
        }

        self.session.push(code);
        let target = event.target.as_deref();

        let outcome = {
            let result =
                self.registry
                    .get_keybindings_for_key_sequence(self.session.keys(), context, target);
            match try_execution(&self.registry, &result.full, context, target, executor) {
                Some(outcome) => outcome,
                None if !result.partial.is_empty() => Outcome::Partial,
                None => Outcome::Nothing,
            }
        };

        match outcome {
            Outcome::Fired {
                command,
                passthrough,
            } => {
                tracing::debug!("Chord {} resolved to {}", self.session.keys(), command);
                self.reset_chord();
                if passthrough {
                    KeyAction::Passthrough { command }
                } else {
                    KeyAction::Executed { command }
                }
            }
            Outcome::Partial => {
                let token = self.session.start_timer(now, self.timeout);
                let labels = self
                    .registry
                    .accelerator_for_sequence(self.session.keys(), "+");
                self.status
                    .show(KEYBINDING_STATUS_ID, &pending_chord_text(&labels));
                tracing::debug!(
                    "Chord {} pending, waiting for more keys",
                    self.session.keys()
                );
                KeyAction::AwaitMore(token)
            }
            Outcome::Nothing => {
                self.reset_chord();
                KeyAction::NoMatch
            }
        }
    }

    /// Expire the pending chord if its deadline has passed
    ///
    /// Returns whether a chord was dropped.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.session.is_expired(now) {
            return false;
        }
        self.expire();
        true
    }

    /// Timer callback for hosts that schedule one per [`KeyAction::AwaitMore`]
    ///
    /// Tokens superseded by a later key event are ignored.
    pub fn on_timer_fired(&mut self, token: TimerToken) -> bool {
        if !self.session.is_current(token) {
            tracing::debug!("Ignoring stale chord timer {}", token.id());
            return false;
        }
        self.expire();
        true
    }

    fn expire(&mut self) {
        tracing::debug!("Chord {} timed out", self.session.keys());
        self.reset_chord();
    }

    /// Swap the keyboard layout; every binding is re-resolved on next use
    pub fn on_keyboard_layout_changed(&mut self, layout: Box<dyn KeyboardLayout>) {
        self.registry.set_layout(layout);
    }

    /// Drop USER and WORKSPACE bindings along with any pending chord
    pub fn reset_keybindings(&mut self) {
        self.registry.reset_keybindings();
        self.reset_chord();
    }

    /// Drop the pending chord and its status indicator
    pub fn reset_chord(&mut self) {
        self.session.clear();
        self.status.clear(KEYBINDING_STATUS_ID);
    }

    /// Stop handling events; later calls to `run` are ignored
    pub fn dispose(&mut self) {
        self.reset_chord();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Fire the first enabled full match, falling through on executor failure
fn try_execution(
    registry: &KeybindingRegistry,
    full: &[&Keybinding],
    context: &dyn ContextMatcher,
    target: Option<&str>,
    executor: &mut dyn CommandExecutor,
) -> Option<Outcome> {
    for binding in full {
        if !registry.is_enabled(binding, context, target) {
            continue;
        }
        // Passthrough needs no handler and always counts as fired
        if KeybindingRegistry::is_pseudo_command(&binding.command) {
            return Some(Outcome::Fired {
                command: binding.command.clone(),
                passthrough: true,
            });
        }
        if executor.execute(&binding.command, &binding.args) {
            return Some(Outcome::Fired {
                command: binding.command.clone(),
                passthrough: false,
            });
        }
        tracing::debug!("Command {} did not fire, trying next binding", binding.command);
    }
    None
}
