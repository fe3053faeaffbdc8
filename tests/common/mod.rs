//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use chordmap::keymap::{
    ChordRuntime, CommandLog, KeyAction, KeyCode, KeyContext, KeyEvent, Keybinding,
    KeybindingRegistry, Scope, StatusText, TimerToken,
};

/// Registry with `(command, key)` pairs registered in `scope`, in order
pub fn registry_with(scope: Scope, bindings: &[(&str, &str)]) -> KeybindingRegistry {
    let mut registry = KeybindingRegistry::new();
    for (command, key) in bindings {
        assert!(
            registry.register_keybinding(Keybinding::new(*command, *key), scope),
            "failed to register {} => {}",
            key,
            command
        );
    }
    registry
}

/// Runtime recording status text, over a registry with DEFAULT bindings
pub fn runtime_with(bindings: &[(&str, &str)]) -> ChordRuntime<StatusText> {
    ChordRuntime::with_status(registry_with(Scope::Default, bindings), StatusText::new())
}

/// Key event for a single key string such as `ctrlcmd+k`
pub fn event(key: &str) -> KeyEvent {
    let code = KeyCode::parse(key).unwrap_or_else(|e| panic!("bad key `{}`: {}", key, e));
    KeyEvent::from_key_code(code)
}

/// Drives a runtime with a simulated clock
pub struct Driver {
    pub runtime: ChordRuntime<StatusText>,
    pub context: KeyContext,
    pub executor: CommandLog,
    pub now: Instant,
}

impl Driver {
    pub fn new(runtime: ChordRuntime<StatusText>) -> Self {
        Self {
            runtime,
            context: KeyContext::new(),
            executor: CommandLog::new(),
            now: Instant::now(),
        }
    }

    pub fn with_context(mut self, context: KeyContext) -> Self {
        self.context = context;
        self
    }

    pub fn press(&mut self, key: &str) -> KeyAction {
        self.press_event(&event(key))
    }

    pub fn press_event(&mut self, event: &KeyEvent) -> KeyAction {
        self.runtime
            .run(event, self.now, &self.context, &mut self.executor)
    }

    /// Advance the clock and let the runtime expire its chord
    pub fn wait(&mut self, duration: Duration) -> bool {
        self.now += duration;
        self.runtime.tick(self.now)
    }

    pub fn invoked(&self) -> Vec<String> {
        self.executor.invoked().map(String::from).collect()
    }
}

/// The timer token of an `AwaitMore`, panicking on anything else
pub fn awaiting(action: KeyAction) -> TimerToken {
    match action {
        KeyAction::AwaitMore(token) => token,
        other => panic!("expected AwaitMore, got {:?}", other),
    }
}

pub fn executed(command: &str) -> KeyAction {
    KeyAction::Executed {
        command: command.to_string(),
    }
}
