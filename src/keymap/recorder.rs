//! Key capture for keymap editors
//!
//! Turns the keys a user presses into accelerator text so a binding can be
//! recorded by example. At most two key codes are kept; a third press starts
//! a new recording.

use super::error::InvalidKeyCodeError;
use super::registry::KeybindingRegistry;
use super::sequence::KeySequence;
use super::types::{KeyCode, KeyEvent};

const MAX_RECORDED_CODES: usize = 2;

#[derive(Debug, Default, Clone)]
pub struct KeyRecorder {
    keys: KeySequence,
}

impl KeyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` and return the accelerator text of the recording
    ///
    /// Modifier-only events leave the recording unchanged.
    pub fn convert(
        &mut self,
        event: &KeyEvent,
        registry: &KeybindingRegistry,
        separator: &str,
    ) -> Result<String, InvalidKeyCodeError> {
        let code = KeyCode::from_event(event);
        if !code.is_modifier_only() {
            registry.layout().validate_key_code(&code)?;
            if self.keys.len() >= MAX_RECORDED_CODES {
                self.keys.clear();
            }
            self.keys.push(code);
        }
        Ok(self.text(registry, separator))
    }

    /// Accelerator text of the current recording
    pub fn text(&self, registry: &KeybindingRegistry, separator: &str) -> String {
        registry
            .accelerator_for_sequence(&self.keys, "+")
            .join(separator)
    }

    /// The recorded keys
    pub fn keys(&self) -> &KeySequence {
        &self.keys
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::types::{Key, Modifiers};

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(Key::Char(c), Modifiers::CTRL)
    }

    fn label(c: char) -> String {
        if cfg!(target_os = "macos") {
            format!("⌃+{}", c)
        } else {
            format!("Ctrl+{}", c)
        }
    }

    #[test]
    fn test_records_up_to_two_codes() {
        let registry = KeybindingRegistry::new();
        let mut recorder = KeyRecorder::new();

        assert_eq!(recorder.convert(&ctrl('k'), &registry, " ").unwrap(), label('K'));
        assert_eq!(
            recorder.convert(&ctrl('c'), &registry, " ").unwrap(),
            format!("{} {}", label('K'), label('C'))
        );
        // A third key starts over
        assert_eq!(recorder.convert(&ctrl('x'), &registry, " ").unwrap(), label('X'));
        assert_eq!(recorder.keys().len(), 1);
    }

    #[test]
    fn test_modifier_only_returns_current_text() {
        let registry = KeybindingRegistry::new();
        let mut recorder = KeyRecorder::new();
        recorder.convert(&ctrl('k'), &registry, " ").unwrap();

        let held = KeyEvent {
            ctrl: true,
            ..KeyEvent::default()
        };
        assert_eq!(recorder.convert(&held, &registry, " ").unwrap(), label('K'));
        assert_eq!(recorder.keys().len(), 1);
    }

    #[test]
    fn test_clear() {
        let registry = KeybindingRegistry::new();
        let mut recorder = KeyRecorder::new();
        recorder.convert(&ctrl('k'), &registry, " ").unwrap();
        recorder.clear();
        assert!(recorder.keys().is_empty());
        assert_eq!(recorder.text(&registry, " "), "");
    }
}
