//! Keyboard layout service seam
//!
//! Bindings are written against logical keys. A layout maps those to what the
//! user's keyboard actually produces and supplies the characters shown in
//! accelerator labels.

use super::error::InvalidKeyCodeError;
use super::types::{Key, KeyCode};

pub trait KeyboardLayout {
    /// Identifier used in diagnostics
    fn id(&self) -> &str;

    /// Map a parsed key code to the key code this layout produces for it
    fn resolve_key_code(&self, code: KeyCode) -> KeyCode;

    /// The character (or name) the layout shows for a key
    fn keyboard_character(&self, key: Key) -> String;

    /// Check that a key code from an event can be mapped on this layout
    fn validate_key_code(&self, code: &KeyCode) -> Result<(), InvalidKeyCodeError>;
}

/// US layout where logical and physical keys coincide
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayout;

impl KeyboardLayout for StandardLayout {
    fn id(&self) -> &str {
        "us"
    }

    fn resolve_key_code(&self, code: KeyCode) -> KeyCode {
        code
    }

    fn keyboard_character(&self, key: Key) -> String {
        key.name()
    }

    fn validate_key_code(&self, _code: &KeyCode) -> Result<(), InvalidKeyCodeError> {
        Ok(())
    }
}
