//! Core types for the keymap system: Key, Modifiers, KeyCode, KeyEvent

use std::fmt;

use super::error::ParseError;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// The platform primary modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }

    /// Parse a single modifier token, resolving `ctrlcmd` for the current platform
    fn from_token(token: &str) -> Option<Modifiers> {
        match token {
            "ctrlcmd" | "cmdctrl" | "mod" => Some(Modifiers::cmd()),
            "ctrl" | "control" | "⌃" => Some(Modifiers::CTRL),
            "shift" | "⇧" => Some(Modifiers::SHIFT),
            "alt" | "option" | "opt" | "⌥" => Some(Modifiers::ALT),
            "meta" | "cmd" | "super" | "win" | "⌘" => Some(Modifiers::META),
            _ => None,
        }
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A logical key, independent of the physical keyboard layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A letter, digit or punctuation key (letters normalized to lowercase)
    Char(char),

    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    F(u8), // F1-F24

    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
    NumpadDecimal,
}

const PUNCTUATION: &[(char, u16)] = &[
    (';', 186),
    ('=', 187),
    (',', 188),
    ('-', 189),
    ('.', 190),
    ('/', 191),
    ('`', 192),
    ('[', 219),
    ('\\', 220),
    (']', 221),
    ('\'', 222),
];

impl Key {
    /// Create a character key, or `None` if the character has no key of its own
    pub fn char(c: char) -> Option<Key> {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || PUNCTUATION.iter().any(|(p, _)| *p == c) {
            Some(Key::Char(c))
        } else {
            None
        }
    }

    /// Stable numeric code (browser virtual key code numbering)
    pub fn code(self) -> u16 {
        match self {
            Key::Char(c) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u16,
            Key::Char(c) => PUNCTUATION
                .iter()
                .find(|(p, _)| *p == c)
                .map(|(_, code)| *code)
                .unwrap_or(0),
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::Space => 32,
            Key::PageUp => 33,
            Key::PageDown => 34,
            Key::End => 35,
            Key::Home => 36,
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
            Key::Insert => 45,
            Key::Delete => 46,
            Key::Numpad0 => 96,
            Key::Numpad1 => 97,
            Key::Numpad2 => 98,
            Key::Numpad3 => 99,
            Key::Numpad4 => 100,
            Key::Numpad5 => 101,
            Key::Numpad6 => 102,
            Key::Numpad7 => 103,
            Key::Numpad8 => 104,
            Key::Numpad9 => 105,
            Key::NumpadMultiply => 106,
            Key::NumpadAdd => 107,
            Key::NumpadEnter => 108,
            Key::NumpadSubtract => 109,
            Key::NumpadDecimal => 110,
            Key::NumpadDivide => 111,
            Key::F(n) => 111 + n as u16,
        }
    }

    /// Check if this is a letter key (A-Z)
    pub fn is_letter(self) -> bool {
        matches!(self, Key::Char(c) if c.is_ascii_alphabetic())
    }

    /// Check if this is a function key (F1-F24)
    pub fn is_function(self) -> bool {
        matches!(self, Key::F(_))
    }

    /// Canonical lowercase name, as accepted by [`Key::from_name`]
    pub fn name(self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Enter => "enter".into(),
            Key::Escape => "escape".into(),
            Key::Tab => "tab".into(),
            Key::Backspace => "backspace".into(),
            Key::Delete => "delete".into(),
            Key::Space => "space".into(),
            Key::Up => "up".into(),
            Key::Down => "down".into(),
            Key::Left => "left".into(),
            Key::Right => "right".into(),
            Key::Home => "home".into(),
            Key::End => "end".into(),
            Key::PageUp => "pageup".into(),
            Key::PageDown => "pagedown".into(),
            Key::Insert => "insert".into(),
            Key::F(n) => format!("f{}", n),
            Key::Numpad0 => "numpad0".into(),
            Key::Numpad1 => "numpad1".into(),
            Key::Numpad2 => "numpad2".into(),
            Key::Numpad3 => "numpad3".into(),
            Key::Numpad4 => "numpad4".into(),
            Key::Numpad5 => "numpad5".into(),
            Key::Numpad6 => "numpad6".into(),
            Key::Numpad7 => "numpad7".into(),
            Key::Numpad8 => "numpad8".into(),
            Key::Numpad9 => "numpad9".into(),
            Key::NumpadAdd => "numpad_add".into(),
            Key::NumpadSubtract => "numpad_subtract".into(),
            Key::NumpadMultiply => "numpad_multiply".into(),
            Key::NumpadDivide => "numpad_divide".into(),
            Key::NumpadEnter => "numpad_enter".into(),
            Key::NumpadDecimal => "numpad_decimal".into(),
        }
    }

    /// Look up a key by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Key> {
        let lower = name.to_lowercase();
        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::char(c);
        }

        let key = match lower.as_str() {
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            "backspace" | "back" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "space" => Key::Space,

            "up" | "arrowup" => Key::Up,
            "down" | "arrowdown" => Key::Down,
            "left" | "arrowleft" => Key::Left,
            "right" | "arrowright" => Key::Right,

            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdown" | "pgdn" => Key::PageDown,
            "insert" | "ins" => Key::Insert,

            "numpad0" | "num0" => Key::Numpad0,
            "numpad1" | "num1" => Key::Numpad1,
            "numpad2" | "num2" => Key::Numpad2,
            "numpad3" | "num3" => Key::Numpad3,
            "numpad4" | "num4" => Key::Numpad4,
            "numpad5" | "num5" => Key::Numpad5,
            "numpad6" | "num6" => Key::Numpad6,
            "numpad7" | "num7" => Key::Numpad7,
            "numpad8" | "num8" => Key::Numpad8,
            "numpad9" | "num9" => Key::Numpad9,
            "numpad_add" | "numadd" | "numplus" => Key::NumpadAdd,
            "numpad_subtract" | "numsub" | "numminus" => Key::NumpadSubtract,
            "numpad_multiply" | "nummul" => Key::NumpadMultiply,
            "numpad_divide" | "numdiv" => Key::NumpadDivide,
            "numpad_enter" | "numenter" => Key::NumpadEnter,
            "numpad_decimal" | "numdot" => Key::NumpadDecimal,

            other => {
                let n: u8 = other.strip_prefix('f')?.parse().ok()?;
                if (1..=24).contains(&n) {
                    Key::F(n)
                } else {
                    return None;
                }
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One key press: an optional base key plus modifier flags
///
/// A code without a base key is "modifier-only" (e.g. the user is holding Shift)
/// and never participates in sequence matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode {
    pub key: Option<Key>,
    pub mods: Modifiers,
}

impl KeyCode {
    pub const fn new(key: Key, mods: Modifiers) -> Self {
        Self {
            key: Some(key),
            mods,
        }
    }

    /// Create a key code with no modifiers
    pub const fn key(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Create a key code for a held modifier without a base key
    pub const fn modifier_only(mods: Modifiers) -> Self {
        Self { key: None, mods }
    }

    /// Create a key code with the platform primary modifier (Cmd/Ctrl) and a character
    pub fn cmd(c: char) -> Self {
        Self {
            key: Key::char(c),
            mods: Modifiers::cmd(),
        }
    }

    pub fn is_modifier_only(&self) -> bool {
        self.key.is_none()
    }

    /// Build a key code from a host keyboard event
    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            key: event.key,
            mods: Modifiers::new(event.ctrl, event.shift, event.alt, event.meta),
        }
    }

    /// Parse one `+`-joined token such as `ctrlcmd+shift+k`
    pub fn parse(token: &str) -> Result<KeyCode, ParseError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyKey(token.to_string()));
        }

        let mut mods = Modifiers::NONE;
        let mut key = None;
        for part in trimmed.split('+') {
            if part.is_empty() {
                return Err(ParseError::MalformedModifier(token.to_string()));
            }
            let lower = part.to_lowercase();
            if let Some(modifier) = Modifiers::from_token(&lower) {
                if key.is_some() {
                    // Modifiers must precede the base key
                    return Err(ParseError::MalformedModifier(token.to_string()));
                }
                mods = mods | modifier;
                continue;
            }
            if key.is_some() {
                return Err(ParseError::MultipleKeys(token.to_string()));
            }
            key = Some(Key::from_name(&lower).ok_or_else(|| ParseError::UnknownKey {
                key: part.to_string(),
                input: token.to_string(),
            })?);
        }

        match key {
            Some(key) => Ok(KeyCode::new(key, mods)),
            None => Err(ParseError::MissingKey(token.to_string())),
        }
    }
}

impl fmt::Display for KeyCode {
    /// Canonical form: `ctrl+shift+alt+meta+key`, parseable by [`KeyCode::parse`]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.mods.ctrl() {
            parts.push("ctrl".into());
        }
        if self.mods.shift() {
            parts.push("shift".into());
        }
        if self.mods.alt() {
            parts.push("alt".into());
        }
        if self.mods.meta() {
            parts.push("meta".into());
        }
        if let Some(key) = self.key {
            parts.push(key.name());
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key press as delivered by the host surface
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key, or `None` when only a modifier was pressed
    pub key: Option<Key>,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    /// Identifier of the focused element the event was dispatched to
    pub target: Option<String>,
    /// Another handler already consumed this event
    pub default_prevented: bool,
}

impl KeyEvent {
    /// Create an event for a key press with the given modifiers
    pub fn new(key: Key, mods: Modifiers) -> Self {
        Self {
            key: Some(key),
            ctrl: mods.ctrl(),
            shift: mods.shift(),
            alt: mods.alt(),
            meta: mods.meta(),
            ..Self::default()
        }
    }

    /// Create an event from a parsed key code
    pub fn from_key_code(code: KeyCode) -> Self {
        Self {
            key: code.key,
            ctrl: code.mods.ctrl(),
            shift: code.mods.shift(),
            alt: code.mods.alt(),
            meta: code.mods.meta(),
            ..Self::default()
        }
    }

    /// Set the focused element this event targets (builder pattern)
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}
