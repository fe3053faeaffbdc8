//! Key sequences (chords) and the three-way sequence comparison

use std::fmt;

use super::error::ParseError;
use super::types::KeyCode;

/// How a candidate sequence relates to an existing binding's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMatch {
    /// Both sequences are identical
    Full,
    /// The candidate is a strict prefix of the existing sequence
    Partial,
    /// The existing sequence is a strict prefix of the candidate
    Shadow,
    /// The sequences diverge
    None,
}

/// An ordered list of key codes in press order
///
/// Only the pending chord of a session may be empty; parsed sequences never are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyCode>);

impl KeySequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a raw keybinding such as `ctrlcmd+k ctrlcmd+c`
    pub fn parse(text: &str) -> Result<KeySequence, ParseError> {
        let codes = text
            .split_whitespace()
            .map(KeyCode::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if codes.is_empty() {
            return Err(ParseError::EmptySequence);
        }
        Ok(KeySequence(codes))
    }

    pub fn push(&mut self, code: KeyCode) {
        self.0.push(code);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyCode> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[KeyCode] {
        &self.0
    }

    /// Compare this (candidate) sequence against an existing binding's sequence
    pub fn compare(&self, existing: &KeySequence) -> SequenceMatch {
        let shared = self.len().min(existing.len());
        if self.0[..shared] != existing.0[..shared] {
            return SequenceMatch::None;
        }
        match self.len().cmp(&existing.len()) {
            std::cmp::Ordering::Equal => SequenceMatch::Full,
            std::cmp::Ordering::Less => SequenceMatch::Partial,
            std::cmp::Ordering::Greater => SequenceMatch::Shadow,
        }
    }
}

impl From<Vec<KeyCode>> for KeySequence {
    fn from(codes: Vec<KeyCode>) -> Self {
        Self(codes)
    }
}

impl FromIterator<KeyCode> for KeySequence {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeySequence {
    type Item = &'a KeyCode;
    type IntoIter = std::slice::Iter<'a, KeyCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}
