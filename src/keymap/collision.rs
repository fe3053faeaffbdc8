//! Collision classification between a candidate key sequence and existing bindings

use std::fmt;

use super::binding::Keybinding;
use super::layout::KeyboardLayout;
use super::sequence::{KeySequence, SequenceMatch};

/// Bindings bucketed by how they relate to a candidate sequence
///
/// A binding appears in at most one bucket per classification.
#[derive(Debug, Clone, Default)]
pub struct CollisionResult<'a> {
    /// Exact sequence matches
    pub full: Vec<&'a Keybinding>,
    /// Bindings the candidate is a strict prefix of
    pub partial: Vec<&'a Keybinding>,
    /// Bindings that are a strict prefix of the candidate
    pub shadow: Vec<&'a Keybinding>,
}

impl<'a> CollisionResult<'a> {
    /// Append another result's buckets to this one
    pub fn merge(&mut self, other: CollisionResult<'a>) -> &mut Self {
        self.full.extend(other.full);
        self.partial.extend(other.partial);
        self.shadow.extend(other.shadow);
        self
    }

    /// A new result keeping only bindings accepted by `keep`
    pub fn filter(&self, mut keep: impl FnMut(&Keybinding) -> bool) -> CollisionResult<'a> {
        CollisionResult {
            full: self.full.iter().copied().filter(|b| keep(b)).collect(),
            partial: self.partial.iter().copied().filter(|b| keep(b)).collect(),
            shadow: self.shadow.iter().copied().filter(|b| keep(b)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty() && self.partial.is_empty() && self.shadow.is_empty()
    }

    /// The most severe collision, FULL before PARTIAL before SHADOW
    pub fn conflict(&self) -> Option<KeybindingConflict> {
        let (kind, binding) = if let Some(b) = self.full.first() {
            (CollisionKind::Full, b)
        } else if let Some(b) = self.partial.first() {
            (CollisionKind::Partial, b)
        } else if let Some(b) = self.shadow.first() {
            (CollisionKind::Shadow, b)
        } else {
            return None;
        };
        Some(KeybindingConflict {
            kind,
            command: binding.command.clone(),
            when: binding.when.as_ref().map(|w| w.normalize()),
        })
    }
}

/// Classify every binding in `existing` against `candidate`
///
/// Bindings whose key string cannot be resolved are logged and left out.
pub fn classify<'a>(
    existing: &'a [Keybinding],
    candidate: &KeySequence,
    layout: &dyn KeyboardLayout,
) -> CollisionResult<'a> {
    let mut result = CollisionResult::default();
    for binding in existing {
        let sequence = match binding.resolve(layout) {
            Ok(sequence) => sequence,
            Err(e) => {
                tracing::warn!("Skipping keybinding {}: {}", binding.stringify(), e);
                continue;
            }
        };
        match candidate.compare(sequence) {
            SequenceMatch::Full => result.full.push(binding),
            SequenceMatch::Partial => result.partial.push(binding),
            SequenceMatch::Shadow => result.shadow.push(binding),
            SequenceMatch::None => {}
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Same key sequence
    Full,
    /// The new binding is a prefix of an existing one
    Partial,
    /// An existing binding is a prefix of the new one
    Shadow,
}

/// The conflict reported when validating a binding against a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindingConflict {
    pub kind: CollisionKind,
    /// First colliding command
    pub command: String,
    /// Normalized when-clause of the colliding binding
    pub when: Option<String>,
}

impl fmt::Display for KeybindingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.when {
            Some(when) => format!("{}{{{}}}", self.command, when),
            None => self.command.clone(),
        };
        match self.kind {
            CollisionKind::Full => write!(f, "Keybinding collides with {}", target),
            CollisionKind::Partial => write!(f, "Keybinding is the start of {}", target),
            CollisionKind::Shadow => write!(f, "Keybinding is unreachable behind {}", target),
        }
    }
}
