//! Context system for conditional keybindings
//!
//! The resolution engine never evaluates when-clauses itself; it asks a
//! [`ContextMatcher`]. [`KeyContext`] is a straightforward snapshot-based
//! implementation that hosts can use directly or replace.

use std::collections::HashMap;

use super::when::WhenClause;

/// Evaluates when-clauses against the live UI context
pub trait ContextMatcher {
    /// Whether `when` holds for the element identified by `target` (or globally)
    fn matches(&self, when: &WhenClause, target: Option<&str>) -> bool;
}

/// A context key value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Bool(bool),
    Str(String),
}

impl ContextValue {
    fn is_truthy(&self) -> bool {
        match self {
            ContextValue::Bool(b) => *b,
            ContextValue::Str(s) => !s.is_empty(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

/// Snapshot of context keys, with optional per-element overlays
///
/// Keys set for a target element shadow the global keys while an event is
/// dispatched to that element.
#[derive(Debug, Clone, Default)]
pub struct KeyContext {
    global: HashMap<String, ContextValue>,
    scoped: HashMap<String, HashMap<String, ContextValue>>,
}

impl KeyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global context key (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.global.insert(key.into(), value.into());
    }

    /// Set a context key that only applies while `target` has focus
    pub fn set_for(
        &mut self,
        target: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) {
        self.scoped
            .entry(target.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.global.remove(key);
    }

    pub fn clear(&mut self) {
        self.global.clear();
        self.scoped.clear();
    }

    /// Parse `key` / `key=value` pairs, as given on the command line
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut context = Self::new();
        for pair in pairs {
            match pair.split_once('=') {
                Some((key, value)) => match value.trim() {
                    "true" => context.set(key.trim(), true),
                    "false" => context.set(key.trim(), false),
                    other => context.set(key.trim(), other),
                },
                None => context.set(pair.trim(), true),
            }
        }
        context
    }

    pub fn get(&self, key: &str, target: Option<&str>) -> Option<&ContextValue> {
        target
            .and_then(|t| self.scoped.get(t))
            .and_then(|values| values.get(key))
            .or_else(|| self.global.get(key))
    }

    /// Evaluate a when-clause against this snapshot
    pub fn evaluate(&self, when: &WhenClause, target: Option<&str>) -> bool {
        let truthy = |key: &str| self.get(key, target).is_some_and(ContextValue::is_truthy);
        let text = |key: &str| self.get(key, target).map(ContextValue::as_text);

        match when {
            WhenClause::Defined(key) => truthy(key),
            WhenClause::Not(key) => !truthy(key),
            WhenClause::Equals(key, value) => text(key).as_deref() == Some(value.as_str()),
            WhenClause::NotEquals(key, value) => text(key).as_deref() != Some(value.as_str()),
            WhenClause::Regex {
                key,
                pattern,
                ignore_case,
            } => regex_matches(pattern, *ignore_case, text(key).as_deref()),
            WhenClause::NotRegex {
                key,
                pattern,
                ignore_case,
            } => !regex_matches(pattern, *ignore_case, text(key).as_deref()),
            WhenClause::And(terms) => terms.iter().all(|t| self.evaluate(t, target)),
            WhenClause::Or(terms) => terms.iter().any(|t| self.evaluate(t, target)),
        }
    }
}

fn regex_matches(pattern: &str, ignore_case: bool, value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match regex::RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
    {
        Ok(re) => re.is_match(value),
        Err(e) => {
            tracing::debug!("Invalid when-clause regex /{}/: {}", pattern, e);
            false
        }
    }
}

impl ContextMatcher for KeyContext {
    fn matches(&self, when: &WhenClause, target: Option<&str>) -> bool {
        self.evaluate(when, target)
    }
}
