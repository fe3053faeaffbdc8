//! Resolution of a typed key sequence into ranked full and partial matches

use std::cmp::Reverse;

use super::binding::Keybinding;
use super::collision::{classify, CollisionResult};
use super::context::ContextMatcher;
use super::registry::KeybindingRegistry;
use super::scope::Scope;
use super::sequence::KeySequence;

impl KeybindingRegistry {
    /// Collect every binding matching `sequence`, most authoritative first
    ///
    /// Scopes are walked WORKSPACE, USER, DEFAULT. A lower-scope full or
    /// partial match is masked when a higher scope already produced the same
    /// command with the same key sequence. Each scope's matches are ranked by
    /// priority, then bindings with a when-clause, then most recently
    /// registered. Partial matches that are not enabled in `context` are
    /// dropped; full matches are left for the caller to check at execution.
    pub fn get_keybindings_for_key_sequence(
        &self,
        sequence: &KeySequence,
        context: &dyn ContextMatcher,
        target: Option<&str>,
    ) -> CollisionResult<'_> {
        let mut result = CollisionResult::default();

        for scope in Scope::BY_AUTHORITY {
            let mut found = classify(self.bindings(scope), sequence, self.layout());
            found.full.retain(|b| !is_masked(&result.full, b));
            found.partial.retain(|b| !is_masked(&result.partial, b));

            rank(&mut found.full);
            rank(&mut found.partial);
            rank(&mut found.shadow);
            result.merge(found);
        }

        result
            .partial
            .retain(|b| self.is_enabled(b, context, target));
        result
    }
}

/// Whether an already accumulated binding has the same command and sequence
fn is_masked(accumulated: &[&Keybinding], binding: &Keybinding) -> bool {
    accumulated
        .iter()
        .any(|a| a.command == binding.command && a.resolved() == binding.resolved())
}

/// Stable sort: priority descending, bindings with a when-clause first
fn rank(bindings: &mut [&Keybinding]) {
    bindings.sort_by_key(|b| (Reverse(b.priority), b.when.is_none()));
}
