//! Override scopes and the layered binding store

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::binding::Keybinding;

/// Override tier, ordered by increasing authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Default,
    User,
    Workspace,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Default, Scope::User, Scope::Workspace];

    /// Scopes from highest to lowest authority, the order lookups walk them in
    pub const BY_AUTHORITY: [Scope; 3] = [Scope::Workspace, Scope::User, Scope::Default];

    /// Scopes cleared by a reset
    pub const OVERRIDES: [Scope; 2] = [Scope::User, Scope::Workspace];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Default => "default",
            Scope::User => "user",
            Scope::Workspace => "workspace",
        };
        write!(f, "{}", name)
    }
}

/// Per-scope binding lists; the front of each list is the most recently registered
#[derive(Debug, Clone)]
pub struct ScopeStore {
    keymaps: BTreeMap<Scope, Vec<Keybinding>>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self {
            keymaps: Scope::ALL.iter().map(|scope| (*scope, Vec::new())).collect(),
        }
    }

    pub fn bindings(&self, scope: Scope) -> &[Keybinding] {
        self.keymaps.get(&scope).map_or(&[][..], Vec::as_slice)
    }

    /// Insert a binding so it is searched before older ones in the same scope
    pub fn insert_front(&mut self, scope: Scope, binding: Keybinding) {
        self.keymaps.entry(scope).or_default().insert(0, binding);
    }

    /// Remove every binding in `scope` matching the predicate, returning how many went
    pub fn remove_where(
        &mut self,
        scope: Scope,
        mut predicate: impl FnMut(&Keybinding) -> bool,
    ) -> usize {
        let Some(list) = self.keymaps.get_mut(&scope) else {
            return 0;
        };
        let before = list.len();
        list.retain(|binding| !predicate(binding));
        before - list.len()
    }

    /// Clear every scope except DEFAULT
    pub fn reset(&mut self) {
        for scope in Scope::OVERRIDES {
            if let Some(list) = self.keymaps.get_mut(&scope) {
                list.clear();
            }
        }
    }

    /// Drop every cached resolution in every scope
    pub fn invalidate_all(&mut self) {
        for binding in self.keymaps.values_mut().flatten() {
            binding.invalidate();
        }
    }

    pub fn len(&self) -> usize {
        self.keymaps.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}
