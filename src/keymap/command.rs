//! Command execution seam
//!
//! The engine never runs commands itself. On a full match it hands the
//! command identifier and arguments to a [`CommandExecutor`], which reports
//! back whether the command fired.

use std::collections::HashSet;

use serde_json::Value;

/// Pseudo-command that lets the key event reach the host unhandled
pub const PASSTHROUGH_COMMAND: &str = "passthrough";

/// Runs commands on behalf of the chord runtime
pub trait CommandExecutor {
    /// Execute `command`, returning `false` if it did not fire
    ///
    /// A `false` return makes the runtime try the next enabled full match.
    fn execute(&mut self, command: &str, args: &[Value]) -> bool;
}

impl<F> CommandExecutor for F
where
    F: FnMut(&str, &[Value]) -> bool,
{
    fn execute(&mut self, command: &str, args: &[Value]) -> bool {
        self(command, args)
    }
}

/// Executor that records every invocation
///
/// Commands listed with [`CommandLog::failing`] report failure, which lets
/// callers exercise fall-through to lower-ranked bindings.
#[derive(Debug, Default, Clone)]
pub struct CommandLog {
    invoked: Vec<(String, Vec<Value>)>,
    failing: HashSet<String>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` report failure (builder pattern)
    pub fn failing(mut self, command: impl Into<String>) -> Self {
        self.failing.insert(command.into());
        self
    }

    /// Every command attempted so far, in order
    pub fn invoked(&self) -> impl Iterator<Item = &str> {
        self.invoked.iter().map(|(command, _)| command.as_str())
    }

    /// Arguments of the most recent invocation
    pub fn last_args(&self) -> Option<&[Value]> {
        self.invoked.last().map(|(_, args)| args.as_slice())
    }

    pub fn clear(&mut self) {
        self.invoked.clear();
    }
}

impl CommandExecutor for CommandLog {
    fn execute(&mut self, command: &str, args: &[Value]) -> bool {
        tracing::debug!("Executing {} with {} args", command, args.len());
        self.invoked.push((command.to_string(), args.to_vec()));
        !self.failing.contains(command)
    }
}
