//! Pending chord state: the keys typed so far and the continuation timer

use std::time::{Duration, Instant};

use super::sequence::KeySequence;
use super::types::KeyCode;

/// Identifies one scheduled chord timeout
///
/// Tokens increase monotonically per session, so a callback holding an old
/// token can tell that it has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    deadline: Instant,
    token: TimerToken,
}

/// The single in-progress chord owned by a runtime
#[derive(Debug, Default)]
pub struct ChordSession {
    keys: KeySequence,
    timer: Option<Timer>,
    next_token: u64,
}

impl ChordSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys buffered so far
    pub fn keys(&self) -> &KeySequence {
        &self.keys
    }

    /// Whether any keys are buffered
    pub fn is_pending(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn push(&mut self, code: KeyCode) {
        self.keys.push(code);
    }

    /// Drop the buffered keys and any running timer
    pub fn clear(&mut self) {
        self.keys.clear();
        self.cancel_timer();
    }

    pub fn cancel_timer(&mut self) {
        self.timer = None;
    }

    /// Start a new timer, replacing any running one
    pub fn start_timer(&mut self, now: Instant, timeout: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.timer = Some(Timer {
            deadline: now + timeout,
            token,
        });
        token
    }

    /// Token of the running timer, if any
    pub fn active_timer(&self) -> Option<TimerToken> {
        self.timer.map(|t| t.token)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// Whether the running timer's deadline has passed
    pub fn is_expired(&self, now: Instant) -> bool {
        self.timer.is_some_and(|t| now >= t.deadline)
    }

    /// Whether `token` names the running timer
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.active_timer() == Some(token)
    }
}
