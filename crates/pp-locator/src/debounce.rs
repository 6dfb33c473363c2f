//! Keystroke debouncing for live search.

use pp_core::EngineConfig;
use std::time::Duration;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingQuery {
    query: String,
    due: Instant,
}

/// Last-write-wins debouncer driven by caller-supplied instants.
///
/// Every [`input`](Self::input) replaces whatever was pending. Once the quiet
/// period has elapsed, [`poll`](Self::poll) hands out the trimmed query if it
/// is long enough; shorter queries are dropped silently.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    quiet_period: Duration,
    min_chars: usize,
    pending: Option<PendingQuery>,
}

impl QueryDebouncer {
    pub fn new(quiet_period: Duration, min_chars: usize) -> Self {
        Self {
            quiet_period,
            min_chars,
            pending: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.debounce_quiet_period, config.min_query_chars)
    }

    pub fn input(&mut self, raw: &str, now: Instant) {
        self.pending = Some(PendingQuery {
            query: raw.trim().to_owned(),
            due: now + self.quiet_period,
        });
    }

    /// When the pending query becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.deadline().is_none_or(|due| now < due) {
            return None;
        }
        let pending = self.pending.take()?;
        (pending.query.chars().count() >= self.min_chars).then_some(pending.query)
    }
}
