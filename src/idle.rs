use std::time::{Duration, Instant};

use crate::config::IdleConfig;

/// Inactivity indicator.
///
/// Input re-arms a countdown; when it runs out the flag goes up and then drops
/// again after `clear_after`, whether or not the user is still away. It fires
/// once per quiet period.
#[derive(Debug, Clone)]
pub struct IdleSignal {
    enabled: bool,
    idle_after: Duration,
    clear_after: Duration,
    last_input: Instant,
    armed: bool,
    raised_at: Option<Instant>,
}

impl IdleSignal {
    pub fn new(config: &IdleConfig, now: Instant) -> Self {
        Self {
            enabled: config.enabled,
            idle_after: config.idle_after(),
            clear_after: config.clear_after(),
            last_input: now,
            armed: true,
            raised_at: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.raised_at.is_some()
    }

    pub fn record_input(&mut self, now: Instant) {
        self.last_input = now;
        self.armed = true;
    }

    /// Advances the timers; returns true when the flag changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(raised_at) = self.raised_at {
            if now.duration_since(raised_at) >= self.clear_after {
                self.raised_at = None;
                return true;
            }
            return false;
        }
        if self.armed && now.duration_since(self.last_input) >= self.idle_after {
            self.armed = false;
            self.raised_at = Some(now);
            return true;
        }
        false
    }
}
