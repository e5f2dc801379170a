use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

// stand-in reset point when `now + window` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// Things an anonymous client can be throttled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Submissions,
    Votes,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Submissions => "submissions",
            ActionKind::Votes => "votes",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub max: u32,
    pub window: Duration,
}

impl Limit {
    pub fn new(max: u32, window: Duration) -> Self {
        Self { max, window }
    }

    fn per(&self) -> String {
        if self.window == DAY {
            "per day".to_string()
        } else {
            format!("every {} seconds", self.window.as_secs())
        }
    }

    // Human readable message for a client that hit this limit
    pub fn describe(&self, kind: ActionKind) -> String {
        match kind {
            ActionKind::Submissions => {
                format!("You can share up to {} experiences {}", self.max, self.per())
            }
            ActionKind::Votes => format!("You can cast up to {} votes {}", self.max, self.per()),
        }
    }
}

// Rate limit entry - tracks actions per identity/kind
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    // time left until the current window resets
    pub reset_after: Duration,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fixed-window counter keyed by `"<kind>:<identity>"`.
///
/// Entries are only replaced when their key is checked again after the
/// window lapsed. Nothing sweeps idle keys, so the map grows with the
/// number of distinct identities seen since startup.
pub struct RateLimiter {
    limits: HashMap<ActionKind, Limit>,
    entries: DashMap<String, RateLimitEntry>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(limits: HashMap<ActionKind, Limit>) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: HashMap<ActionKind, Limit>, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn limit(&self, kind: ActionKind) -> Option<Limit> {
        self.limits.get(&kind).copied()
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn check(&self, identity: &str, kind: ActionKind) -> RateLimitDecision {
        // unconfigured kinds are never throttled
        let Some(limit) = self.limit(kind) else {
            return RateLimitDecision {
                allowed: true,
                remaining: u32::MAX,
                reset_after: Duration::ZERO,
            };
        };

        let key = format!("{}:{}", kind, identity);
        let now = self.clock.now();

        // the entry guard holds the shard lock, so check and increment
        // happen as one step for this key
        let mut entry = self.entries.entry(key).or_insert(RateLimitEntry {
            count: 0,
            window_reset_at: now,
        });

        // fresh or lapsed window? start over
        if now >= entry.window_reset_at {
            entry.count = 1;
            entry.window_reset_at = now
                .checked_add(limit.window)
                .or_else(|| now.checked_add(FAR_FUTURE))
                .unwrap_or(now);
            return RateLimitDecision {
                allowed: true,
                remaining: limit.max.saturating_sub(1),
                reset_after: limit.window,
            };
        }

        let reset_after = entry.window_reset_at.saturating_duration_since(now);

        // over limit, leave the entry alone
        if entry.count >= limit.max {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit.max - entry.count,
            reset_after,
        }
    }
}
