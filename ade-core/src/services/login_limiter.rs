//! Per-address login attempt limiter.
//!
//! Failed logins are counted per client address, regardless of the user name
//! that was tried. Once an address reaches the configured number of failures
//! it is blocked for a fixed period. State lives in memory only: it is lost on
//! restart and is not shared between server instances.
//!
//! # Example
//!
//! ```rust
//! use ade_core::services::{LoginAttemptLimiter, LoginLimitConfig};
//!
//! let limiter = LoginAttemptLimiter::new(LoginLimitConfig::default());
//!
//! // Before verifying credentials
//! assert!(!limiter.check_blocked("203.0.113.7").blocked);
//!
//! // After a failed verification
//! let outcome = limiter.record_failure("203.0.113.7");
//! assert_eq!(outcome.remaining_attempts, 2);
//!
//! // After a successful verification
//! limiter.clear_on_success("203.0.113.7");
//! assert_eq!(limiter.attempts("203.0.113.7"), 0);
//! ```

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginLimitConfig {
    /// Failures that trigger a block
    pub max_attempts: u32,
    /// How long an address stays blocked
    pub block_duration: Duration,
}

impl LoginLimitConfig {
    /// Longest block accepted from configuration: one year.
    pub const MAX_BLOCK_MINUTES: i64 = 365 * 24 * 60;
}

impl Default for LoginLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            block_duration: Duration::minutes(15),
        }
    }
}

/// Attempt counter for one address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginAttemptRecord {
    pub count: u32,
    pub blocked_until: Option<DateTime<Utc>>,
}

impl LoginAttemptRecord {
    fn is_blocked_at(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    fn block_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until <= now)
    }
}

/// Result of [`LoginAttemptLimiter::check_blocked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatus {
    pub blocked: bool,
    /// Whole seconds until the block lifts, rounded up; zero when not blocked.
    pub retry_after_seconds: i64,
}

impl BlockStatus {
    fn open() -> Self {
        Self {
            blocked: false,
            retry_after_seconds: 0,
        }
    }
}

/// Result of [`LoginAttemptLimiter::record_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureOutcome {
    pub blocked: bool,
    /// Failures left before the address is blocked.
    pub remaining_attempts: u32,
    pub retry_after_seconds: i64,
}

/// In-memory limiter shared by every login request.
///
/// Each read-check-write sequence runs under the map's per-key lock, so
/// concurrent failures from one address cannot lose updates.
#[derive(Debug)]
pub struct LoginAttemptLimiter {
    records: DashMap<String, LoginAttemptRecord>,
    config: LoginLimitConfig,
}

impl Default for LoginAttemptLimiter {
    fn default() -> Self {
        Self::new(LoginLimitConfig::default())
    }
}

impl LoginAttemptLimiter {
    pub fn new(config: LoginLimitConfig) -> Self {
        Self {
            records: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &LoginLimitConfig {
        &self.config
    }

    pub fn check_blocked(&self, address: &str) -> BlockStatus {
        self.check_blocked_at(address, Utc::now())
    }

    /// Report whether `address` is blocked at `now`. Never mutates state.
    pub fn check_blocked_at(&self, address: &str, now: DateTime<Utc>) -> BlockStatus {
        let Some(record) = self.records.get(address) else {
            return BlockStatus::open();
        };

        match record.blocked_until {
            Some(until) if until > now => BlockStatus {
                blocked: true,
                retry_after_seconds: ceil_seconds(until - now),
            },
            _ => BlockStatus::open(),
        }
    }

    pub fn record_failure(&self, address: &str) -> FailureOutcome {
        self.record_failure_at(address, Utc::now())
    }

    /// Count a failed attempt for `address` at `now`.
    ///
    /// An expired block counts as no record at all, so the count restarts at
    /// one. A failure reported while a block is active leaves the block as is.
    pub fn record_failure_at(&self, address: &str, now: DateTime<Utc>) -> FailureOutcome {
        let mut entry = self.records.entry(address.to_string()).or_default();
        let record = entry.value_mut();

        if record.block_expired_at(now) {
            *record = LoginAttemptRecord::default();
        }

        if let Some(until) = record.blocked_until.filter(|until| *until > now) {
            return FailureOutcome {
                blocked: true,
                remaining_attempts: 0,
                retry_after_seconds: ceil_seconds(until - now),
            };
        }

        record.count = record.count.saturating_add(1);

        if record.count >= self.config.max_attempts {
            let until = now
                .checked_add_signed(self.config.block_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            record.blocked_until = Some(until);
            tracing::warn!(
                address = %address,
                attempts = record.count,
                blocked_until = %until,
                "Too many failed login attempts, blocking address"
            );
            return FailureOutcome {
                blocked: true,
                remaining_attempts: 0,
                retry_after_seconds: ceil_seconds(until - now),
            };
        }

        FailureOutcome {
            blocked: false,
            remaining_attempts: self.config.max_attempts - record.count,
            retry_after_seconds: 0,
        }
    }

    pub fn clear_on_success(&self, address: &str) {
        self.clear_on_success_at(address, Utc::now());
    }

    /// Forget `address` after a successful login, unless it is currently blocked.
    pub fn clear_on_success_at(&self, address: &str, now: DateTime<Utc>) {
        let removed = self
            .records
            .remove_if(address, |_, record| !record.is_blocked_at(now));

        if removed.is_some() {
            tracing::debug!(address = %address, "Cleared login attempts");
        }
    }

    /// Failures currently counted for `address` (zero when absent or expired).
    pub fn attempts(&self, address: &str) -> u32 {
        self.attempts_at(address, Utc::now())
    }

    pub fn attempts_at(&self, address: &str, now: DateTime<Utc>) -> u32 {
        self.records
            .get(address)
            .filter(|record| !record.block_expired_at(now))
            .map(|record| record.count)
            .unwrap_or(0)
    }

    /// Number of addresses with a stored record, including stale ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn reset(&self) {
        self.records.clear();
    }

    /// Remove records whose block has expired. Returns how many were dropped.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.block_expired_at(now));
        before.saturating_sub(self.records.len())
    }

    /// Start the background cleanup task.
    ///
    /// Expired blocks are swept hourly until `shutdown` changes.
    pub fn start_cleanup_task(
        self: std::sync::Arc<Self>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let count = self.purge_expired_at(Utc::now());
                        if count > 0 {
                            tracing::info!(count = count, "Purged expired login blocks");
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login limiter cleanup task");
                        break;
                    }
                }
            }
        })
    }
}

fn ceil_seconds(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds().max(0);
    (millis + 999) / 1000
}
