//! Periodic refresh controller
//!
//! Decides when the whole response cache should be invalidated. The controller is
//! cooperative: the UI loop calls [`RefreshState::tick`] on every pass and it only
//! compares timestamps unless the refresh interval has elapsed. There is no timer
//! task, so the cache and this state are only ever touched from the UI loop.

use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::cache::RefreshingCache;

/// Default period between forced invalidations in seconds
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 60;

/// Result of a refresh check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cache was cleared; the caller should re-run its fetch and render pass
    RefreshOccurred,
    /// Nothing happened
    NoOp,
}

/// Phase of the refresh cycle as seen at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Waiting for the interval to elapse
    Idle,
    /// The interval has elapsed and an invalidation is pending
    Due,
}

/// Configuration for periodic refresh
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between forced cache invalidations
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::seconds(DEFAULT_REFRESH_INTERVAL_SECS),
            enabled: true,
        }
    }
}

/// Per-session refresh bookkeeping
#[derive(Debug, Clone)]
pub struct RefreshState {
    last_refresh_at: DateTime<Utc>,
    interval: Duration,
    auto_refresh_enabled: bool,
}

impl RefreshState {
    /// Creates the state at session start; the first interval starts at `now`
    pub fn new(config: &RefreshConfig, now: DateTime<Utc>) -> Self {
        Self {
            last_refresh_at: now,
            interval: config.interval,
            auto_refresh_enabled: config.enabled,
        }
    }

    pub fn last_refresh_at(&self) -> DateTime<Utc> {
        self.last_refresh_at
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh_enabled
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        if self.auto_refresh_enabled != enabled {
            info!(event = "refresh.auto_refresh_toggled", enabled);
        }
        self.auto_refresh_enabled = enabled;
    }

    /// Flips auto-refresh and returns the new setting
    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.set_auto_refresh(!self.auto_refresh_enabled);
        self.auto_refresh_enabled
    }

    /// Reports the phase at `now` without changing anything
    pub fn phase_at(&self, now: DateTime<Utc>) -> RefreshPhase {
        if self.auto_refresh_enabled && now - self.last_refresh_at > self.interval {
            RefreshPhase::Due
        } else {
            RefreshPhase::Idle
        }
    }

    /// Invalidates `cache` if the refresh interval has elapsed
    ///
    /// Safe to call on every UI pass: unless a refresh is due this is a single
    /// timestamp comparison.
    ///
    /// # Returns
    /// * `TickOutcome::RefreshOccurred` - The cache was cleared and the timer reset
    /// * `TickOutcome::NoOp` - Auto-refresh is off or the interval has not elapsed
    pub fn tick<K, V>(&mut self, now: DateTime<Utc>, cache: &RefreshingCache<K, V>) -> TickOutcome
    where
        K: Eq + Hash + Clone + Display,
        V: Clone,
    {
        match self.phase_at(now) {
            RefreshPhase::Idle => TickOutcome::NoOp,
            RefreshPhase::Due => {
                cache.invalidate_all();
                self.last_refresh_at = now;
                info!(event = "refresh.periodic", at = %now);
                TickOutcome::RefreshOccurred
            }
        }
    }

    /// Clears `cache` immediately and restarts the interval
    pub fn manual_refresh<K, V>(&mut self, now: DateTime<Utc>, cache: &RefreshingCache<K, V>)
    where
        K: Eq + Hash + Clone + Display,
        V: Clone,
    {
        cache.invalidate_all();
        self.last_refresh_at = now;
        info!(event = "refresh.manual", at = %now);
    }

    /// Whole seconds until the next periodic refresh, or `None` when disabled
    pub fn seconds_until_refresh(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.auto_refresh_enabled {
            return None;
        }
        let elapsed = now - self.last_refresh_at;
        Some((self.interval - elapsed).num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap() + Duration::seconds(secs)
    }

    async fn filled_cache(at: DateTime<Utc>) -> RefreshingCache<&'static str, Value> {
        let cache = RefreshingCache::new();
        cache
            .get_at("go/stats", Duration::seconds(600), at, || async { Ok(json!([])) })
            .await
            .unwrap();
        cache
    }

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Duration::seconds(60));
        assert!(config.enabled);
    }

    #[test]
    fn test_refresh_config_custom() {
        let config = RefreshConfig {
            interval: Duration::seconds(15),
            enabled: false,
        };
        let state = RefreshState::new(&config, t(0));
        assert_eq!(state.interval(), Duration::seconds(15));
        assert!(!state.auto_refresh_enabled());
        assert_eq!(state.last_refresh_at(), t(0));
    }

    #[tokio::test]
    async fn test_tick_is_noop_before_interval() {
        let cache = filled_cache(t(0)).await;
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        assert_eq!(state.tick(t(30), &cache), TickOutcome::NoOp);
        assert_eq!(state.tick(t(60), &cache), TickOutcome::NoOp, "Interval must be exceeded");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_tick_fires_and_clears_cache_after_interval() {
        let cache = filled_cache(t(0)).await;
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        assert_eq!(state.tick(t(61), &cache), TickOutcome::RefreshOccurred);
        assert!(cache.is_empty());
        assert_eq!(state.last_refresh_at(), t(61));
    }

    #[test]
    fn test_tick_fires_once_per_window() {
        let cache: RefreshingCache<&'static str, Value> = RefreshingCache::new();
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        let mut fired = Vec::new();
        for secs in 0..=200 {
            if state.tick(t(secs), &cache) == TickOutcome::RefreshOccurred {
                fired.push(secs);
            }
        }

        assert_eq!(fired, vec![61, 122, 183]);
    }

    #[test]
    fn test_repeated_ticks_within_window_fire_once() {
        let cache: RefreshingCache<&'static str, Value> = RefreshingCache::new();
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        let outcomes: Vec<TickOutcome> = (0..10).map(|_| state.tick(t(75), &cache)).collect();

        assert_eq!(outcomes[0], TickOutcome::RefreshOccurred);
        assert!(outcomes[1..].iter().all(|o| *o == TickOutcome::NoOp));
    }

    #[tokio::test]
    async fn test_disabled_auto_refresh_never_fires() {
        let cache = filled_cache(t(0)).await;
        let config = RefreshConfig {
            enabled: false,
            ..Default::default()
        };
        let mut state = RefreshState::new(&config, t(0));

        for secs in [61, 600, 86_400] {
            assert_eq!(state.tick(t(secs), &cache), TickOutcome::NoOp);
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(state.seconds_until_refresh(t(10)), None);
    }

    #[tokio::test]
    async fn test_manual_refresh_clears_and_resets_timer() {
        let cache = filled_cache(t(0)).await;
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        state.manual_refresh(t(50), &cache);

        assert!(cache.is_empty());
        assert_eq!(state.last_refresh_at(), t(50));
        assert_eq!(state.tick(t(61), &cache), TickOutcome::NoOp, "Timer restarted at t=50");
        assert_eq!(state.tick(t(111), &cache), TickOutcome::RefreshOccurred);
    }

    #[test]
    fn test_phase_at_does_not_mutate() {
        let state = RefreshState::new(&RefreshConfig::default(), t(0));

        assert_eq!(state.phase_at(t(10)), RefreshPhase::Idle);
        assert_eq!(state.phase_at(t(61)), RefreshPhase::Due);
        assert_eq!(state.phase_at(t(61)), RefreshPhase::Due);
        assert_eq!(state.last_refresh_at(), t(0));
    }

    #[test]
    fn test_toggle_auto_refresh() {
        let mut state = RefreshState::new(&RefreshConfig::default(), t(0));

        assert!(!state.toggle_auto_refresh());
        assert_eq!(state.phase_at(t(500)), RefreshPhase::Idle);
        assert!(state.toggle_auto_refresh());
        assert_eq!(state.phase_at(t(500)), RefreshPhase::Due);
    }

    #[test]
    fn test_seconds_until_refresh_counts_down() {
        let state = RefreshState::new(&RefreshConfig::default(), t(0));

        assert_eq!(state.seconds_until_refresh(t(0)), Some(60));
        assert_eq!(state.seconds_until_refresh(t(45)), Some(15));
        assert_eq!(state.seconds_until_refresh(t(90)), Some(0));
    }
}
