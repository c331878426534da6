//! In-memory rate limiter.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Counters are per process, so each replica limits independently.
//! Lapsed windows are swept at most once per [`SWEEP_INTERVAL_SECS`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{FeatureFlags, RateLimitRule};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

/// Resource names used by the HTTP layer.
pub const LOGIN_RESOURCE: &str = "login";
pub const SIGNUP_RESOURCE: &str = "signup";
pub const CONTACT_RESOURCE: &str = "contact";

const FALLBACK_RULE: RateLimitRule = RateLimitRule::new(60, 60);

const SWEEP_INTERVAL_SECS: i64 = 60;

/// Fixed-window limiter keyed by `resource:identifier`.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    rules: HashMap<String, RateLimitRule>,
    windows: Arc<RwLock<Windows>>,
}

#[derive(Debug, Default)]
struct Windows {
    states: HashMap<String, WindowState>,
    last_sweep: i64,
}

impl Windows {
    fn sweep(&mut self, now: i64) {
        if now - self.last_sweep < SWEEP_INTERVAL_SECS {
            return;
        }
        self.states.retain(|_, state| !state.lapsed(now));
        self.last_sweep = now;
    }
}

#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: i64,
    window_secs: u64,
}

impl WindowState {
    fn lapsed(&self, now: i64) -> bool {
        now >= self.window_start + self.window_secs as i64
    }
}

impl InMemoryRateLimiter {
    pub fn new(rules: HashMap<String, RateLimitRule>) -> Self {
        Self {
            rules,
            windows: Arc::new(RwLock::new(Windows::default())),
        }
    }

    /// Login, signup and contact rules from the feature flags.
    pub fn from_features(features: &FeatureFlags) -> Self {
        let rules = HashMap::from([
            (LOGIN_RESOURCE.to_string(), features.login_limit),
            (SIGNUP_RESOURCE.to_string(), features.signup_limit),
            (CONTACT_RESOURCE.to_string(), features.contact_limit),
        ]);
        Self::new(rules)
    }

    fn rule_for(&self, key: &RateLimitKey) -> RateLimitRule {
        self.rules.get(&key.resource).copied().unwrap_or(FALLBACK_RULE)
    }

    async fn check_at(
        &self,
        key: RateLimitKey,
        now: i64,
    ) -> Result<RateLimitResult, RateLimitError> {
        let rule = self.rule_for(&key);
        let window_secs = rule.window_secs as i64;
        let mut windows = self.windows.write().await;
        windows.sweep(now);

        let state = windows.states.entry(key.storage_key()).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
            window_secs: rule.window_secs,
        });

        if state.lapsed(now) {
            state.count = 0;
            state.window_start = now;
            state.window_secs = rule.window_secs;
        }

        let window_end = state.window_start + window_secs;
        if state.count >= rule.requests {
            let retry_after = window_end.saturating_sub(now).max(1) as u32;
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit: rule.requests,
                retry_after_secs: retry_after,
                message: format!(
                    "Too many {} attempts. Retry after {} seconds.",
                    key.resource, retry_after
                ),
            }));
        }

        state.count += 1;
        let reset_at = Timestamp::from_unix_secs(window_end).unwrap_or_else(Timestamp::now);
        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit: rule.requests,
            remaining: rule.requests.saturating_sub(state.count),
            reset_at,
            window_secs: rule.window_secs as u32,
        }))
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        self.check_at(key, Timestamp::now().as_unix_secs()).await
    }

    async fn reset(&self, key: RateLimitKey) -> Result<(), RateLimitError> {
        let mut windows = self.windows.write().await;
        windows.states.remove(&key.storage_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(requests: u32, window_secs: u64) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(HashMap::from([(
            CONTACT_RESOURCE.to_string(),
            RateLimitRule::new(requests, window_secs),
        )]))
    }

    #[tokio::test]
    async fn denies_requests_at_limit() {
        let limiter = limiter(3, 60);
        let key = RateLimitKey::ip("192.168.1.1", CONTACT_RESOURCE);

        for _ in 0..3 {
            assert!(limiter.check_at(key.clone(), 1_000).await.unwrap().is_allowed());
        }

        let result = limiter.check_at(key.clone(), 1_010).await.unwrap();
        match result {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.limit, 3);
                assert_eq!(denied.retry_after_secs, 50);
            }
            RateLimitResult::Allowed(_) => panic!("fourth request should be denied"),
        }
    }

    #[tokio::test]
    async fn window_expiry_resets_counter() {
        let limiter = limiter(1, 60);
        let key = RateLimitKey::ip("10.0.0.1", CONTACT_RESOURCE);

        assert!(limiter.check_at(key.clone(), 0).await.unwrap().is_allowed());
        assert!(limiter.check_at(key.clone(), 59).await.unwrap().is_denied());
        assert!(limiter.check_at(key.clone(), 60).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn lapsed_windows_are_swept() {
        let limiter = limiter(1, 60);
        for i in 0..50 {
            let key = RateLimitKey::ip(&format!("10.1.0.{}", i), CONTACT_RESOURCE);
            limiter.check_at(key, 10).await.unwrap();
        }
        assert_eq!(limiter.windows.read().await.states.len(), 50);

        let late = RateLimitKey::ip("10.2.0.1", CONTACT_RESOURCE);
        assert!(limiter.check_at(late, 200).await.unwrap().is_allowed());
        assert_eq!(limiter.windows.read().await.states.len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_counter() {
        let limiter = limiter(1, 3600);
        let key = RateLimitKey::ip("10.0.0.2", CONTACT_RESOURCE);

        limiter.check(key.clone()).await.unwrap();
        assert!(limiter.check(key.clone()).await.unwrap().is_denied());

        limiter.reset(key.clone()).await.unwrap();
        assert!(limiter.check(key).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn different_ips_and_resources_are_independent() {
        let limiter = limiter(1, 3600);
        let first = RateLimitKey::ip("1.1.1.1", CONTACT_RESOURCE);
        let second = RateLimitKey::ip("2.2.2.2", CONTACT_RESOURCE);

        limiter.check(first.clone()).await.unwrap();
        assert!(limiter.check(first).await.unwrap().is_denied());
        assert!(limiter.check(second).await.unwrap().is_allowed());

        // unknown resources fall back to a generous default
        let other = RateLimitKey::ip("1.1.1.1", "unlisted");
        assert!(limiter.check(other).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn remaining_decrements_correctly() {
        let limiter = limiter(5, 60);
        let key = RateLimitKey::ip("test-ip", CONTACT_RESOURCE);

        for expected_remaining in (0..5u32).rev() {
            match limiter.check(key.clone()).await.unwrap() {
                RateLimitResult::Allowed(status) => assert_eq!(status.remaining, expected_remaining),
                RateLimitResult::Denied(_) => panic!("should be allowed"),
            }
        }
    }

    #[tokio::test]
    async fn from_features_uses_configured_rules() {
        let features = FeatureFlags {
            login_limit: RateLimitRule::new(2, 60),
            ..Default::default()
        };
        let limiter = InMemoryRateLimiter::from_features(&features);
        let key = RateLimitKey::ip("9.9.9.9", LOGIN_RESOURCE);

        limiter.check(key.clone()).await.unwrap();
        limiter.check(key.clone()).await.unwrap();
        assert!(limiter.check(key).await.unwrap().is_denied());
    }
}
