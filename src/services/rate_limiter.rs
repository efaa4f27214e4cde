// src/services/rate_limiter.rs
// DOCUMENTATION: Per-client rate limiting for the auth endpoints
// PURPOSE: Throttle signup and token requests so confirmation codes cannot be brute-forced

use crate::errors::YamdbError;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Keyed GCRA limiter, one bucket per client address
pub struct AuthRateLimiter {
    limiter: Option<DefaultKeyedRateLimiter<IpAddr>>,
}

impl AuthRateLimiter {
    /// `per_minute == 0` disables limiting
    pub fn new(per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(per_minute)
            .map(|n| RateLimiter::keyed(Quota::per_minute(n)));
        Self { limiter }
    }

    /// Consume one request for `ip`
    pub fn check(&self, ip: IpAddr) -> Result<(), YamdbError> {
        match &self.limiter {
            Some(limiter) => limiter.check_key(&ip).map_err(|_| {
                log::warn!("Auth rate limit exceeded for {}", ip);
                YamdbError::RateLimitExceeded
            }),
            None => Ok(()),
        }
    }

    /// Drop buckets that have fully replenished
    pub fn cleanup(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically forgets idle clients
pub fn start_rate_limit_cleanup_task(limiter: Arc<AuthRateLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}
