//! GitHub API rate limit guard.
//!
//! Every tracker call checks the core budget first. The bot answers a human
//! in a chat, so waits are capped at a minute; a longer reset is surfaced as
//! an error instead of blocking the conversation.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Longest wait accepted before giving up.
const MAX_WAIT_SECS: u64 = 60;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for a specific resource.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

/// What the guard decided for a given budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    /// Enough requests left.
    Proceed,
    /// Wait this many seconds, then proceed.
    Wait(u64),
    /// The window resets too far in the future.
    Exhausted { reset: u64 },
}

impl RateLimitInfo {
    /// Decides how to proceed at time `now` (Unix seconds).
    #[must_use]
    pub fn throttle(&self, now: u64) -> Throttle {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return Throttle::Proceed;
        }
        let wait_secs = self.reset - now;
        if wait_secs > MAX_WAIT_SECS {
            Throttle::Exhausted { reset: self.reset }
        } else {
            Throttle::Wait(wait_secs)
        }
    }
}

/// Checks the current rate limit status for core API (issues, labels, ...).
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Ensures sufficient rate limit before making core API calls.
///
/// Returns `Ok(Some(reset))` when the budget is exhausted for longer than the
/// wait cap; the caller reports it instead of issuing the request.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<Option<u64>, octocrab::Error> {
    let info = check_core_rate_limit(octocrab).await?;
    match info.throttle(unix_now()) {
        Throttle::Proceed => Ok(None),
        Throttle::Wait(secs) => {
            info!(
                remaining = info.remaining,
                wait_secs = secs,
                "Rate limit low, waiting for reset"
            );
            tokio::time::sleep(Duration::from_secs(secs)).await;
            Ok(None)
        }
        Throttle::Exhausted { reset } => {
            warn!(
                remaining = info.remaining,
                reset,
                max_wait = MAX_WAIT_SECS,
                "Rate limit exhausted"
            );
            Ok(Some(reset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(remaining: u32, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            reset,
            limit: 5000,
        }
    }

    #[test]
    fn plenty_of_budget_proceeds() {
        assert_eq!(info(100, 2_000).throttle(1_000), Throttle::Proceed);
    }

    #[test]
    fn passed_reset_proceeds() {
        assert_eq!(info(1, 0).throttle(1_000), Throttle::Proceed);
    }

    #[test]
    fn near_reset_waits() {
        assert_eq!(info(1, 1_030).throttle(1_000), Throttle::Wait(30));
    }

    #[test]
    fn distant_reset_is_exhausted() {
        assert_eq!(
            info(0, 4_600).throttle(1_000),
            Throttle::Exhausted { reset: 4_600 }
        );
    }
}
