// ABOUTME: Retry policy with injectable sleep for backoff between attempts.
// ABOUTME: Tests substitute a recording sleeper so backoff takes no real time.

use async_trait::async_trait;
use std::time::Duration;

/// Sleep abstraction so retry loops can be tested without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

// Borrowed sleepers work too, so callers can keep inspecting one they
// handed off to a retrying component.
#[async_trait]
impl<'a, T: Sleeper + ?Sized> Sleeper for &'a T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded-attempt retry policy.
///
/// The backoff duration is chosen per attempt by the caller's error
/// classification; the policy only bounds how many tries happen at all.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
        }
    }
}
