// ABOUTME: Test support utilities.
// ABOUTME: Provides the fake runtime and recording sleeper for tests.

// Each test binary only uses some of these items, so allow dead_code.
#[allow(dead_code)]
pub mod fake_runtime;

use async_trait::async_trait;
use stakkr::retry::Sleeper;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeper that records requested backoffs instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
