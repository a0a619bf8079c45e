// ABOUTME: Image pulling with bounded retry and partial-success tolerance.
// ABOUTME: Error text classification picks the backoff; not-found aborts.

use crate::diagnostics::{Diagnostics, Warning};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::runtime::{ImageError, ImageOps};
use crate::types::ImageRef;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const CONNECTION_REFUSED_BACKOFF: Duration = Duration::from_secs(5);
const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum PullError {
    #[error("image not found: {reference}")]
    NotFound { reference: String },

    #[error("failed to pull {reference} after {attempts} attempts: {last_error}")]
    Failed {
        reference: String,
        attempts: u32,
        last_error: String,
    },

    #[error("all {requested} image pulls failed: {last_error}")]
    AllFailed {
        requested: usize,
        last_error: String,
    },
}

/// How a failed pull attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    /// Daemon or registry unreachable; worth a longer backoff.
    ConnectionRefused,
    /// The image does not exist; retrying cannot help.
    NotFound,
    /// Anything else; short backoff and retry.
    Other,
}

fn classify(error: &ImageError) -> FailureClass {
    if matches!(error, ImageError::NotFound(_)) {
        return FailureClass::NotFound;
    }
    let text = error.to_string().to_ascii_lowercase();
    if text.contains("connection refused") || text.contains("cannot connect") {
        FailureClass::ConnectionRefused
    } else if text.contains("not found")
        || text.contains("manifest unknown")
        || text.contains("no such image")
    {
        FailureClass::NotFound
    } else {
        FailureClass::Other
    }
}

/// Pulls images with bounded retry.
///
/// The sleeper is injectable so tests can observe backoff without waiting
/// for it.
pub struct ImagePuller<S: Sleeper = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl ImagePuller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl Default for ImagePuller {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<S: Sleeper> ImagePuller<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Pull every image, applying the deployment tag to untagged references.
    ///
    /// Tolerates partial failure: at least one successful pull is overall
    /// success (with a warning naming the counts); zero successes fails
    /// with the last error.
    pub async fn pull_all<R: ImageOps>(
        &self,
        runtime: &R,
        images: &[ImageRef],
        tag: &str,
        skip: bool,
        diag: &mut Diagnostics,
    ) -> Result<(), PullError> {
        if skip {
            info!("image pull skipped by configuration");
            return Ok(());
        }

        let mut pulled = 0usize;
        let mut last_error: Option<PullError> = None;

        for image in images {
            match self.pull_with_retry(runtime, image, tag).await {
                Ok(()) => pulled += 1,
                Err(e) => {
                    warn!("pull failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if pulled == 0 {
            let last_error = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no images requested".to_string());
            return Err(PullError::AllFailed {
                requested: images.len(),
                last_error,
            });
        }

        if pulled < images.len() {
            diag.warn(Warning::partial_pull(pulled, images.len()));
        }

        Ok(())
    }

    /// Pull one image, retrying per the failure classification.
    ///
    /// Connection-refused failures back off longer than other transient
    /// failures; a not-found classification aborts immediately.
    pub async fn pull_with_retry<R: ImageOps>(
        &self,
        runtime: &R,
        image: &ImageRef,
        tag: &str,
    ) -> Result<(), PullError> {
        let reference = image.qualified(tag);
        let mut last_error = String::new();

        for attempt in 1..=self.policy.max_attempts {
            match runtime.pull_image(&reference).await {
                Ok(()) => {
                    info!(image = %reference, attempt, "pulled image");
                    return Ok(());
                }
                Err(e) => {
                    let class = classify(&e);
                    last_error = e.to_string();

                    if class == FailureClass::NotFound {
                        return Err(PullError::NotFound {
                            reference: reference.clone(),
                        });
                    }

                    if attempt < self.policy.max_attempts {
                        let backoff = match class {
                            FailureClass::ConnectionRefused => CONNECTION_REFUSED_BACKOFF,
                            _ => DEFAULT_BACKOFF,
                        };
                        warn!(
                            image = %reference,
                            attempt,
                            "pull attempt failed ({}), retrying in {:?}",
                            last_error,
                            backoff
                        );
                        self.sleeper.sleep(backoff).await;
                    }
                }
            }
        }

        Err(PullError::Failed {
            reference,
            attempts: self.policy.max_attempts,
            last_error,
        })
    }
}
