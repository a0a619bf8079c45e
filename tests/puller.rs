// ABOUTME: Integration tests for image pulling with retry and classification.
// ABOUTME: Uses the fake runtime and recording sleeper; no real backoff.

mod support;

use stakkr::diagnostics::Diagnostics;
use stakkr::puller::{ImagePuller, PullError};
use stakkr::retry::RetryPolicy;
use stakkr::types::ImageRef;
use std::time::Duration;
use support::RecordingSleeper;
use support::fake_runtime::{FakeRuntime, PullOutcome};

fn image(reference: &str) -> ImageRef {
    ImageRef::parse(reference).unwrap()
}

fn puller(sleeper: &RecordingSleeper) -> ImagePuller<&RecordingSleeper> {
    ImagePuller::with_sleeper(RetryPolicy::default(), sleeper)
}

mod single_image {
    use super::*;

    #[tokio::test]
    async fn first_attempt_success_needs_no_backoff() {
        let runtime = FakeRuntime::new();
        let sleeper = RecordingSleeper::default();

        puller(&sleeper)
            .pull_with_retry(&runtime, &image("nginx"), "latest")
            .await
            .unwrap();

        assert_eq!(runtime.pull_calls(), vec!["nginx:latest"]);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn connection_refused_backs_off_five_seconds() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls(
            "nginx:latest",
            vec![
                PullOutcome::Fail("connection refused by daemon".to_string()),
                PullOutcome::Ok,
            ],
        );
        let sleeper = RecordingSleeper::default();

        puller(&sleeper)
            .pull_with_retry(&runtime, &image("nginx"), "latest")
            .await
            .unwrap();

        assert_eq!(runtime.pull_calls().len(), 2);
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn other_failures_back_off_three_seconds() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls(
            "nginx:latest",
            vec![
                PullOutcome::Fail("tls handshake timeout".to_string()),
                PullOutcome::Ok,
            ],
        );
        let sleeper = RecordingSleeper::default();

        puller(&sleeper)
            .pull_with_retry(&runtime, &image("nginx"), "latest")
            .await
            .unwrap();

        assert_eq!(sleeper.slept(), vec![Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn not_found_aborts_on_first_attempt() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls("ghost:latest", vec![PullOutcome::NotFound]);
        let sleeper = RecordingSleeper::default();

        let err = puller(&sleeper)
            .pull_with_retry(&runtime, &image("ghost"), "latest")
            .await
            .unwrap_err();

        assert!(matches!(err, PullError::NotFound { .. }));
        assert_eq!(runtime.pull_calls().len(), 1);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn not_found_in_error_text_also_aborts() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls(
            "ghost:latest",
            vec![PullOutcome::Fail("manifest unknown: not found".to_string())],
        );
        let sleeper = RecordingSleeper::default();

        let err = puller(&sleeper)
            .pull_with_retry(&runtime, &image("ghost"), "latest")
            .await
            .unwrap_err();

        assert!(matches!(err, PullError::NotFound { .. }));
        assert_eq!(runtime.pull_calls().len(), 1);
    }

    #[tokio::test]
    async fn exhausting_attempts_fails_with_last_error() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls(
            "nginx:latest",
            vec![
                PullOutcome::Fail("flaky 1".to_string()),
                PullOutcome::Fail("flaky 2".to_string()),
                PullOutcome::Fail("flaky 3".to_string()),
            ],
        );
        let sleeper = RecordingSleeper::default();

        let err = puller(&sleeper)
            .pull_with_retry(&runtime, &image("nginx"), "latest")
            .await
            .unwrap_err();

        match err {
            PullError::Failed {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("flaky 3"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(runtime.pull_calls().len(), 3);
        // Backoff happens between attempts, not after the last one
        assert_eq!(sleeper.slept().len(), 2);
    }
}

mod multi_image {
    use super::*;

    #[tokio::test]
    async fn partial_success_is_overall_success_with_warning() {
        let runtime = FakeRuntime::new();
        runtime.script_pulls(
            "b:v1",
            vec![
                PullOutcome::Fail("flaky".to_string()),
                PullOutcome::Fail("flaky".to_string()),
                PullOutcome::Fail("flaky".to_string()),
            ],
        );
        let sleeper = RecordingSleeper::default();
        let mut diag = Diagnostics::default();

        let images = vec![image("a"), image("b"), image("c")];
        puller(&sleeper)
            .pull_all(&runtime, &images, "v1", false, &mut diag)
            .await
            .unwrap();

        assert!(diag.has_warnings());
        assert!(diag.warnings()[0].message.contains("2 of 3"));
    }

    #[tokio::test]
    async fn zero_successes_is_a_hard_failure() {
        let runtime = FakeRuntime::new();
        for reference in ["a:v1", "b:v1"] {
            runtime.script_pulls(reference, vec![PullOutcome::NotFound]);
        }
        let sleeper = RecordingSleeper::default();
        let mut diag = Diagnostics::default();

        let images = vec![image("a"), image("b")];
        let err = puller(&sleeper)
            .pull_all(&runtime, &images, "v1", false, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(err, PullError::AllFailed { requested: 2, .. }));
    }

    #[tokio::test]
    async fn skip_pulls_nothing() {
        let runtime = FakeRuntime::new();
        let sleeper = RecordingSleeper::default();
        let mut diag = Diagnostics::default();

        let images = vec![image("a"), image("b")];
        puller(&sleeper)
            .pull_all(&runtime, &images, "v1", true, &mut diag)
            .await
            .unwrap();

        assert!(runtime.pull_calls().is_empty());
        assert!(!diag.has_warnings());
    }
}
