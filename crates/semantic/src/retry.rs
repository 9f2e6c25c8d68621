//! Retry with exponential backoff for provider calls.
//!
//! Only the HTTP collaborator retries. The retrieval orchestrator calls the
//! provider exactly once and reports whatever comes back.

use std::future::Future;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

/// Backoff policy for [`ApiEmbedder`](crate::ApiEmbedder) requests.
///
/// Delays are written in milliseconds in YAML/JSON:
///
/// ```yaml
/// retry_config:
///   max_retries: 2
///   base_delay: 250
///   max_delay: 2000
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first request. `0` means one attempt only.
    pub max_retries: u32,
    /// Wait before the first retry.
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    /// Ceiling for any single wait.
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    /// Growth factor between consecutive waits. Values below 1 are treated as 1.
    pub backoff_multiplier: f64,
    /// Spread each wait by up to a quarter either way.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(4),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before retry number `retry` (1 is the first retry; 0 never waits).
    pub fn delay_before(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let nanos = self.base_delay.as_nanos() as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let capped = if nanos.is_finite() && nanos < self.max_delay.as_nanos() as f64 {
            Duration::from_nanos(nanos as u64)
        } else {
            self.max_delay
        };

        if !self.jitter {
            return capped;
        }
        let spread = capped / 4;
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        // `seed / 1e9` is in [0, 1), so the result lands in [capped - spread, capped + spread).
        capped - spread + spread.mul_f64(2.0 * f64::from(seed) / 1e9)
    }
}

/// How a retried call settled.
#[derive(Debug, Clone)]
pub struct RetryOutcome<T, E> {
    /// Value of the successful attempt, or the error of the last one.
    pub result: Result<T, E>,
    /// Requests made, including the first.
    pub attempts: u32,
    pub elapsed: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Call `operation` with the zero-based attempt number until it succeeds,
/// returns an error `retryable` rejects, or `config.max_retries` retries are
/// used up.
///
/// ```
/// use semantic::retry::{execute_with_retry_async, RetryConfig};
/// use std::time::Duration;
///
/// let rt = tokio::runtime::Builder::new_current_thread()
///     .enable_time()
///     .build()
///     .unwrap();
/// let outcome = rt.block_on(execute_with_retry_async(
///     &RetryConfig::default().with_base_delay(Duration::from_millis(1)),
///     |attempt| async move { if attempt == 0 { Err("busy") } else { Ok(attempt) } },
///     |err| *err == "busy",
/// ));
///
/// assert_eq!(outcome.attempts, 2);
/// assert_eq!(outcome.into_result(), Ok(1));
/// ```
pub async fn execute_with_retry_async<T, E, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    retryable: R,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let started = Instant::now();
    let mut attempt = 0u32;

    let result = loop {
        let result = operation(attempt).await;
        let give_up = match &result {
            Ok(_) => true,
            Err(err) => attempt >= config.max_retries || !retryable(err),
        };
        if give_up {
            break result;
        }

        attempt += 1;
        let wait = config.delay_before(attempt);
        if !wait.is_zero() {
            sleep(wait).await;
        }
    };

    RetryOutcome {
        result,
        attempts: attempt + 1,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_jitter(base_ms: u64, max_ms: u64, multiplier: f64) -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
            backoff_multiplier: multiplier,
            jitter: false,
        }
    }

    fn fast() -> RetryConfig {
        no_jitter(1, 10, 2.0)
    }

    #[test]
    fn delays_grow_geometrically() {
        let cfg = no_jitter(100, 10_000, 2.0);
        let delays: Vec<u128> = (0..=4).map(|r| cfg.delay_before(r).as_millis()).collect();
        assert_eq!(delays, vec![0, 100, 200, 400, 800]);
    }

    #[test]
    fn delays_stop_at_ceiling() {
        let cfg = no_jitter(1_000, 1_500, 3.0);
        assert_eq!(cfg.delay_before(2), Duration::from_millis(1_500));
        assert_eq!(cfg.delay_before(u32::MAX), Duration::from_millis(1_500));
    }

    #[test]
    fn multiplier_below_one_keeps_base_delay() {
        let cfg = no_jitter(50, 1_000, 0.5);
        assert_eq!(cfg.delay_before(3), Duration::from_millis(50));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let cfg = RetryConfig {
            jitter: true,
            ..no_jitter(400, 10_000, 2.0)
        };
        for _ in 0..32 {
            let delay = cfg.delay_before(1);
            assert!(delay >= Duration::from_millis(300), "{delay:?}");
            assert!(delay < Duration::from_millis(500), "{delay:?}");
        }
    }

    #[test]
    fn config_reads_millis_and_fills_defaults() {
        let cfg: RetryConfig =
            serde_json::from_str(r#"{"max_retries": 1, "base_delay": 250}"#).unwrap();
        assert_eq!(cfg.max_retries, 1);
        assert_eq!(cfg.base_delay, Duration::from_millis(250));
        assert_eq!(cfg.max_delay, RetryConfig::default().max_delay);
        assert!(cfg.jitter);
    }

    #[tokio::test]
    async fn first_success_is_one_attempt() {
        let outcome =
            execute_with_retry_async(&fast(), |_| async { Ok::<_, String>("ok") }, |_| true).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let calls = AtomicU32::new(0);
        let outcome = execute_with_retry_async(
            &fast(),
            |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.into_result(), Ok(2));
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let outcome: RetryOutcome<(), String> = execute_with_retry_async(
            &fast().with_max_retries(2),
            |attempt| async move { Err(format!("fail {attempt}")) },
            |_| true,
        )
        .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.into_result(), Err("fail 2".to_string()));
    }

    #[tokio::test]
    async fn non_retryable_error_stops_at_once() {
        let outcome: RetryOutcome<(), &str> =
            execute_with_retry_async(&fast(), |_| async { Err("fatal") }, |_| false).await;
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let outcome: RetryOutcome<(), &str> = execute_with_retry_async(
            &fast().with_max_retries(0),
            |_| async { Err("busy") },
            |_| true,
        )
        .await;
        assert_eq!(outcome.attempts, 1);
    }
}
