use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use acc_util::AccError;
use getset::CopyGetters;
use retry::{delay, OperationResult};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::model::Submission;
use crate::Result;

#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
#[get_copy = "pub"]
pub struct PollConfig {
    #[serde(with = "humantime_serde")]
    interval: Duration,
    /// Includes the first fetch, so at least 1.
    #[serde(deserialize_with = "deserialize_max_attempts")]
    max_attempts: usize,
    #[serde(with = "humantime_serde")]
    timeout: Duration,
}

impl PollConfig {
    /// A `max_attempts` of 0 still makes one attempt.
    pub fn new(interval: Duration, max_attempts: usize, timeout: Duration) -> Self {
        Self {
            interval,
            max_attempts,
            timeout,
        }
    }
}

fn deserialize_max_attempts<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match usize::deserialize(deserializer)? {
        0 => Err(de::Error::custom("max_attempts must be at least 1")),
        n => Ok(n),
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            max_attempts: 240,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Shared flag to stop waiting for the judge from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Stop {
    Pending,
    Deadline,
    Cancelled,
    Failed(anyhow::Error),
}

/// Waits until the latest submission leaves the pending state.
#[derive(Debug)]
pub struct Poller<'a> {
    conf: &'a PollConfig,
    cancel: &'a CancelToken,
}

impl<'a> Poller<'a> {
    pub fn new(conf: &'a PollConfig, cancel: &'a CancelToken) -> Self {
        Self { conf, cancel }
    }

    /// Calls `fetch` with the 1-based attempt number until it returns a judged submission.
    ///
    /// Any error of `fetch` ends waiting immediately. Returns the submission and the number
    /// of attempts made.
    pub fn wait<F>(&self, mut fetch: F) -> Result<(Submission, usize)>
    where
        F: FnMut(usize) -> Result<Submission>,
    {
        let deadline = Instant::now() + self.conf.timeout;
        let interval_ms = self.conf.interval.as_millis() as u64;
        let delays = delay::Fixed::from_millis(interval_ms).take(self.conf.max_attempts.saturating_sub(1));
        let mut attempts = 0;
        let result = retry::retry(delays, || {
            if self.cancel.is_cancelled() {
                return OperationResult::Err(Stop::Cancelled);
            }
            if Instant::now() >= deadline {
                return OperationResult::Err(Stop::Deadline);
            }
            attempts += 1;
            match fetch(attempts) {
                Ok(submission) if submission.verdict().is_pending() => {
                    OperationResult::Retry(Stop::Pending)
                }
                Ok(submission) => OperationResult::Ok(submission),
                Err(err) => OperationResult::Err(Stop::Failed(err)),
            }
        });
        match result {
            Ok(submission) => Ok((submission, attempts)),
            Err(retry::Error::Operation { error, .. }) => Err(match error {
                Stop::Pending | Stop::Deadline => AccError::JudgeTimedOut { attempts }.into(),
                Stop::Cancelled => AccError::Cancelled.into(),
                Stop::Failed(err) => err,
            }),
            Err(retry::Error::Internal(msg)) => Err(anyhow::Error::msg(msg)),
        }
    }
}
