//! Condition polling against live UI state
//!
//! The browser offers no change notifications, so every wait is a poll
//! loop: evaluate a predicate against a fresh view of the page, sleep a
//! fixed interval, repeat until the predicate holds or the deadline
//! passes.
//!
//! ```text
//!            ┌──────────── tick ────────────┐
//!            v                              │
//!   Pending ──> evaluate(predicate(snapshot)) ──> falsy / transient error
//!      │                 │
//!      │                 ├── truthy ──────> Satisfied
//!      │                 └── fault ───────> Faulted
//!      └── deadline passed ───────────────> TimedOut
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Default budget for a single wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default delay between two evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timeout and cadence of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout with the default poll interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }

    /// Same cadence, different budget.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Explicit predicate result with a diagnostic for the pending case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    Ready(T),
    Pending(String),
}

/// Anything a predicate may return.
///
/// `resolve` yields the value a satisfied wait returns, or a description of
/// the falsy state that is kept for the timeout diagnostic.
pub trait PollOutcome {
    type Value;

    fn resolve(self) -> Result<Self::Value, String>;
}

impl PollOutcome for bool {
    type Value = bool;

    fn resolve(self) -> Result<bool, String> {
        if self {
            Ok(true)
        } else {
            Err("predicate returned false".to_string())
        }
    }
}

impl<T> PollOutcome for Option<T> {
    type Value = T;

    fn resolve(self) -> Result<T, String> {
        self.ok_or_else(|| "predicate found nothing".to_string())
    }
}

impl<T> PollOutcome for Vec<T> {
    type Value = Vec<T>;

    fn resolve(self) -> Result<Vec<T>, String> {
        if self.is_empty() {
            Err("predicate matched 0 items".to_string())
        } else {
            Ok(self)
        }
    }
}

impl<T> PollOutcome for Poll<T> {
    type Value = T;

    fn resolve(self) -> Result<T, String> {
        match self {
            Poll::Ready(value) => Ok(value),
            Poll::Pending(reason) => Err(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Satisfied,
    TimedOut,
    Faulted,
}

/// Bookkeeping for one bounded wait.
#[derive(Debug)]
pub struct PollSession {
    description: String,
    config: WaitConfig,
    started: Instant,
    deadline: Instant,
    polls: u32,
    last_state: String,
    state: SessionState,
}

impl PollSession {
    pub fn start(description: impl Into<String>, config: WaitConfig) -> Self {
        let started = Instant::now();
        Self {
            description: description.into(),
            config,
            started,
            deadline: started + config.timeout,
            polls: 0,
            last_state: "not evaluated".to_string(),
            state: SessionState::Pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn last_state(&self) -> &str {
        &self.last_state
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert_eq!(self.state, SessionState::Pending, "terminal poll state is final");
        debug!(
            condition = %self.description,
            polls = self.polls,
            elapsed_ms = self.elapsed().as_millis() as u64,
            "poll session {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Record one predicate evaluation.
    ///
    /// Returns the value once satisfied, `None` while still pending, and a
    /// `Faulted` error for anything that is not a transient lookup miss.
    pub fn observe<O: PollOutcome>(&mut self, result: E2eResult<O>) -> E2eResult<Option<O::Value>> {
        self.polls += 1;
        match result {
            Ok(outcome) => match outcome.resolve() {
                Ok(value) => {
                    self.transition(SessionState::Satisfied);
                    Ok(Some(value))
                }
                Err(state) => {
                    debug!(condition = %self.description, poll = self.polls, "pending: {}", state);
                    self.last_state = state;
                    Ok(None)
                }
            },
            Err(err) if err.is_transient() => {
                debug!(condition = %self.description, poll = self.polls, "transient: {}", err);
                self.last_state = err.to_string();
                Ok(None)
            }
            Err(err @ E2eError::Faulted { .. }) => {
                self.last_state = err.to_string();
                self.transition(SessionState::Faulted);
                Err(err)
            }
            Err(err) => {
                self.last_state = err.to_string();
                self.transition(SessionState::Faulted);
                Err(E2eError::Faulted {
                    condition: self.description.clone(),
                    source: Box::new(err),
                })
            }
        }
    }

    /// Delay before the next tick, clamped to the remaining budget.
    /// `None` once the deadline has passed.
    pub fn next_delay(&self) -> Option<Duration> {
        let now = Instant::now();
        if now >= self.deadline {
            return None;
        }
        let interval = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        Some(interval.min(self.deadline - now))
    }

    /// Close the session as timed out.
    pub fn time_out(mut self) -> E2eError {
        self.transition(SessionState::TimedOut);
        E2eError::Timeout {
            condition: self.description,
            timeout: self.config.timeout,
            polls: self.polls,
            last_state: self.last_state,
        }
    }
}

/// Poll `predicate` against `snapshot` until it yields a truthy outcome.
///
/// The snapshot handle is cloned into every evaluation so the predicate
/// always queries live state. The first evaluation runs before any sleep,
/// and the last one runs at the deadline.
pub async fn await_condition<S, F, Fut, O>(
    snapshot: &S,
    config: WaitConfig,
    description: &str,
    mut predicate: F,
) -> E2eResult<O::Value>
where
    S: Clone,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = E2eResult<O>>,
    O: PollOutcome,
{
    let mut session = PollSession::start(description, config);

    loop {
        let result = predicate(snapshot.clone()).await;
        if let Some(value) = session.observe(result)? {
            return Ok(value);
        }

        match session.next_delay() {
            Some(delay) => sleep(delay).await,
            None => return Err(session.time_out()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(true => true; "true is satisfied")]
    #[test_case(false => false; "false is pending")]
    fn bool_outcome(value: bool) -> bool {
        value.resolve().is_ok()
    }

    #[test]
    fn empty_vec_is_pending() {
        assert!(Vec::<u8>::new().resolve().is_err());
        assert_eq!(vec![3u8].resolve(), Ok(vec![3u8]));
    }

    #[test]
    fn pending_reason_is_kept() {
        let outcome: Poll<()> = Poll::Pending("location is /signup".into());
        assert_eq!(outcome.resolve(), Err("location is /signup".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn session_records_transient_errors_as_last_state() {
        let mut session = PollSession::start("email input", WaitConfig::default());
        let seen = session
            .observe::<bool>(Err(E2eError::NotFound("#email".into())))
            .unwrap();
        assert!(seen.is_none());
        assert_eq!(session.state(), SessionState::Pending);
        assert!(session.last_state().contains("#email"));
    }

    #[tokio::test(start_paused = true)]
    async fn session_faults_on_unexpected_error() {
        let mut session = PollSession::start("register button", WaitConfig::default());
        let err = session
            .observe::<bool>(Err(E2eError::WebDriver {
                code: "invalid session id".into(),
                message: "gone".into(),
            }))
            .unwrap_err();
        assert!(matches!(err, E2eError::Faulted { .. }));
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[tokio::test(start_paused = true)]
    async fn faulted_error_is_not_wrapped_twice() {
        let mut session = PollSession::start("register button", WaitConfig::default());
        let err = session
            .observe::<bool>(Err(E2eError::Faulted {
                condition: "webdriver session".into(),
                source: Box::new(E2eError::WebDriver {
                    code: "invalid session id".into(),
                    message: "gone".into(),
                }),
            }))
            .unwrap_err();
        match &err {
            E2eError::Faulted { condition, source } => {
                assert_eq!(condition, "webdriver session");
                assert!(matches!(**source, E2eError::WebDriver { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string().matches("Session faulted").count(), 1);
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[tokio::test(start_paused = true)]
    async fn next_delay_is_clamped_to_deadline() {
        let session = PollSession::start(
            "x",
            WaitConfig::new(Duration::from_millis(300), Duration::from_millis(500)),
        );
        assert_eq!(session.next_delay(), Some(Duration::from_millis(300)));
        tokio::time::advance(Duration::from_millis(300)).await;
        assert_eq!(session.next_delay(), None);
    }
}
