//! Deadline-bounded waits.
//!
//! A [`DeadlineTask`] spawns an operation and lets a single waiter race its
//! outcome against a timer. The deadline only resolves the waiter: the
//! operation keeps running to its own completion, and whatever it produces
//! after the waiter has been resolved is dropped.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::debug;

/// How long a waiter is willing to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
  Never,
  After(Duration),
}

impl Timeout {
  /// Millisecond value meaning "no timeout".
  pub const INFINITE_MILLIS: i64 = -1;

  /// `-1` means no timeout; any other negative value is rejected.
  pub fn from_millis(millis: i64) -> Result<Self, TimeoutError> {
    match millis {
      Self::INFINITE_MILLIS => Ok(Timeout::Never),
      m if m < 0 => Err(TimeoutError::Negative(m)),
      m => Ok(Timeout::After(Duration::from_millis(m as u64))),
    }
  }
}

impl From<Duration> for Timeout {
  fn from(duration: Duration) -> Self {
    Timeout::After(duration)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeoutError {
  #[error("timeout must be -1 (no timeout) or non-negative, got {0}ms")]
  Negative(i64),
}

/// Terminal outcomes other than success.
#[derive(Debug, Error)]
pub enum DeadlineError<E> {
  /// The deadline elapsed before the operation finished.
  #[error("operation timed out after {after:?}")]
  TimedOut { after: Duration },

  /// The operation returned an error.
  #[error("operation failed: {0}")]
  Failed(E),

  /// The operation was aborted before it finished.
  #[error("operation was cancelled")]
  Cancelled,

  /// The operation panicked.
  #[error("operation panicked: {0}")]
  Panicked(String),
}

impl<E> DeadlineError<E> {
  pub fn is_timeout(&self) -> bool {
    matches!(self, DeadlineError::TimedOut { .. })
  }
}

/// An operation running on the tokio runtime, awaited with a deadline.
pub struct DeadlineTask<T, E> {
  handle: JoinHandle<Result<T, E>>,
  timeout: Timeout,
}

impl<T, E> DeadlineTask<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  /// Spawns `operation` immediately. Must be called within a tokio runtime.
  pub fn spawn<F>(operation: F, timeout: Timeout) -> Self
  where
    F: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      handle: tokio::spawn(operation),
      timeout,
    }
  }

  pub fn timeout(&self) -> Timeout {
    self.timeout
  }

  pub fn is_finished(&self) -> bool {
    self.handle.is_finished()
  }

  /// Handle that cancels the underlying operation. The deadline never does.
  pub fn abort_handle(&self) -> AbortHandle {
    self.handle.abort_handle()
  }

  /// Waits for the outcome; an elapsed deadline is [`DeadlineError::TimedOut`].
  pub async fn wait(self) -> Result<T, DeadlineError<E>> {
    match self.race().await? {
      Raced::Finished(value) => Ok(value),
      Raced::Elapsed(after) => Err(DeadlineError::TimedOut { after }),
    }
  }

  /// Waits for the outcome; an elapsed deadline is `Ok(None)`.
  pub async fn wait_or_none(self) -> Result<Option<T>, DeadlineError<E>> {
    match self.race().await? {
      Raced::Finished(value) => Ok(Some(value)),
      Raced::Elapsed(_) => Ok(None),
    }
  }

  async fn race(self) -> Result<Raced<T>, DeadlineError<E>> {
    let mut handle = self.handle;
    let after = match self.timeout {
      Timeout::Never => return settle(handle.await).map(Raced::Finished),
      Timeout::After(after) => after,
    };

    match tokio::time::timeout(after, &mut handle).await {
      Ok(joined) => settle(joined).map(Raced::Finished),
      Err(_) => {
        // Dropping the JoinHandle detaches the task; it is not aborted.
        debug!(?after, "deadline elapsed, operation left running");
        Ok(Raced::Elapsed(after))
      }
    }
  }
}

enum Raced<T> {
  Finished(T),
  Elapsed(Duration),
}

/// Runs `operation` with a deadline; timeout is an error.
pub async fn with_deadline<F, T, E>(operation: F, timeout: Timeout) -> Result<T, DeadlineError<E>>
where
  F: Future<Output = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  DeadlineTask::spawn(operation, timeout).wait().await
}

/// Runs `operation` with a deadline; timeout is `Ok(None)`.
pub async fn with_soft_deadline<F, T, E>(operation: F, timeout: Timeout) -> Result<Option<T>, DeadlineError<E>>
where
  F: Future<Output = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  DeadlineTask::spawn(operation, timeout).wait_or_none().await
}

fn settle<T, E>(joined: Result<Result<T, E>, JoinError>) -> Result<T, DeadlineError<E>> {
  match joined {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(err)) => Err(DeadlineError::Failed(err)),
    Err(err) if err.is_cancelled() => Err(DeadlineError::Cancelled),
    Err(err) => Err(DeadlineError::Panicked(panic_message(err))),
  }
}

fn panic_message(err: JoinError) -> String {
  match err.try_into_panic() {
    Ok(payload) => describe_panic(payload.as_ref()),
    Err(err) => err.to_string(),
  }
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    return (*message).to_string();
  }
  if let Some(message) = payload.downcast_ref::<String>() {
    return message.clone();
  }
  "non-string panic payload".to_string()
}
