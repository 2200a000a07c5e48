use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Caller-supplied cancellation and deadline, threaded through every
/// command.
///
/// Commands check the context once at entry: an already-canceled token
/// fails with [`Error::Canceled`], an already-passed deadline with
/// [`Error::DeadlineExceeded`]. Commands never poll the context
/// mid-operation; once past the entry check they only contend for the
/// cache lock.
///
/// Contexts are cheap to clone; clones share the cancellation state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that never expires and is not canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Context {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A child context sharing this context's deadline and canceled
    /// whenever the parent is canceled.
    pub fn child(&self) -> Self {
        Context {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context (and any children).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The command-entry check. Cancellation wins over the deadline when
    /// both have fired.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Canceled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_live() {
        assert_eq!(Context::new().ensure_live(), Ok(()));
    }

    #[test]
    fn canceled_context_fails() {
        let ctx = Context::new();
        ctx.cancel();
        assert_eq!(ctx.ensure_live(), Err(Error::Canceled));
    }

    #[test]
    fn passed_deadline_fails() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.ensure_live(), Err(Error::DeadlineExceeded));
    }

    #[test]
    fn future_deadline_is_live() {
        let ctx = Context::with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.ensure_live(), Ok(()));
    }

    #[test]
    fn cancel_propagates_to_children() {
        let parent = Context::new();
        let child = parent.child();
        parent.cancel();
        assert_eq!(child.ensure_live(), Err(Error::Canceled));
        assert_eq!(parent.ensure_live(), Err(Error::Canceled));
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        ctx.cancel();
        assert_eq!(ctx.ensure_live(), Err(Error::Canceled));
    }
}
