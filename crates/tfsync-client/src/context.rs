//! Explicit per-operation execution context.

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Execution context passed to every client call.
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
}

impl OpContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing token, e.g. one cancelled by a signal handler.
    #[must_use]
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Returns a context that is cancelled with this one, but can also be
    /// cancelled on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with [`ClientError::Cancelled`] once the context is cancelled.
    pub fn check(&self) -> Result<(), ClientError> {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        Ok(())
    }

    /// Resolves when the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_follows_parent() {
        let parent = OpContext::new();
        let child = parent.child();
        assert!(child.check().is_ok());

        parent.cancel();
        assert!(child.is_cancelled());
        assert_eq!(child.check(), Err(ClientError::Cancelled));
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = OpContext::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }
}
