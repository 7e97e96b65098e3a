//! Cancellation handles passed through to the transport.
//!
//! Both types wrap a [`CancellationToken`]. A [`CancelController`] can trigger
//! cancellation; a [`CancelSignal`] can only observe it. The resolver never
//! acts on either, it only moves them onto the request descriptor.

use tokio_util::sync::CancellationToken;

/// Observe-only cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the owning controller cancels.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

/// Cancellation handle that can trigger cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelController {
    token: CancellationToken,
}

impl CancelController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an observe-only signal tied to this controller.
    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            token: self.token.clone(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
