use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::model::ClientIdentity;

/// One-shot readiness barrier over the gateway's identity.
///
/// The first [`signal_ready`](ReadinessGate::signal_ready) wins; every
/// [`wait_for_ready`](ReadinessGate::wait_for_ready), whether it started
/// before or after the signal, resolves to that same identity. The barrier
/// never regresses and is untouched by a cancelled waiter.
pub struct ReadinessGate {
    cell: watch::Sender<Option<ClientIdentity>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (cell, _) = watch::channel(None);
        Self { cell }
    }

    /// Resolves the barrier. Returns `false` (and changes nothing) when it
    /// was already resolved.
    pub fn signal_ready(&self, identity: ClientIdentity) -> bool {
        self.cell.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(identity);
            true
        })
    }

    /// Non-blocking read of the resolved identity, if any.
    pub fn peek(&self) -> Option<ClientIdentity> {
        self.cell.borrow().clone()
    }

    /// Suspends until the gateway has signalled readiness, or until `cancel`
    /// fires, whichever comes first. Cancellation aborts only this caller's
    /// wait; retrying with a fresh token is always valid.
    pub async fn wait_for_ready(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ClientIdentity, Error> {
        let mut rx = self.cell.subscribe();
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            resolved = rx.wait_for(|slot| slot.is_some()) => {
                // The sender half lives inside the gate, so the channel
                // cannot close while a waiter borrows `&self`.
                let slot = resolved.map_err(|_| Error::ConnectionClosed)?;
                slot.clone().ok_or(Error::ConnectionClosed)
            }
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
