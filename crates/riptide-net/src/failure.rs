//! Transport-worker failure detection.
//!
//! Runs as part of every tick, after the event drain, whether or not any
//! events arrived — a worker that hangs with an empty queue must still be
//! noticed. Termination is the one condition this layer cannot recover from
//! locally: the interface unregisters itself and reports upward exactly once;
//! the owning server decides whether to keep running without networking.

use riptide_transport::Transport;

/// Fatal conditions surfaced by [`crate::interface::NetworkInterface::process`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterfaceError {
    /// The transport worker terminated; networking through this interface is
    /// unusable.
    #[error("transport worker crashed")]
    TransportCrashed,
}

/// Per-tick liveness check with raise-once semantics.
#[derive(Debug)]
pub struct FailureMonitor {
    registered: bool,
}

impl FailureMonitor {
    /// Create a monitor for a freshly registered interface.
    pub fn new() -> Self {
        Self { registered: true }
    }

    /// Whether the interface is still registered with the network dispatcher.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Check transport liveness.
    ///
    /// On the first observed termination the interface is marked
    /// unregistered and the fatal error returned; every later call is a
    /// quiet no-op so the owner sees the failure exactly once.
    pub fn check<T: Transport>(&mut self, transport: &T) -> Result<(), InterfaceError> {
        if !self.registered {
            return Ok(());
        }
        if transport.is_terminated() {
            self.registered = false;
            tracing::error!("transport worker terminated; unregistering network interface");
            return Err(InterfaceError::TransportCrashed);
        }
        Ok(())
    }
}

impl Default for FailureMonitor {
    fn default() -> Self {
        Self::new()
    }
}
