//! Temporary address blocking with expiry.
//!
//! The transport worker consults this list before accepting packets. Entries
//! are automatically stale once their expiry passes; lookups prune as they
//! go, so abandoned blocks don't accumulate.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Tracks temporarily banned network addresses.
#[derive(Debug, Default)]
pub struct AddressBlockList {
    entries: HashMap<IpAddr, Instant>,
}

impl AddressBlockList {
    /// Create an empty block list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block `addr` for `timeout` from now.
    ///
    /// Re-blocking an already-blocked address keeps whichever expiry is
    /// later, so a long administrator ban is never shortened by a transient
    /// throttle.
    pub fn block(&mut self, addr: IpAddr, timeout: Duration) {
        let expiry = Instant::now() + timeout;
        let entry = self.entries.entry(addr).or_insert(expiry);
        if expiry > *entry {
            *entry = expiry;
        }
        tracing::debug!("blocked {addr} for {timeout:?}");
    }

    /// Whether `addr` is currently blocked. Prunes a stale entry on the way.
    pub fn is_blocked(&mut self, addr: IpAddr) -> bool {
        match self.entries.get(&addr) {
            Some(expiry) if Instant::now() <= *expiry => true,
            Some(_) => {
                self.entries.remove(&addr);
                false
            }
            None => false,
        }
    }

    /// Lift a block before it expires.
    pub fn unblock(&mut self, addr: IpAddr) {
        self.entries.remove(&addr);
    }

    /// Drop every expired entry.
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, expiry| now <= *expiry);
    }

    /// Number of entries, counting not-yet-pruned stale ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
