//! A latch for holding mock operations open mid-flight.

use std::sync::Arc;
use tokio::sync::Semaphore;

/// Holds a mock operation at a fixed point until the test releases it.
///
/// The operation signals that it reached the gate, then blocks. Each
/// [`release`](Gate::release) lets exactly one waiting operation through.
#[derive(Debug)]
pub struct Gate {
    entered: Semaphore,
    released: Semaphore,
}

impl Gate {
    /// Create a closed gate.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Semaphore::new(0),
            released: Semaphore::new(0),
        })
    }

    /// Wait until an operation has reached the gate.
    pub async fn wait_entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }

    /// Let one waiting (or the next arriving) operation through.
    pub fn release(&self) {
        self.released.add_permits(1);
    }

    /// Called by the mock: announce arrival and block until released.
    pub(crate) async fn pass(&self) {
        self.entered.add_permits(1);
        if let Ok(permit) = self.released.acquire().await {
            permit.forget();
        }
    }
}
