use crate::{ShutdownCoordinator, ShutdownGuard};

use std::time::{Duration, Instant};

/// Checked between records of a long run. Trips on shutdown or once the
/// deadline passes, and stays tripped.
pub struct CancellationSignal {
    guard: Option<ShutdownGuard>,
    deadline: Option<Instant>,
    tripped: bool,
}

impl CancellationSignal {
    /// Never cancels
    pub fn none() -> Self {
        Self {
            guard: None,
            deadline: None,
            tripped: false,
        }
    }

    pub fn from_shutdown(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            guard: Some(coordinator.subscribe_guard()),
            deadline: None,
            tripped: false,
        }
    }

    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(Instant::now() + budget);
        self
    }

    pub fn is_cancelled(&mut self) -> bool {
        if self.tripped {
            return true;
        }

        let shutdown = self
            .guard
            .as_mut()
            .is_some_and(|guard| guard.poll_shutdown());
        let expired = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);

        if shutdown || expired {
            log::warn!(
                "Run cancelled ({})",
                if shutdown { "shutdown" } else { "deadline reached" }
            );
            self.tripped = true;
        }

        self.tripped
    }
}
