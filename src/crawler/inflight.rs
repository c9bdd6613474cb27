//! In-flight slot bookkeeping
//!
//! A slot holds at most one running task. Each arming bumps a generation
//! counter; whichever of the task's completion or the watchdog settles the
//! current generation first wins, and anything tagged with an older generation
//! is stale.

use tokio::task::AbortHandle;

/// One probe or page-load slot
#[derive(Debug, Default)]
pub struct InFlight {
    generation: u64,
    active: Option<AbortHandle>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the slot for a new task and returns its generation
    ///
    /// A task still held from the previous generation is aborted.
    pub fn arm(&mut self) -> u64 {
        self.release();
        self.generation += 1;
        self.generation
    }

    /// Stores the handle of the task running the current generation
    pub fn attach(&mut self, handle: AbortHandle) {
        self.active = Some(handle);
    }

    /// Claims the current generation
    ///
    /// Returns the task handle the first time the current generation is
    /// settled, and `None` for a stale generation or a repeated settle.
    pub fn settle(&mut self, generation: u64) -> Option<AbortHandle> {
        if generation != self.generation {
            return None;
        }
        self.active.take()
    }

    /// Aborts the held task, if any
    pub fn release(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.abort();
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[tokio::test]
    async fn test_settle_once_per_generation() {
        let mut slot = InFlight::new();
        let generation = slot.arm();
        let task = tokio::spawn(async {});
        slot.attach(task.abort_handle());

        assert!(slot.settle(generation).is_some());
        assert!(slot.settle(generation).is_none());
    }

    #[tokio::test]
    async fn test_stale_generation_is_ignored() {
        let mut slot = InFlight::new();
        let first = slot.arm();
        slot.attach(tokio::spawn(async {}).abort_handle());

        let second = slot.arm();
        slot.attach(tokio::spawn(async {}).abort_handle());

        assert_ne!(first, second);
        assert!(slot.settle(first).is_none());
        assert!(slot.settle(second).is_some());
    }

    #[tokio::test]
    async fn test_rearm_aborts_previous_task() {
        let mut slot = InFlight::new();
        slot.arm();
        let hung = tokio::spawn(pending::<()>());
        slot.attach(hung.abort_handle());

        slot.arm();

        assert!(hung.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_aborts_held_task() {
        let hung = tokio::spawn(pending::<()>());
        {
            let mut slot = InFlight::new();
            slot.arm();
            slot.attach(hung.abort_handle());
        }

        assert!(hung.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_release_without_task_is_noop() {
        let mut slot = InFlight::new();
        slot.release();
        slot.release();
        assert_eq!(slot.arm(), 1);
    }
}
