//! The periodic countdown signal.
//!
//! A [`Heartbeat`] is a tokio task that sends one [`Tick`] per period into a
//! channel. It is tied to a timer generation of the session it drives and is
//! aborted when stopped or dropped, so at most one heartbeat per handle is
//! ever alive.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// One heartbeat second, tagged with the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub struct Heartbeat {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Start ticking every `period`. The first tick arrives after one period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(period: Duration, generation: u64, sender: mpsc::UnboundedSender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(generation, ?period, "heartbeat started");

        Self {
            generation,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the task. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "heartbeat stopped");
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_carry_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut heartbeat = Heartbeat::spawn(Duration::from_secs(1), 7, tx);

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(Tick { generation: 7 }));
        }
        assert!(heartbeat.is_running());

        heartbeat.stop();
        heartbeat.stop();

        assert_eq!(rx.recv().await, None);
        assert!(!heartbeat.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _heartbeat = Heartbeat::spawn(Duration::from_secs(1), 1, tx);

        time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv(), Ok(Tick { generation: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_retires_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let heartbeat = Heartbeat::spawn(Duration::from_secs(1), 3, tx);
        drop(heartbeat);

        assert_eq!(rx.recv().await, None);
    }
}
