use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Coalesces bursts of search input into one request
///
/// Every keystroke bumps a generation counter. A caller waits in [`settle`]
/// and only proceeds if no newer input arrived during the delay.
///
/// [`settle`]: SearchDebouncer::settle
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record new input and return its generation
    pub fn touch(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait out the delay; true if `generation` is still the latest input
    pub async fn settle(&self, generation: u64) -> bool {
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_input_fires() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(400));

        let first = debouncer.touch();
        let waiter = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.settle(first).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = debouncer.touch();

        assert!(!waiter.await.unwrap());
        assert!(debouncer.settle(second).await);
    }
}
