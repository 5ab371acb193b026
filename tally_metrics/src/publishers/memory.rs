use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tally_core::{PublishRequest, Publisher, Result, TallyError};

/// Keeps every accepted request in memory.
///
/// Can be armed to reject the next few batches, which makes it the stand-in
/// backend for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    requests: Mutex<Vec<PublishRequest>>,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail without storing anything.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Requests accepted so far, in arrival order.
    pub fn requests(&self) -> Vec<PublishRequest> {
        self.lock().clone()
    }

    pub fn last_request(&self) -> Option<PublishRequest> {
        self.lock().last().cloned()
    }

    /// Every call, including the rejected ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PublishRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish_batch(&self, request: &PublishRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let armed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if armed {
            return Err(TallyError::PublishFailed(format!(
                "memory publisher rejected batch for '{}'",
                request.namespace
            )));
        }

        self.lock().push(request.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_next_then_accept() {
        let publisher = MemoryPublisher::new();
        let request = PublishRequest::new("app", vec![]);

        publisher.fail_next(2);
        assert!(publisher.publish_batch(&request).await.is_err());
        assert!(publisher.publish_batch(&request).await.is_err());
        assert!(publisher.publish_batch(&request).await.is_ok());

        assert_eq!(publisher.call_count(), 3);
        assert_eq!(publisher.requests().len(), 1);
        assert_eq!(publisher.last_request().unwrap().namespace, "app");

        publisher.clear();
        assert!(publisher.requests().is_empty());
    }
}
