use std::fmt::Display;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

type Tail = Shared<BoxFuture<'static, ()>>;

/// Owner of the chain's tail reference. Appending is the only mutation,
/// performed synchronously under the mutex, so the tail is never torn.
pub struct Serializer {
    tail: Mutex<Tail>,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            tail: Mutex::new(futures::future::ready(()).boxed().shared()),
        }
    }

    /// Append a workflow to run after everything enqueued before it has
    /// settled. A failing workflow is logged at this boundary and the
    /// chain advances; failures never propagate to the caller.
    pub fn enqueue<F, E>(&self, label: &'static str, workflow: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        let mut tail = self.tail.lock();
        let previous = tail.clone();
        let next: Tail = async move {
            previous.await;
            debug!(workflow = label, "workflow starting");
            match workflow.await {
                Ok(()) => debug!(workflow = label, "workflow finished"),
                Err(err) => warn!(workflow = label, error = %err, "workflow failed; advancing chain"),
            }
        }
        .boxed()
        .shared();
        *tail = next.clone();
        drop(tail);
        tokio::spawn(next);
    }

    /// Wait for everything currently enqueued to settle. Workflows
    /// enqueued after this call are not waited for.
    pub async fn drained(&self) {
        let tail = self.tail.lock().clone();
        tail.await;
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn runs_in_enqueue_order_across_suspensions() {
        let serializer = Serializer::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        // The first workflow suspends several times; the second must still
        // only start after the first settles.
        let first_log = log.clone();
        serializer.enqueue("first", async move {
            for step in 0..3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                first_log.lock().push(format!("first:{step}"));
            }
            Ok::<(), String>(())
        });
        let second_log = log.clone();
        serializer.enqueue("second", async move {
            second_log.lock().push("second".to_string());
            Ok::<(), String>(())
        });

        serializer.drained().await;
        assert_eq!(
            *log.lock(),
            vec!["first:0", "first:1", "first:2", "second"]
        );
    }

    #[tokio::test]
    async fn failure_does_not_break_the_chain() {
        let serializer = Serializer::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        serializer.enqueue("failing", async move {
            Err::<(), _>("synthetic failure".to_string())
        });
        let after = log.clone();
        serializer.enqueue("after", async move {
            after.lock().push("ran");
            Ok::<(), String>(())
        });

        serializer.drained().await;
        assert_eq!(*log.lock(), vec!["ran"]);
    }

    #[tokio::test]
    async fn enqueue_while_predecessor_is_parked() {
        let serializer = Serializer::new();
        let gate = Arc::new(Notify::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let parked_gate = gate.clone();
        let parked_log = log.clone();
        serializer.enqueue("parked", async move {
            parked_gate.notified().await;
            parked_log.lock().push("parked");
            Ok::<(), String>(())
        });

        // Enqueued while the first is parked on an external notification.
        let queued_log = log.clone();
        serializer.enqueue("queued", async move {
            queued_log.lock().push("queued");
            Ok::<(), String>(())
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(log.lock().is_empty());

        gate.notify_one();
        serializer.drained().await;
        assert_eq!(*log.lock(), vec!["parked", "queued"]);
    }
}
