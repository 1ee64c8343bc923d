use tokio::sync::mpsc;

use gallerypilot_core_types::NodeId;

/// Kind of user input observed inside a subscribed subtree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputKind {
    Key { key: String },
    Pointer,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputEvent {
    pub target: NodeId,
    pub kind: InputKind,
}

/// Runs its teardown exactly once when dropped, whatever the exit path.
pub struct SubscriptionGuard {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// Stream of input events scoped to one subtree. Dropping it releases the
/// underlying listener registration.
pub struct InputEvents {
    receiver: mpsc::UnboundedReceiver<InputEvent>,
    _guard: SubscriptionGuard,
}

impl InputEvents {
    pub fn new(receiver: mpsc::UnboundedReceiver<InputEvent>, guard: SubscriptionGuard) -> Self {
        Self {
            receiver,
            _guard: guard,
        }
    }

    /// Next event, or `None` once the source is gone.
    pub async fn next(&mut self) -> Option<InputEvent> {
        self.receiver.recv().await
    }
}
