use std::sync::Arc;

use tracing::debug;

use dom_bridge::DomPort;
use gallery_flows::heuristics::DIALOG_CHANGE_BUDGET;
use gallery_flows::{add_to_album, edit_location, navigate, WaitPolicy};
use gallerypilot_core_types::{Direction, FlowId, NodeId, PilotError};
use gallerypilot_serializer::Serializer;

use crate::keymap::{recognize, Command, KeyChord};

/// Wires key chords to enqueued workflows over one document bridge.
///
/// Navigation waits are unbounded: a navigation always rebuilds the view,
/// so its refocus wait is expected to be fulfilled. The dialog workflows
/// can strand when a dialog is dismissed without a change, so they run
/// under a bounded policy by default.
pub struct Pilot {
    dom: Arc<dyn DomPort>,
    serializer: Serializer,
    navigation_policy: WaitPolicy,
    dialog_policy: WaitPolicy,
}

impl Pilot {
    pub fn new(dom: Arc<dyn DomPort>) -> Self {
        Self {
            dom,
            serializer: Serializer::new(),
            navigation_policy: WaitPolicy::UNBOUNDED,
            dialog_policy: WaitPolicy::bounded(DIALOG_CHANGE_BUDGET),
        }
    }

    /// Override the wait policy for the navigation workflows.
    pub fn with_navigation_policy(mut self, policy: WaitPolicy) -> Self {
        self.navigation_policy = policy;
        self
    }

    /// Override the wait policy for the dialog workflows (add-to-album,
    /// edit-location).
    pub fn with_dialog_policy(mut self, policy: WaitPolicy) -> Self {
        self.dialog_policy = policy;
        self
    }

    /// Handle one keyboard event targeted at `target`. Returns `true` when
    /// the event was consumed and the host's default handling should be
    /// suppressed. Workflows run serialized, in enqueue order; their
    /// failures are logged at the serializer boundary and never reach the
    /// dispatcher.
    pub async fn handle_key(&self, target: NodeId, chord: &KeyChord) -> Result<bool, PilotError> {
        let Some(command) = recognize(chord) else {
            return Ok(false);
        };

        // Only act when the key lands in a control that traps it.
        let tag = self.dom.tag(target).await.map_err(PilotError::from)?;
        if tag != "input" && tag != "textarea" {
            return Ok(false);
        }

        let flow = FlowId::new();
        debug!(%flow, ?command, "enqueueing workflow");
        let dom = Arc::clone(&self.dom);
        let navigation = self.navigation_policy;
        let dialog = self.dialog_policy;
        match command {
            Command::NavigateLeft => self.serializer.enqueue("navigate-left", async move {
                navigate(dom, Direction::Left, navigation).await.map(|_| ())
            }),
            Command::NavigateRight => self.serializer.enqueue("navigate-right", async move {
                navigate(dom, Direction::Right, navigation).await.map(|_| ())
            }),
            Command::AddToAlbum => self.serializer.enqueue("add-to-album", async move {
                add_to_album(dom, dialog).await.map(|_| ())
            }),
            Command::EditLocation => self.serializer.enqueue("edit-location", async move {
                edit_location(dom, dialog).await.map(|_| ())
            }),
        }
        Ok(true)
    }

    /// Wait for every workflow enqueued so far to settle.
    pub async fn drained(&self) {
        self.serializer.drained().await;
    }
}
