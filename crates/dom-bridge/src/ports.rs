use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::sync::oneshot;

use gallerypilot_core_types::NodeId;

use crate::errors::DomError;
use crate::events::InputEvents;

/// Armed one-shot mutation wait. The registration is live from the moment
/// the handle exists, so a mutation landing between registration and the
/// await is observed, not lost.
pub struct ChangeWait {
    receiver: oneshot::Receiver<()>,
}

impl ChangeWait {
    pub fn new(receiver: oneshot::Receiver<()>) -> Self {
        Self { receiver }
    }
}

impl Future for ChangeWait {
    type Output = Result<(), DomError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|res| res.map_err(|_| DomError::Internal("mutation watch dropped".to_string())))
    }
}

/// Search scope for a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    Document,
    Subtree(NodeId),
}

/// Predicate a query matches against. The scope node itself is never
/// returned, only descendants, in document order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum By {
    Tag(String),
    Role(String),
    Label(String),
}

impl By {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::Role(role.into())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }
}

/// Read-and-act surface over the external document.
///
/// Handles are only valid for the tree frame in which they were observed;
/// operations on detached nodes fail with [`DomError::Detached`].
#[async_trait]
pub trait DomPort: Send + Sync {
    /// Root of the document.
    async fn document(&self) -> NodeId;

    async fn tag(&self, node: NodeId) -> Result<String, DomError>;

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    async fn text(&self, node: NodeId) -> Result<String, DomError>;

    async fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    async fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError>;

    /// Whether the node currently has a rendered box: attached and no
    /// hidden ancestor.
    async fn is_visible(&self, node: NodeId) -> Result<bool, DomError>;

    /// Whether the handle still refers to an attached node.
    async fn exists(&self, node: NodeId) -> bool;

    /// Descendants of the scope matching the predicate, in document order.
    async fn query(&self, scope: Scope, by: By) -> Result<Vec<NodeId>, DomError>;

    /// Element currently holding keyboard focus, if any.
    async fn focused(&self) -> Result<Option<NodeId>, DomError>;

    /// Synthetic activation click.
    async fn click(&self, node: NodeId) -> Result<(), DomError>;

    /// Synthetic pointer press followed by release.
    async fn press_and_release(&self, node: NodeId) -> Result<(), DomError>;

    async fn focus(&self, node: NodeId) -> Result<(), DomError>;

    /// Register a one-shot mutation watch on `node`'s subtree. The returned
    /// wait resolves on the first attribute, child-list, or deep-descendant
    /// mutation after registration, then deactivates; dropping it releases
    /// the registration. Poll loops register first and re-check their
    /// condition afterwards, so a mutation landing during the check is
    /// caught by the already-armed wait. No timeout is built in.
    async fn watch(&self, node: NodeId) -> Result<ChangeWait, DomError>;

    /// Register and immediately await one mutation.
    async fn await_change(&self, node: NodeId) -> Result<(), DomError> {
        self.watch(node).await?.await
    }

    /// Scoped subscription to key and pointer presses within `node`'s
    /// subtree. The registration is released when the returned stream is
    /// dropped, on every exit path.
    async fn subscribe_input(&self, node: NodeId) -> Result<InputEvents, DomError>;
}
