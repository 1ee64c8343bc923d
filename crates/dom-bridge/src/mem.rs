//! Deterministic in-memory document.
//!
//! Stands in for the external application's live tree: tests (and demo
//! drivers) mutate it the way the host application would, and the port
//! side observes those mutations through the same one-shot subscriptions a
//! real bridge would use.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use gallerypilot_core_types::NodeId;

use crate::errors::DomError;
use crate::events::{InputEvent, InputEvents, InputKind, SubscriptionGuard};
use crate::ports::{By, ChangeWait, DomPort, Scope};

/// Synthetic activation dispatched by the port side, observable by the
/// driving test so it can play the external application's reaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActivationEvent {
    pub node: NodeId,
    pub kind: ActivationKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActivationKind {
    Click,
    Press,
}

struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            visible: true,
            parent: None,
            children: Vec::new(),
            attached: false,
        }
    }
}

struct Tree {
    nodes: HashMap<u64, Node>,
    next_id: u64,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = HashMap::new();
        let root = NodeId(1);
        let mut body = Node::new("body");
        body.attached = true;
        nodes.insert(root.0, body);
        Self {
            nodes,
            next_id: 2,
            root,
            focused: None,
        }
    }

    fn get(&self, node: NodeId) -> Result<&Node, DomError> {
        self.nodes
            .get(&node.0)
            .filter(|n| n.attached)
            .ok_or(DomError::Detached(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(&node.0)
            .filter(|n| n.attached)
            .ok_or(DomError::Detached(node))
    }

    /// `node` plus its ancestors, nearest first.
    fn chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.nodes.get(&id.0).and_then(|n| n.parent);
        }
        chain
    }

    fn effective_visible(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.nodes.get(&id.0) {
                Some(n) if n.attached && n.visible => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Preorder descendants of `scope`, excluding `scope` itself.
    fn descendants(&self, scope: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&scope.0) {
            for child in &node.children {
                out.push(*child);
                self.descendants(*child, out);
            }
        }
    }

    fn set_attached(&mut self, node: NodeId, attached: bool) {
        let children = match self.nodes.get_mut(&node.0) {
            Some(n) => {
                n.attached = attached;
                n.children.clone()
            }
            None => return,
        };
        for child in children {
            self.set_attached(child, attached);
        }
    }
}

struct Watcher {
    root: NodeId,
    notify: oneshot::Sender<()>,
}

struct Listener {
    id: u64,
    root: NodeId,
    sender: mpsc::UnboundedSender<InputEvent>,
}

struct Inner {
    tree: Mutex<Tree>,
    watchers: Mutex<Vec<Watcher>>,
    listeners: Mutex<Vec<Listener>>,
    activations: Mutex<Vec<mpsc::UnboundedSender<ActivationEvent>>>,
    next_listener_id: AtomicU64,
    watch_registrations: AtomicU64,
}

#[derive(Clone)]
pub struct MemDom {
    inner: Arc<Inner>,
}

impl MemDom {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tree: Mutex::new(Tree::new()),
                watchers: Mutex::new(Vec::new()),
                listeners: Mutex::new(Vec::new()),
                activations: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                watch_registrations: AtomicU64::new(0),
            }),
        }
    }

    pub fn root(&self) -> NodeId {
        self.inner.tree.lock().root
    }

    /// Create a detached element; attach with [`MemDom::append`].
    pub fn element(&self, tag: &str) -> NodeId {
        let mut tree = self.inner.tree.lock();
        let id = NodeId(tree.next_id);
        tree.next_id += 1;
        tree.nodes.insert(id.0, Node::new(tag));
        id
    }

    pub fn append(&self, parent: NodeId, child: NodeId) {
        {
            let mut tree = self.inner.tree.lock();
            let parent_attached = tree.nodes.get(&parent.0).is_some_and(|n| n.attached);
            if let Some(node) = tree.nodes.get_mut(&child.0) {
                node.parent = Some(parent);
            }
            if let Some(node) = tree.nodes.get_mut(&parent.0) {
                node.children.push(child);
            }
            if parent_attached {
                tree.set_attached(child, true);
            }
        }
        self.notify(parent);
    }

    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        let child = self.element(tag);
        self.append(parent, child);
        child
    }

    /// Detach a subtree, the way the host application discards a view.
    pub fn remove(&self, node: NodeId) {
        let parent = {
            let mut tree = self.inner.tree.lock();
            let parent = tree.nodes.get(&node.0).and_then(|n| n.parent);
            if let Some(parent) = parent {
                if let Some(p) = tree.nodes.get_mut(&parent.0) {
                    p.children.retain(|c| *c != node);
                }
            }
            if let Some(n) = tree.nodes.get_mut(&node.0) {
                n.parent = None;
            }
            tree.set_attached(node, false);
            if let Some(focused) = tree.focused {
                if !tree.nodes.get(&focused.0).is_some_and(|n| n.attached) {
                    tree.focused = None;
                }
            }
            parent
        };
        if let Some(parent) = parent {
            self.notify(parent);
        }
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        {
            let mut tree = self.inner.tree.lock();
            if let Some(n) = tree.nodes.get_mut(&node.0) {
                n.attrs.insert(name.to_string(), value.to_string());
            }
        }
        self.notify(node);
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        {
            let mut tree = self.inner.tree.lock();
            if let Some(n) = tree.nodes.get_mut(&node.0) {
                n.attrs.remove(name);
            }
        }
        self.notify(node);
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        {
            let mut tree = self.inner.tree.lock();
            if let Some(n) = tree.nodes.get_mut(&node.0) {
                n.text = text.to_string();
            }
        }
        self.notify(node);
    }

    pub fn set_visible(&self, node: NodeId, visible: bool) {
        {
            let mut tree = self.inner.tree.lock();
            if let Some(n) = tree.nodes.get_mut(&node.0) {
                n.visible = visible;
            }
        }
        self.notify(node);
    }

    /// Deliver a key press to listeners whose subtree contains `target`.
    pub fn emit_key(&self, target: NodeId, key: &str) {
        self.emit(
            target,
            InputKind::Key {
                key: key.to_string(),
            },
        );
    }

    /// Deliver a pointer press to listeners whose subtree contains `target`.
    pub fn emit_pointer(&self, target: NodeId) {
        self.emit(target, InputKind::Pointer);
    }

    /// Stream of synthetic activations, for driving the external
    /// application's side of a scenario.
    pub fn activations(&self) -> mpsc::UnboundedReceiver<ActivationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.activations.lock().push(tx);
        rx
    }

    /// Number of live mutation subscriptions rooted at `root`.
    pub fn watchers_on(&self, root: NodeId) -> usize {
        self.inner
            .watchers
            .lock()
            .iter()
            .filter(|w| w.root == root && !w.notify.is_closed())
            .count()
    }

    /// Test aid: park until some mutation subscription exists on `root`,
    /// so a driver can mutate without racing the subscriber's
    /// registration.
    pub async fn until_watched(&self, root: NodeId) {
        loop {
            if self.watchers_on(root) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Number of live input-event subscriptions rooted at `root`.
    pub fn listeners_on(&self, root: NodeId) -> usize {
        self.inner
            .listeners
            .lock()
            .iter()
            .filter(|l| l.root == root && !l.sender.is_closed())
            .count()
    }

    /// Test aid: park until an input subscription exists on `root`.
    pub async fn until_listening(&self, root: NodeId) {
        loop {
            if self.listeners_on(root) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Cumulative count of mutation subscriptions ever registered. A
    /// driver can prove a subscriber has come back around its loop by
    /// watching this grow past a recorded baseline.
    pub fn watch_registrations(&self) -> u64 {
        self.inner.watch_registrations.load(Ordering::Relaxed)
    }

    /// Test aid: park until more subscriptions have been registered than
    /// the recorded `baseline`.
    pub async fn until_registrations_exceed(&self, baseline: u64) {
        loop {
            if self.watch_registrations() > baseline {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn emit(&self, target: NodeId, kind: InputKind) {
        let chain = self.inner.tree.lock().chain(target);
        let event = InputEvent { target, kind };
        let mut listeners = self.inner.listeners.lock();
        listeners.retain(|l| !l.sender.is_closed());
        for listener in listeners.iter() {
            if chain.contains(&listener.root) {
                let _ = listener.sender.send(event.clone());
            }
        }
    }

    fn notify(&self, affected: NodeId) {
        let chain = self.inner.tree.lock().chain(affected);
        let mut watchers = self.inner.watchers.lock();
        let mut fired = 0_usize;
        let mut idx = 0;
        while idx < watchers.len() {
            if chain.contains(&watchers[idx].root) {
                let watcher = watchers.swap_remove(idx);
                let _ = watcher.notify.send(());
                fired += 1;
            } else {
                idx += 1;
            }
        }
        if fired > 0 {
            trace!(%affected, fired, "mutation fulfilled change waits");
        }
    }

    fn activate(&self, node: NodeId, kind: ActivationKind) -> Result<(), DomError> {
        self.inner.tree.lock().get(node)?;
        let event = ActivationEvent { node, kind };
        let mut sinks = self.inner.activations.lock();
        sinks.retain(|s| !s.is_closed());
        for sink in sinks.iter() {
            let _ = sink.send(event);
        }
        Ok(())
    }
}

impl Default for MemDom {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomPort for MemDom {
    async fn document(&self) -> NodeId {
        self.root()
    }

    async fn tag(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.inner.tree.lock().get(node)?.tag.clone())
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.inner.tree.lock().get(node)?.attrs.get(name).cloned())
    }

    async fn text(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.inner.tree.lock().get(node)?.text.clone())
    }

    async fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.inner.tree.lock().get(node)?.parent)
    }

    async fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.inner.tree.lock().get(node)?.children.clone())
    }

    async fn is_visible(&self, node: NodeId) -> Result<bool, DomError> {
        let tree = self.inner.tree.lock();
        tree.get(node)?;
        Ok(tree.effective_visible(node))
    }

    async fn exists(&self, node: NodeId) -> bool {
        self.inner
            .tree
            .lock()
            .nodes
            .get(&node.0)
            .is_some_and(|n| n.attached)
    }

    async fn query(&self, scope: Scope, by: By) -> Result<Vec<NodeId>, DomError> {
        let tree = self.inner.tree.lock();
        let root = match scope {
            Scope::Document => tree.root,
            Scope::Subtree(node) => {
                tree.get(node)?;
                node
            }
        };
        let mut all = Vec::new();
        tree.descendants(root, &mut all);
        let matches = all
            .into_iter()
            .filter(|id| {
                let Some(node) = tree.nodes.get(&id.0) else {
                    return false;
                };
                match &by {
                    By::Tag(tag) => node.tag == *tag,
                    By::Role(role) => node.attrs.get("role") == Some(role),
                    By::Label(label) => node.attrs.get("aria-label") == Some(label),
                }
            })
            .collect();
        Ok(matches)
    }

    async fn focused(&self) -> Result<Option<NodeId>, DomError> {
        let tree = self.inner.tree.lock();
        Ok(tree
            .focused
            .filter(|id| tree.nodes.get(&id.0).is_some_and(|n| n.attached)))
    }

    async fn click(&self, node: NodeId) -> Result<(), DomError> {
        self.activate(node, ActivationKind::Click)
    }

    async fn press_and_release(&self, node: NodeId) -> Result<(), DomError> {
        self.activate(node, ActivationKind::Press)
    }

    async fn focus(&self, node: NodeId) -> Result<(), DomError> {
        let mut tree = self.inner.tree.lock();
        tree.get(node)?;
        tree.focused = Some(node);
        Ok(())
    }

    async fn watch(&self, node: NodeId) -> Result<ChangeWait, DomError> {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.notify.is_closed());
        let (tx, rx) = oneshot::channel();
        watchers.push(Watcher { root: node, notify: tx });
        self.inner
            .watch_registrations
            .fetch_add(1, Ordering::Relaxed);
        Ok(ChangeWait::new(rx))
    }

    async fn subscribe_input(&self, node: NodeId) -> Result<InputEvents, DomError> {
        self.inner.tree.lock().get(node)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push(Listener {
            id,
            root: node,
            sender: tx,
        });
        let inner = Arc::clone(&self.inner);
        let guard = SubscriptionGuard::new(move || {
            inner.listeners.lock().retain(|l| l.id != id);
        });
        Ok(InputEvents::new(rx, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn change_wait_resolves_once_and_requires_resubscription() {
        let dom = MemDom::new();
        let root = dom.root();
        let item = dom.append_element(root, "div");

        let waiter = tokio::spawn({
            let dom = dom.clone();
            async move { dom.await_change(root).await }
        });
        dom.until_watched(root).await;

        // Overlapping mutations: the subscription fires for the first and
        // is gone before the second.
        dom.set_attribute(item, "aria-label", "one");
        dom.set_attribute(item, "aria-label", "two");
        waiter.await.unwrap().unwrap();
        assert_eq!(dom.watchers_on(root), 0);

        // A later mutation is only observable through a fresh subscription.
        let waiter = tokio::spawn({
            let dom = dom.clone();
            async move { dom.await_change(root).await }
        });
        dom.until_watched(root).await;
        dom.set_text(item, "three");
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn mutation_between_registration_and_wait_is_not_lost() {
        let dom = MemDom::new();
        let root = dom.root();

        // The wait is armed before the mutation and only awaited after it;
        // it must still resolve.
        let wait = dom.watch(root).await.unwrap();
        dom.append_element(root, "div");
        wait.await.unwrap();
    }

    #[tokio::test]
    async fn change_wait_scopes_to_the_subtree() {
        let dom = MemDom::new();
        let left = dom.append_element(dom.root(), "section");
        let right = dom.append_element(dom.root(), "section");

        let waiter = tokio::spawn({
            let dom = dom.clone();
            async move { dom.await_change(left).await }
        });
        dom.until_watched(left).await;

        // Mutating the sibling subtree must not fulfil the wait.
        dom.append_element(right, "div");
        assert_eq!(dom.watchers_on(left), 1);

        dom.append_element(left, "div");
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn deep_descendant_mutations_reach_ancestor_watchers() {
        let dom = MemDom::new();
        let outer = dom.append_element(dom.root(), "div");
        let middle = dom.append_element(outer, "div");
        let leaf = dom.append_element(middle, "span");

        let waiter = tokio::spawn({
            let dom = dom.clone();
            async move { dom.await_change(outer).await }
        });
        dom.until_watched(outer).await;
        dom.set_text(leaf, "deep");
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn input_subscription_tears_down_on_drop() {
        let dom = MemDom::new();
        let list = dom.append_element(dom.root(), "ul");
        let option = dom.append_element(list, "li");

        let mut events = dom.subscribe_input(list).await.unwrap();
        dom.emit_key(option, "Enter");
        assert_eq!(
            events.next().await.unwrap().kind,
            InputKind::Key {
                key: "Enter".to_string()
            }
        );

        drop(events);
        dom.emit_pointer(option);
        assert!(dom.inner.listeners.lock().is_empty());
    }

    #[tokio::test]
    async fn visibility_requires_every_ancestor_rendered() {
        let dom = MemDom::new();
        let wrapper = dom.append_element(dom.root(), "div");
        let button = dom.append_element(wrapper, "div");
        assert!(dom.is_visible(button).await.unwrap());

        dom.set_visible(wrapper, false);
        assert!(!dom.is_visible(button).await.unwrap());
    }

    #[tokio::test]
    async fn detached_handles_are_rejected() {
        let dom = MemDom::new();
        let gone = dom.append_element(dom.root(), "div");
        dom.remove(gone);

        assert!(!dom.exists(gone).await);
        assert_eq!(dom.tag(gone).await, Err(DomError::Detached(gone)));
        assert_eq!(dom.click(gone).await, Err(DomError::Detached(gone)));
    }

    #[tokio::test]
    async fn query_matches_in_document_order() {
        let dom = MemDom::new();
        let first = dom.append_element(dom.root(), "input");
        let wrap = dom.append_element(dom.root(), "div");
        let second = dom.append_element(wrap, "input");

        let found = dom
            .query(Scope::Document, By::tag("input"))
            .await
            .unwrap();
        assert_eq!(found, vec![first, second]);
    }
}
