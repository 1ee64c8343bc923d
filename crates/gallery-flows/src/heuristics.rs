//! Selection heuristics for the host application's unlabeled markup.
//!
//! Everything in this module is configuration-like glue tied to the
//! application's current DOM shape: fixed tag names, accelerator labels,
//! and the predicates that pick controls out of the tree. The workflow
//! state machines consume these through narrow helpers so the glue can be
//! retuned without touching the machines themselves.

use dom_bridge::{By, DomPort, Scope};
use gallerypilot_core_types::NodeId;

use crate::errors::FlowError;
use crate::menu::MenuEntry;

/// Ancestor element the host discards and rebuilds wholesale on
/// navigation; its parent is the scope root watched for view changes.
pub const BOUNDARY_TAG: &str = "c-wiz";

/// Tags that trap keyboard input and get refocused after navigation.
pub const TEXT_INPUT_TAGS: [&str; 2] = ["input", "textarea"];

/// Per-item overflow menu trigger. A hidden duplicate may coexist; only
/// the visible one is clickable.
pub const OVERFLOW_TRIGGER_LABEL: &str = "More options";

/// Affordance that opens the location editor dialog.
pub const EDIT_LOCATION_LABEL: &str = "Edit location";

/// Platform accelerators used to locate menu entries positionally. The
/// "add to album" entry has no stable position of its own; it sits after
/// whichever of these anchors is present.
pub const DOWNLOAD_SHORTCUT: &str = "Shift+D";
pub const ROTATE_SHORTCUT: &str = "Shift+R";

/// Attribute carrying an entry's accelerator label.
pub const SHORTCUT_ATTR: &str = "aria-keyshortcuts";

/// A menu is only trusted once it shows this many recognizable entries;
/// the host renders menus incrementally.
pub const MIN_MENU_ENTRIES: usize = 4;

/// Delay between press retries while the menu refuses to close. The host
/// gives no loading indicator, so this is a polling retry.
pub const MENU_RETRY_DELAY_MS: u64 = 50;

/// Key that confirms a selection in the location list.
pub const CONFIRM_KEY: &str = "Enter";

/// Non-matching mutations tolerated by the dialog workflows before a wait
/// is abandoned. Their refocus wait can strand when a dialog is dismissed
/// without a change, so unlike navigation they default to a bound.
pub const DIALOG_CHANGE_BUDGET: u32 = 32;

pub async fn is_text_input(dom: &dyn DomPort, node: NodeId) -> Result<bool, FlowError> {
    let tag = dom.tag(node).await?;
    Ok(TEXT_INPUT_TAGS.contains(&tag.as_str()))
}

/// The currently focused text-input-like control, if any.
pub async fn focused_text_input(dom: &dyn DomPort) -> Result<Option<NodeId>, FlowError> {
    let Some(node) = dom.focused().await? else {
        return Ok(None);
    };
    if is_text_input(dom, node).await? {
        Ok(Some(node))
    } else {
        Ok(None)
    }
}

/// First visible text input under `scope`, excluding `other_than`.
pub async fn visible_text_input(
    dom: &dyn DomPort,
    scope: NodeId,
    other_than: Option<NodeId>,
) -> Result<Option<NodeId>, FlowError> {
    for tag in TEXT_INPUT_TAGS {
        for node in dom.query(Scope::Subtree(scope), By::tag(tag)).await? {
            if Some(node) == other_than {
                continue;
            }
            if dom.is_visible(node).await? {
                return Ok(Some(node));
            }
        }
    }
    Ok(None)
}

/// Whether `node` sits inside a menu-bar region. The thumbnail strip's
/// chevrons fulfil every other arrow-control predicate.
pub async fn in_menubar(dom: &dyn DomPort, node: NodeId) -> Result<bool, FlowError> {
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if dom.attribute(current, "role").await?.as_deref() == Some("menubar") {
            return Ok(true);
        }
        cursor = dom.parent(current).await?;
    }
    Ok(false)
}

/// First visible element carrying the given accessible label.
pub async fn visible_labeled(
    dom: &dyn DomPort,
    label: &str,
) -> Result<Option<NodeId>, FlowError> {
    for node in dom.query(Scope::Document, By::label(label)).await? {
        if dom.is_visible(node).await? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// First visible dialog region in the document.
pub async fn find_dialog(dom: &dyn DomPort) -> Result<Option<NodeId>, FlowError> {
    for node in dom.query(Scope::Document, By::role("dialog")).await? {
        if dom.is_visible(node).await? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// First visible list-style control under `scope`.
pub async fn find_listbox(dom: &dyn DomPort, scope: NodeId) -> Result<Option<NodeId>, FlowError> {
    for node in dom.query(Scope::Subtree(scope), By::role("listbox")).await? {
        if dom.is_visible(node).await? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// A visible open menu, but only once it carries enough recognizable
/// entries to be resolved positionally.
pub async fn open_menu(dom: &dyn DomPort) -> Result<Option<NodeId>, FlowError> {
    for node in dom.query(Scope::Document, By::role("menu")).await? {
        if !dom.is_visible(node).await? {
            continue;
        }
        let entries = dom.query(Scope::Subtree(node), By::role("menuitem")).await?;
        if entries.len() >= MIN_MENU_ENTRIES {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// Snapshot of a menu's entries, document order. Labels are the entries'
/// text; accelerators come from [`SHORTCUT_ATTR`].
pub async fn menu_entries(
    dom: &dyn DomPort,
    menu: NodeId,
) -> Result<Vec<(NodeId, MenuEntry)>, FlowError> {
    let mut entries = Vec::new();
    for node in dom.query(Scope::Subtree(menu), By::role("menuitem")).await? {
        let label = dom.text(node).await?;
        let shortcut = dom.attribute(node, SHORTCUT_ATTR).await?;
        entries.push((node, MenuEntry { label, shortcut }));
    }
    Ok(entries)
}

/// Highlighted option of a list, with its index.
pub async fn highlighted_option(
    dom: &dyn DomPort,
    list: NodeId,
) -> Result<Option<(usize, NodeId)>, FlowError> {
    let options = dom.query(Scope::Subtree(list), By::role("option")).await?;
    for (idx, option) in options.into_iter().enumerate() {
        if dom.attribute(option, "aria-selected").await?.as_deref() == Some("true") {
            return Ok(Some((idx, option)));
        }
    }
    Ok(None)
}

/// Whether a list option carries secondary descriptive text (any child
/// past the first with non-empty text), marking it as a search result
/// rather than the pre-existing value.
pub async fn has_secondary_text(dom: &dyn DomPort, option: NodeId) -> Result<bool, FlowError> {
    let children = dom.children(option).await?;
    for child in children.into_iter().skip(1) {
        if !dom.text(child).await?.trim().is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}
