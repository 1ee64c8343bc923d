//! Edit the current item's location through the location dialog.
//!
//! Whether the dialog produced an edit decides the tail of the workflow:
//! an accepted edit replaces the view's input like a navigation does, a
//! cancelled dialog leaves the original in place. There is no event for
//! "an edit happened", so confirmation presses are observed inside the
//! location list and classified by the selection state at that instant.

use std::sync::Arc;

use dom_bridge::{DomPort, InputEvent, InputKind};
use gallerypilot_core_types::NodeId;
use tracing::{debug, instrument};

use crate::errors::FlowError;
use crate::heuristics::{
    find_dialog, find_listbox, has_secondary_text, highlighted_option, visible_labeled,
    visible_text_input, CONFIRM_KEY, EDIT_LOCATION_LABEL,
};
use crate::scope::{focused_scope, refocus_replacement};
use crate::types::{Outcome, WaitPolicy};

/// States: OpenEditor → AwaitDialog → ObserveEditVsCancel →
/// AwaitDialogClose → (ConditionalAwaitReplacement) → Refocusing.
#[instrument(skip_all)]
pub async fn edit_location(
    dom: Arc<dyn DomPort>,
    policy: WaitPolicy,
) -> Result<Outcome, FlowError> {
    let Some(scope) = focused_scope(dom.as_ref()).await? else {
        debug!("no focused text input; nothing to do");
        return Ok(Outcome::NotApplicable);
    };
    let document = dom.document().await;

    // OpenEditor
    let Some(editor) = visible_labeled(dom.as_ref(), EDIT_LOCATION_LABEL).await? else {
        debug!("no visible edit-location affordance");
        return Ok(Outcome::NotApplicable);
    };
    dom.click(editor).await?;

    // AwaitDialog; the wait is armed before each check so a dialog
    // appearing mid-check is caught on the next pass.
    let dialog = loop {
        let changed = dom.watch(document).await?;
        if let Some(dialog) = find_dialog(dom.as_ref()).await? {
            break dialog;
        }
        changed.await?;
    };

    // ObserveEditVsCancel + AwaitDialogClose
    let edited = observe_edit_until_closed(dom.as_ref(), document, dialog).await?;

    if edited {
        // ConditionalAwaitReplacement + Refocusing
        refocus_replacement(dom.as_ref(), &scope, &policy).await
    } else {
        // No edit: focus whatever input currently exists (the original if
        // the view was untouched); none is a silent termination.
        if let Some(input) = visible_text_input(dom.as_ref(), scope.scope_root, None).await? {
            dom.focus(input).await?;
        }
        Ok(Outcome::Completed)
    }
}

/// Watch the location list while the dialog is open, classifying each
/// confirmation press at the moment it happens. The input subscription is
/// a scoped resource: its registration is released when this function
/// exits, on success and on error alike.
async fn observe_edit_until_closed(
    dom: &dyn DomPort,
    document: NodeId,
    dialog: NodeId,
) -> Result<bool, FlowError> {
    // The list itself may render after the dialog; the dialog may also be
    // dismissed before it ever appears.
    let list = loop {
        let changed = dom.watch(document).await?;
        if !dom.exists(dialog).await {
            return Ok(false);
        }
        if let Some(list) = find_listbox(dom, dialog).await? {
            break list;
        }
        changed.await?;
    };

    let mut events = dom.subscribe_input(list).await?;
    let mut edited = false;
    loop {
        let changed = dom.watch(document).await?;
        if find_dialog(dom).await?.is_none() {
            break;
        }
        // Pending presses are classified before mutation wakeups are
        // honored: a confirmation must be evaluated against the selection
        // state it was made in, not after a teardown races past it.
        tokio::select! {
            biased;
            event = events.next() => match event {
                Some(event) if is_confirmation(&event) => {
                    if selection_indicates_edit(dom, list).await? {
                        debug!("confirmation accepted a changed location");
                        edited = true;
                    }
                }
                Some(_) => {}
                None => break,
            },
            res = changed => res?,
        }
    }
    Ok(edited)
}

fn is_confirmation(event: &InputEvent) -> bool {
    match &event.kind {
        InputKind::Pointer => true,
        InputKind::Key { key } => key == CONFIRM_KEY,
    }
}

/// Point-in-time check of the list selection: an edit is being accepted
/// if the highlighted option is not the first, or is the first but shows
/// secondary descriptive text (a search result, not the pre-existing
/// value).
async fn selection_indicates_edit(dom: &dyn DomPort, list: NodeId) -> Result<bool, FlowError> {
    let Some((idx, option)) = highlighted_option(dom, list).await? else {
        return Ok(false);
    };
    if idx != 0 {
        return Ok(true);
    }
    has_secondary_text(dom, option).await
}
