//! Add the current item to an album through the per-item overflow menu.

use std::sync::Arc;
use std::time::Duration;

use dom_bridge::DomPort;
use tracing::{debug, instrument, warn};

use crate::errors::FlowError;
use crate::heuristics::{
    find_dialog, find_listbox, menu_entries, open_menu, visible_labeled, MENU_RETRY_DELAY_MS,
    OVERFLOW_TRIGGER_LABEL,
};
use crate::menu::locate_target_menu_item;
use crate::scope::{focused_scope, refocus_replacement};
use crate::types::{Outcome, WaitPolicy};

/// States: OpenMenu → PollMenuPresence → ResolveTargetItem →
/// ClickUntilMenuCloses → AwaitDialog → AwaitDialogClose → Refocusing.
#[instrument(skip_all)]
pub async fn add_to_album(dom: Arc<dyn DomPort>, policy: WaitPolicy) -> Result<Outcome, FlowError> {
    let Some(scope) = focused_scope(dom.as_ref()).await? else {
        debug!("no focused text input; nothing to do");
        return Ok(Outcome::NotApplicable);
    };
    let document = dom.document().await;

    // OpenMenu: the visible trigger; a hidden duplicate may coexist.
    let Some(trigger) = visible_labeled(dom.as_ref(), OVERFLOW_TRIGGER_LABEL).await? else {
        debug!("no visible overflow trigger");
        return Ok(Outcome::NotApplicable);
    };
    dom.click(trigger).await?;

    // PollMenuPresence: the host renders the menu incrementally. Each pass
    // arms the wait before checking so no mutation slips through the gap.
    let menu = loop {
        let changed = dom.watch(document).await?;
        if let Some(menu) = open_menu(dom.as_ref()).await? {
            break menu;
        }
        changed.await?;
    };

    // ResolveTargetItem
    let entries = menu_entries(dom.as_ref(), menu).await?;
    let target_idx = locate_target_menu_item(
        &entries.iter().map(|(_, e)| e.clone()).collect::<Vec<_>>(),
    );
    let Some((target, entry)) = entries.get(target_idx) else {
        debug!(target_idx, "resolved index outside the menu; nothing to do");
        return Ok(Outcome::NotApplicable);
    };
    debug!(label = %entry.label, target_idx, "pressing menu entry");
    let target = *target;

    // ClickUntilMenuCloses: no loading indicator, so press, give the host
    // a moment, and repeat while the menu persists.
    let mut attempts = 0_u32;
    loop {
        if !dom.exists(target).await {
            break;
        }
        dom.press_and_release(target).await?;
        tokio::time::sleep(Duration::from_millis(MENU_RETRY_DELAY_MS)).await;
        if open_menu(dom.as_ref()).await?.is_none() {
            break;
        }
        attempts += 1;
        if policy.exhausted(attempts) {
            warn!(attempts, "menu never closed; abandoning");
            return Ok(Outcome::Abandoned);
        }
    }

    // AwaitDialog
    let dialog = loop {
        let changed = dom.watch(document).await?;
        if let Some(dialog) = find_dialog(dom.as_ref()).await? {
            break dialog;
        }
        changed.await?;
    };

    // The album list inside the dialog arrives late; focus it for keyboard
    // accessibility once present. The dialog may also close before it ever
    // appears.
    loop {
        let changed = dom.watch(document).await?;
        if !dom.exists(dialog).await {
            break;
        }
        if let Some(list) = find_listbox(dom.as_ref(), dialog).await? {
            dom.focus(list).await?;
            break;
        }
        changed.await?;
    }

    // AwaitDialogClose
    loop {
        let changed = dom.watch(document).await?;
        if find_dialog(dom.as_ref()).await?.is_none() {
            break;
        }
        changed.await?;
    }

    // Refocusing. If the dialog was dismissed without a change, no
    // replacement will ever appear; a bounded policy falls back to the
    // original element instead of stranding the chain.
    refocus_replacement(dom.as_ref(), &scope, &policy).await
}
