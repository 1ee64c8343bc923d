//! Shared workflow preamble.

use dom_bridge::DomPort;
use gallerypilot_core_types::NodeId;
use tracing::debug;

use crate::errors::FlowError;
use crate::heuristics::{focused_text_input, visible_text_input, BOUNDARY_TAG};
use crate::types::{Outcome, WaitPolicy};

/// Context every workflow starts from: the focused control and the
/// structural boundary watched for view replacement.
///
/// The host recycles the boundary element itself but creates a fresh one
/// per navigation, so "did the view change" checks must watch the
/// boundary's *parent* — the original control may already be detached by
/// the time a check runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScopeCtx {
    pub original: NodeId,
    pub scope_root: NodeId,
}

/// Locate the focused text input and walk up to the scope root. `None`
/// means "nothing to do", not an error.
pub async fn focused_scope(dom: &dyn DomPort) -> Result<Option<ScopeCtx>, FlowError> {
    let Some(original) = focused_text_input(dom).await? else {
        return Ok(None);
    };

    let mut cursor = Some(original);
    while let Some(node) = cursor {
        if dom.tag(node).await? == BOUNDARY_TAG {
            let Some(scope_root) = dom.parent(node).await? else {
                return Ok(None);
            };
            return Ok(Some(ScopeCtx {
                original,
                scope_root,
            }));
        }
        cursor = dom.parent(node).await?;
    }
    Ok(None)
}

/// Refocusing tail shared by the workflows: wait for a visible text input
/// distinct from the original to appear under the scope root, then focus
/// it. Under a bounded policy, too many non-matching mutations abandon the
/// wait and fall back to the original element if it still exists.
pub async fn refocus_replacement(
    dom: &dyn DomPort,
    scope: &ScopeCtx,
    policy: &WaitPolicy,
) -> Result<Outcome, FlowError> {
    let mut observed = 0_u32;
    loop {
        // The wait is armed before the check so a replacement appearing
        // mid-check is caught on the next pass instead of lost.
        let changed = dom.watch(scope.scope_root).await?;
        if let Some(found) =
            visible_text_input(dom, scope.scope_root, Some(scope.original)).await?
        {
            dom.focus(found).await?;
            return Ok(Outcome::Completed);
        }
        if policy.exhausted(observed) {
            debug!(
                observed,
                "no replacement input appeared; falling back to the original"
            );
            if dom.exists(scope.original).await {
                dom.focus(scope.original).await?;
            }
            return Ok(Outcome::Abandoned);
        }
        changed.await?;
        observed += 1;
    }
}
