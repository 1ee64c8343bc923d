//! Sequential navigation: click the forward/back arrow, then chase the
//! rebuilt view until its input can be refocused.

use std::sync::Arc;

use dom_bridge::{By, DomPort, Scope};
use gallerypilot_core_types::Direction;
use tracing::{debug, instrument};

use glyph_probe::arrow_direction;

use crate::errors::FlowError;
use crate::heuristics::in_menubar;
use crate::scope::{focused_scope, refocus_replacement};
use crate::types::{ControlCandidate, Outcome, WaitPolicy};

/// Navigate one item in the requested direction.
///
/// States: Locating → Acting → AwaitingReplacement → Refocusing. Parse
/// failures from the glyph probe propagate; the serializer logs them and
/// the single attempt is abandoned.
#[instrument(skip(dom, policy), fields(direction = %direction))]
pub async fn navigate(
    dom: Arc<dyn DomPort>,
    direction: Direction,
    policy: WaitPolicy,
) -> Result<Outcome, FlowError> {
    let Some(scope) = focused_scope(dom.as_ref()).await? else {
        debug!("no focused text input; nothing to do");
        return Ok(Outcome::NotApplicable);
    };

    let Some(control) = locate_arrow_control(dom.as_ref(), direction).await? else {
        debug!("unable to find {direction} arrow control");
        return Ok(Outcome::NotApplicable);
    };

    dom.click(control.handle).await?;

    refocus_replacement(dom.as_ref(), &scope, &policy).await
}

/// Document-order scan for an arrow control pointing the requested way.
///
/// Candidates are icon-bearing interactive elements: a visible parent with
/// a button role, a click-dispatching `jsaction`, the icon as its only
/// child, and no menu-bar ancestor. The icon's path data is classified
/// geometrically; candidates without path data are skipped, but malformed
/// path data fails the whole attempt.
pub(crate) async fn locate_arrow_control(
    dom: &dyn DomPort,
    want: Direction,
) -> Result<Option<ControlCandidate>, FlowError> {
    for svg in dom.query(Scope::Document, By::tag("svg")).await? {
        let Some(handle) = dom.parent(svg).await? else {
            continue;
        };
        if !dom.is_visible(handle).await? {
            continue;
        }
        if dom.attribute(handle, "role").await?.as_deref() != Some("button") {
            continue;
        }
        let jsaction = dom.attribute(handle, "jsaction").await?.unwrap_or_default();
        if !jsaction.contains("click:") {
            continue;
        }
        if dom.children(handle).await?.len() != 1 {
            continue;
        }
        if in_menubar(dom, handle).await? {
            continue;
        }

        let mut data = None;
        for child in dom.children(svg).await? {
            if dom.tag(child).await? == "path" {
                data = dom.attribute(child, "d").await?;
                break;
            }
        }
        let Some(data) = data else {
            continue;
        };

        let direction = arrow_direction(&data)?;
        if direction == want {
            return Ok(Some(ControlCandidate { handle, direction }));
        }
    }
    Ok(None)
}
