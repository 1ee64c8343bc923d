use gallerypilot_core_types::{Direction, NodeId};

/// How a workflow settled. Only `Err` outcomes are treated as failures at
/// the serializer boundary; everything here is a normal termination.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Completed,
    /// A precondition was missing (no focused input, no matching control).
    /// The feature does not apply to the current screen.
    NotApplicable,
    /// A bounded wait ran out before the expected condition was observed;
    /// the workflow fell back to refocusing the original element.
    Abandoned,
}

/// Bound on poll loops keyed to the change wait. The unbounded default
/// matches the host contract: the view is expected to settle eventually,
/// and a parked wait consumes no CPU. Bounded policies cap the number of
/// non-matching mutations before a wait is abandoned, for the states that
/// can strand when a dialog is dismissed without a change.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WaitPolicy {
    pub max_changes: Option<u32>,
}

impl WaitPolicy {
    pub const UNBOUNDED: WaitPolicy = WaitPolicy { max_changes: None };

    pub fn bounded(max_changes: u32) -> Self {
        Self {
            max_changes: Some(max_changes),
        }
    }

    pub fn exhausted(&self, observed: u32) -> bool {
        self.max_changes.is_some_and(|max| observed >= max)
    }
}

/// A located candidate control. Valid only for the tree frame in which it
/// was computed; rebuilt fresh on every attempt, never cached.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlCandidate {
    pub handle: NodeId,
    pub direction: Direction,
}
