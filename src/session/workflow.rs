//! The two-phase approval state machine gating an editing session.

use crate::foundation::{
    core::Side,
    error::{InvitraError, InvitraResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowPhase {
    EditingFront,
    EditingBack,
    Finished,
}

/// Tracks which side is editable, which inputs are locked, and when the
/// rendered sides may be merged into the final composite.
///
/// All flag changes go through the transition methods; a rejected transition
/// mutates nothing. For single-sided templates the back phase is unreachable
/// and `back_approved` holds from the start.
#[derive(Clone, Debug)]
pub struct ApprovalWorkflow {
    phase: WorkflowPhase,
    front_approved: bool,
    back_approved: bool,
    single_sided: bool,
}

impl ApprovalWorkflow {
    pub fn new(single_sided: bool) -> Self {
        Self {
            phase: WorkflowPhase::EditingFront,
            front_approved: false,
            back_approved: single_sided,
            single_sided,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn front_approved(&self) -> bool {
        self.front_approved
    }

    pub fn back_approved(&self) -> bool {
        self.back_approved
    }

    pub fn is_single_sided(&self) -> bool {
        self.single_sided
    }

    pub fn current_side(&self) -> Side {
        match self.phase {
            WorkflowPhase::EditingBack => Side::Back,
            _ => Side::Front,
        }
    }

    /// Whether a side's inputs are disabled. An approved side stays locked
    /// until the full [`back_to_edit`](Self::back_to_edit) reset.
    pub fn is_side_locked(&self, side: Side) -> bool {
        if self.phase == WorkflowPhase::Finished {
            return true;
        }
        match side {
            Side::Front => self.front_approved,
            Side::Back => self.back_approved,
        }
    }

    pub fn can_finish(&self) -> bool {
        self.phase != WorkflowPhase::Finished
            && (self.single_sided || (self.front_approved && self.back_approved))
    }

    pub fn approve_front(&mut self) -> InvitraResult<()> {
        if self.phase != WorkflowPhase::EditingFront {
            return Err(InvitraError::workflow(
                "the front side can only be approved while editing it",
            ));
        }
        if self.front_approved {
            return Err(InvitraError::workflow("the front side is already approved"));
        }
        self.front_approved = true;
        if !self.single_sided {
            self.phase = WorkflowPhase::EditingBack;
        }
        tracing::debug!("front side approved");
        Ok(())
    }

    pub fn approve_back(&mut self) -> InvitraResult<()> {
        if self.single_sided {
            return Err(InvitraError::workflow(
                "a single-sided template has no back side to approve",
            ));
        }
        if self.phase != WorkflowPhase::EditingBack {
            return Err(InvitraError::workflow(
                "the back side can only be approved while editing it",
            ));
        }
        if self.back_approved {
            return Err(InvitraError::workflow("the back side is already approved"));
        }
        self.back_approved = true;
        tracing::debug!("back side approved");
        Ok(())
    }

    /// Guard for the final composite. Rejected synchronously with a
    /// user-facing message when a required side is not approved; no state
    /// changes on rejection.
    pub fn finish(&mut self) -> InvitraResult<()> {
        if self.phase == WorkflowPhase::Finished {
            return Err(InvitraError::workflow("the session is already finished"));
        }
        if !self.can_finish() {
            return Err(InvitraError::workflow(
                "both sides must be approved before finishing",
            ));
        }
        self.phase = WorkflowPhase::Finished;
        tracing::debug!("session finished");
        Ok(())
    }

    /// Full workflow reset: both approval flags clear (single-sided templates
    /// re-assert the back approval immediately) and every input unlocks.
    pub fn back_to_edit(&mut self) -> InvitraResult<()> {
        if self.phase != WorkflowPhase::Finished {
            return Err(InvitraError::workflow(
                "returning to editing is only possible from the finished state",
            ));
        }
        self.front_approved = false;
        self.back_approved = self.single_sided;
        self.phase = WorkflowPhase::EditingFront;
        Ok(())
    }
}
