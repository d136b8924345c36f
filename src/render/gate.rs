//! Per-surface render supersession.
//!
//! A surface must never have two logically-live renders: user edits can
//! request a re-render while a prior render is still between image loads.
//! Each render call takes a ticket from the surface's gate; taking a new
//! ticket invalidates every older one, and the renderer checks its ticket
//! before each load and draw phase, aborting with
//! [`InvitraError::Superseded`] when a newer render has started.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::foundation::error::{InvitraError, InvitraResult};

#[derive(Clone, Debug, Default)]
pub struct RenderGate {
    epoch: Arc<AtomicU64>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render, superseding any outstanding ticket.
    pub fn begin(&self) -> RenderTicket {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        RenderTicket {
            epoch_now: Arc::clone(&self.epoch),
            epoch,
        }
    }
}

#[derive(Debug)]
pub struct RenderTicket {
    epoch_now: Arc<AtomicU64>,
    epoch: u64,
}

impl RenderTicket {
    pub fn is_current(&self) -> bool {
        self.epoch_now.load(Ordering::Acquire) == self.epoch
    }

    pub fn ensure_current(&self) -> InvitraResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(InvitraError::Superseded)
        }
    }
}
