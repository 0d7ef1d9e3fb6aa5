//! One-shot hand-off primitives between a caller thread and the UI surface
//!
//! Both primitives are a `Mutex` + `Condvar` pair. Waiters park until the UI
//! surface settles the value, or until someone interrupts the wait. Settling is
//! first-wins: later signals are ignored and reported as `false`.

use super::response::DialogResponse;
use crate::errors::{DialogError, Result};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Lock ignoring poison; every critical section leaves the state consistent
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Interrupted,
}

/// Signal-once gate released when the widget becomes visible
#[derive(Debug)]
pub struct ShowGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl Default for ShowGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ShowGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            cond: Condvar::new(),
        }
    }

    /// Open the gate. Returns false if it was already settled.
    pub fn signal(&self) -> bool {
        self.settle(GateState::Open)
    }

    /// Release waiters with an interruption. Returns false if already settled.
    pub fn interrupt(&self) -> bool {
        self.settle(GateState::Interrupted)
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        *lock(&self.state) == GateState::Open
    }

    /// Park until the gate is opened or interrupted
    pub fn wait(&self) -> Result<()> {
        let guard = lock(&self.state);
        let state = self
            .cond
            .wait_while(guard, |s| *s == GateState::Closed)
            .unwrap_or_else(PoisonError::into_inner);
        match *state {
            GateState::Open => Ok(()),
            _ => Err(DialogError::InterruptedWait),
        }
    }

    fn settle(&self, to: GateState) -> bool {
        let mut state = lock(&self.state);
        if *state != GateState::Closed {
            return false;
        }
        *state = to;
        self.cond.notify_all();
        true
    }
}

#[derive(Debug, Clone)]
enum SlotState {
    Pending,
    Fulfilled(DialogResponse),
    Failed(String),
    Interrupted,
}

/// Single-assignment future holding the user's response
#[derive(Debug)]
pub struct ResponseSlot {
    state: Mutex<SlotState>,
    cond: Condvar,
}

impl Default for ResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            cond: Condvar::new(),
        }
    }

    /// Deliver the response. Returns false if the slot was already settled.
    pub fn fulfill(&self, response: DialogResponse) -> bool {
        self.settle(SlotState::Fulfilled(response))
    }

    /// Record a delivery failure
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.settle(SlotState::Failed(reason.into()))
    }

    pub fn interrupt(&self) -> bool {
        self.settle(SlotState::Interrupted)
    }

    pub fn is_pending(&self) -> bool {
        matches!(*lock(&self.state), SlotState::Pending)
    }

    /// Current value without blocking, if one was delivered
    #[cfg(test)]
    pub fn peek(&self) -> Option<DialogResponse> {
        match &*lock(&self.state) {
            SlotState::Fulfilled(response) => Some(response.clone()),
            _ => None,
        }
    }

    /// Park until the slot is settled. Repeat calls return the same outcome.
    pub fn wait(&self) -> Result<DialogResponse> {
        let guard = lock(&self.state);
        let state = self
            .cond
            .wait_while(guard, |s| matches!(s, SlotState::Pending))
            .unwrap_or_else(PoisonError::into_inner);
        match &*state {
            SlotState::Fulfilled(response) => Ok(response.clone()),
            SlotState::Failed(reason) => Err(DialogError::DialogInteraction(reason.clone())),
            SlotState::Interrupted | SlotState::Pending => Err(DialogError::InterruptedWait),
        }
    }

    fn settle(&self, to: SlotState) -> bool {
        let mut state = lock(&self.state);
        if !matches!(*state, SlotState::Pending) {
            return false;
        }
        *state = to;
        self.cond.notify_all();
        true
    }
}
