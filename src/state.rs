//! Parity-indexed double buffer holding one cell's state.
//!
//! Only the two most recent evolution steps are kept. Slot `step % 2` holds
//! the state of `step`, so asking for any step returns whatever was last
//! written for that parity.

use crate::error::{AutomatonError, Result};

#[inline]
fn slot(step: u64) -> usize {
    (step % 2) as usize
}

/// Two parity slots of one cell's state, with active and redraw flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStateBuffer<V> {
    slots: [Vec<V>; 2],
    active: [bool; 2],
    redraw: bool,
}

impl<V: Clone> CellStateBuffer<V> {
    /// Both slots start as `initial_state`, whose length fixes the arity.
    /// The buffer is active for step 0.
    pub fn new(initial_state: Vec<V>, draw_first_state: bool) -> Self {
        Self {
            slots: [initial_state.clone(), initial_state],
            active: [true, false],
            redraw: draw_first_state,
        }
    }
}

impl<V: PartialEq> CellStateBuffer<V> {
    /// Write the state of `step`. Marks the buffer for redraw if the slot's
    /// value changed and returns whether it did.
    pub fn set_state_of_evolution_step(&mut self, new_state: Vec<V>, step: u64) -> Result<bool> {
        self.check_arity(&new_state)?;

        let target = &mut self.slots[slot(step)];
        let changed = *target != new_state;
        if changed {
            *target = new_state;
            self.redraw = true;
        }
        Ok(changed)
    }
}

impl<V> CellStateBuffer<V> {
    /// Number of components every state in this buffer has.
    pub fn arity(&self) -> usize {
        self.slots[0].len()
    }

    /// State of `step`, or of the last step written with the same parity.
    pub fn get_state_of_evolution_step(&self, step: u64) -> &[V] {
        &self.slots[slot(step)]
    }

    /// State of the step before `step`; for step 0 that is the initial state.
    pub fn get_state_of_previous_evolution_step(&self, step: u64) -> &[V] {
        &self.slots[slot(step + 1)]
    }

    pub(crate) fn check_arity(&self, state: &[V]) -> Result<()> {
        if state.len() != self.arity() {
            return Err(AutomatonError::ArityMismatch {
                expected: self.arity(),
                actual: state.len(),
            });
        }
        Ok(())
    }

    /// Whether `step` must evaluate this cell.
    pub fn is_active(&self, step: u64) -> bool {
        self.active[slot(step)]
    }

    /// Hand activity over from `step` to `step + 1`.
    pub fn set_active_for_next_evolution_step(&mut self, step: u64) {
        self.active[slot(step)] = false;
        self.active[slot(step + 1)] = true;
    }

    pub(crate) fn clear_active(&mut self, step: u64) {
        self.active[slot(step)] = false;
    }

    /// Dirty flag, set by any write that changed a slot.
    pub fn is_set_for_redraw(&self) -> bool {
        self.redraw
    }

    /// Clear the dirty flag.
    pub fn was_redrawn(&mut self) {
        self.redraw = false;
    }
}
