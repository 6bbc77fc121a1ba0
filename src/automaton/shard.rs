//! A contiguous block of cells evolved by one worker.
//!
//! The shard owns its cells and keeps ghost buffers for every foreign cell
//! one of them reads. Neighbor links are rewritten to local ids once:
//! `0..cells.len()` are owned cells, the rest index into `ghosts`.
//!
//! Core invariant: a step first reads every input from the previous step's
//! slot, then writes. No cell ever sees a neighbor's in-progress value.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use crate::cell::Cell;
use crate::config::ActivityMode;
use crate::error::Result;
use crate::rule::Rule;
use crate::state::CellStateBuffer;

struct Ghost<V> {
    id: usize,
    state: CellStateBuffer<V>,
}

pub(crate) struct Shard<V> {
    owned: Range<usize>,
    cells: Vec<Cell<V>>,
    ghosts: Vec<Ghost<V>>,
    /// Local neighbor ids per owned cell.
    links: Vec<Vec<usize>>,
    /// Per local id, the owned cells that read it.
    dependents: Vec<Vec<usize>>,
}

impl<V: Clone + PartialEq> Shard<V> {
    /// A shard holding the entire grid.
    pub fn whole(cells: Vec<Cell<V>>, dependents: Vec<Vec<usize>>) -> Self {
        let links = cells.iter().map(|c| c.neighbor_ids().to_vec()).collect();
        Self {
            owned: 0..cells.len(),
            cells,
            ghosts: Vec::new(),
            links,
            dependents,
        }
    }

    /// The cells in `owned`, plus ghosts cloned from `grid` for every
    /// neighbor outside it.
    pub fn partition(grid: &[Cell<V>], owned: Range<usize>, dependents: &[Vec<usize>]) -> Self {
        let cells = grid[owned.clone()].to_vec();

        let foreign: BTreeSet<usize> = cells
            .iter()
            .flat_map(|c| c.neighbor_ids().iter().copied())
            .filter(|id| !owned.contains(id))
            .collect();
        let ghosts: Vec<Ghost<V>> = foreign
            .into_iter()
            .map(|id| Ghost {
                id,
                state: grid[id].state().clone(),
            })
            .collect();

        let ghost_local: HashMap<usize, usize> = ghosts
            .iter()
            .enumerate()
            .map(|(i, ghost)| (ghost.id, cells.len() + i))
            .collect();
        let to_local = |id: usize| {
            if owned.contains(&id) {
                id - owned.start
            } else {
                ghost_local[&id]
            }
        };

        let links = cells
            .iter()
            .map(|c| c.neighbor_ids().iter().map(|&id| to_local(id)).collect())
            .collect();

        let local_dependents = |id: usize| -> Vec<usize> {
            dependents[id]
                .iter()
                .filter(|&&d| owned.contains(&d))
                .map(|d| d - owned.start)
                .collect()
        };
        let dependents = owned
            .clone()
            .chain(ghosts.iter().map(|ghost| ghost.id))
            .map(local_dependents)
            .collect();

        Self {
            owned,
            cells,
            ghosts,
            links,
            dependents,
        }
    }

    pub fn owned(&self) -> Range<usize> {
        self.owned.clone()
    }

    pub fn cells(&self) -> &[Cell<V>] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell<V>] {
        &mut self.cells
    }

    /// Global ids of the ghost cells, ascending.
    pub fn ghost_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.ghosts.iter().map(|ghost| ghost.id)
    }

    #[inline]
    fn buffer(&self, local: usize) -> &CellStateBuffer<V> {
        match local.checked_sub(self.cells.len()) {
            None => self.cells[local].state(),
            Some(ghost) => &self.ghosts[ghost].state,
        }
    }

    fn activate(&mut self, local: usize, step: u64) {
        self.cells[local]
            .state_mut()
            .set_active_for_next_evolution_step(step);
        for i in 0..self.dependents[local].len() {
            let dependent = self.dependents[local][i];
            self.cells[dependent]
                .state_mut()
                .set_active_for_next_evolution_step(step);
        }
    }

    /// Compute `step` for every owned cell due for evaluation.
    /// Returns the number of cells evaluated.
    ///
    /// Every new state is arity-checked before the first write, so a failing
    /// step leaves the shard untouched.
    pub fn evolve<R>(&mut self, rule: &R, step: u64, activity: ActivityMode) -> Result<usize>
    where
        R: Rule<Value = V>,
    {
        let mut next = Vec::with_capacity(self.cells.len());
        {
            let mut neighbor_states: Vec<&[V]> = Vec::new();
            for (local, cell) in self.cells.iter().enumerate() {
                if !cell.is_evolvable() {
                    continue;
                }
                if activity == ActivityMode::Changed && !cell.state().is_active(step) {
                    continue;
                }

                neighbor_states.clear();
                neighbor_states.extend(
                    self.links[local]
                        .iter()
                        .map(|&n| self.buffer(n).get_state_of_previous_evolution_step(step)),
                );

                let last_state = cell.state().get_state_of_previous_evolution_step(step);
                let new_state = rule.evolve_cell(last_state, &neighbor_states);
                cell.state().check_arity(&new_state)?;
                next.push((local, new_state));
            }
        }

        let evaluated = next.len();
        let mut changed = Vec::new();
        for cell in &mut self.cells {
            cell.state_mut().clear_active(step);
        }
        for (local, new_state) in next {
            let state = self.cells[local].state_mut();
            if state.get_state_of_previous_evolution_step(step) != new_state.as_slice() {
                changed.push(local);
            }
            state.set_state_of_evolution_step(new_state, step)?;
        }

        match activity {
            ActivityMode::All => {
                for cell in self.cells.iter_mut().filter(|c| c.is_evolvable()) {
                    cell.state_mut().set_active_for_next_evolution_step(step);
                }
            }
            ActivityMode::Changed => {
                for local in changed {
                    self.activate(local, step);
                }
            }
        }

        Ok(evaluated)
    }

    /// States of `step` for the given owned cells, in order.
    pub fn boundary_states(&self, step: u64, locals: &[usize]) -> Vec<Vec<V>> {
        locals
            .iter()
            .map(|&local| self.cells[local].get_current_state(step).to_vec())
            .collect()
    }

    /// Store a neighbor shard's states of `step` into the given ghosts.
    pub fn apply_ghost_states(
        &mut self,
        step: u64,
        ghosts: &[usize],
        states: Vec<Vec<V>>,
        activity: ActivityMode,
    ) -> Result<()> {
        debug_assert_eq!(ghosts.len(), states.len());
        for (&ghost, new_state) in ghosts.iter().zip(states) {
            let buffer = &mut self.ghosts[ghost].state;
            let changed = buffer.get_state_of_previous_evolution_step(step) != new_state.as_slice();
            buffer.set_state_of_evolution_step(new_state, step)?;

            if activity == ActivityMode::Changed && changed {
                let local = self.cells.len() + ghost;
                for i in 0..self.dependents[local].len() {
                    let dependent = self.dependents[local][i];
                    self.cells[dependent]
                        .state_mut()
                        .set_active_for_next_evolution_step(step);
                }
            }
        }
        Ok(())
    }
}
