//! The automaton facade and the strategies that evolve it.
//!
//! Step indexing: evolution step `n` reads every state of step `n - 1` and
//! writes the state of step `n`. Both buffer slots start as the initial state,
//! so step 0 reads the initial state.

mod grid;
mod parallel;
mod shard;
mod stepping;

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::cell::Cell;
use crate::coordinate::{Coordinate, Dimensions};
use crate::error::Result;
use crate::rule::{Color, Rule};

pub(crate) use grid::create_grid;
pub use parallel::ParallelEvolution;
pub use stepping::SequentialEvolution;

/// Advances a whole grid one synchronous step at a time.
pub trait EvolutionStrategy<V: Clone>: Send {
    /// Compute the states of `step` from those of `step - 1`.
    fn evolve(&mut self, step: u64) -> Result<()>;

    /// Every cell in id order.
    fn cells(&mut self) -> Result<Cow<'_, [Cell<V>]>>;

    /// Acknowledge a redraw of every cell.
    fn mark_redrawn(&mut self) -> Result<()>;

    /// Number of workers sharing the grid.
    fn worker_count(&self) -> usize;
}

/// Read-only view of every cell, addressable by coordinate.
pub struct Cells<'a, V: Clone> {
    dimensions: &'a Dimensions,
    cells: Cow<'a, [Cell<V>]>,
}

impl<'a, V: Clone> Cells<'a, V> {
    /// Cell at `coordinate`, or `None` outside the grid.
    pub fn get(&self, coordinate: &Coordinate) -> Option<&Cell<V>> {
        self.dimensions
            .index_of(coordinate)
            .and_then(|id| self.cells.get(id))
    }

    /// Cell by linear id.
    pub fn cell(&self, id: usize) -> Option<&Cell<V>> {
        self.cells.get(id)
    }

    /// Every cell with its coordinate, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &Cell<V>)> + '_ {
        self.cells.iter().map(|cell| (cell.coordinate(), cell))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn dimensions(&self) -> &Dimensions {
        self.dimensions
    }

    /// All cells, indexable by id.
    pub fn as_slice(&self) -> &[Cell<V>] {
        &self.cells
    }

    /// Detach the cells from the automaton.
    pub fn into_owned(self) -> Vec<Cell<V>> {
        self.cells.into_owned()
    }
}

/// A grid bound to one rule and one evolution strategy.
pub struct Automaton<R: Rule> {
    rule: Arc<R>,
    dimensions: Dimensions,
    evolution_step: u64,
    strategy: Box<dyn EvolutionStrategy<R::Value>>,
}

impl<R: Rule> Automaton<R> {
    pub(crate) fn new(
        rule: Arc<R>,
        dimensions: Dimensions,
        strategy: Box<dyn EvolutionStrategy<R::Value>>,
    ) -> Self {
        Self {
            rule,
            dimensions,
            evolution_step: 0,
            strategy,
        }
    }

    /// Advance `times` whole steps. On error the counter stays at the last
    /// completed step.
    pub fn evolve_x_times(&mut self, times: u64) -> Result<()> {
        debug!(
            from = self.evolution_step,
            times,
            workers = self.strategy.worker_count(),
            "evolving"
        );
        for _ in 0..times {
            self.strategy.evolve(self.evolution_step)?;
            self.evolution_step += 1;
        }
        Ok(())
    }

    /// Advance a single step.
    pub fn evolve(&mut self) -> Result<()> {
        self.evolve_x_times(1)
    }

    /// Number of completed steps.
    pub fn get_current_evolution_step(&self) -> u64 {
        self.evolution_step
    }

    /// Every cell, reassembled from all workers in multi-worker mode.
    pub fn get_cells(&mut self) -> Result<Cells<'_, R::Value>> {
        Ok(Cells {
            dimensions: &self.dimensions,
            cells: self.strategy.cells()?,
        })
    }

    /// Color the bound rule assigns to `state`.
    pub fn get_state_draw_color(&self, state: &[R::Value]) -> Color {
        self.rule.get_draw_color(state)
    }

    /// Acknowledge a redraw of every cell.
    pub fn mark_redrawn(&mut self) -> Result<()> {
        self.strategy.mark_redrawn()
    }

    /// 1 for sequential evolution.
    pub fn worker_count(&self) -> usize {
        self.strategy.worker_count()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// The rule every cell evolves by.
    pub fn rule(&self) -> &R {
        &self.rule
    }
}
