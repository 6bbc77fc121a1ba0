//! A single grid cell: where it is, what it holds, and who it listens to.

use crate::coordinate::{Coordinate, Dimensions};
use crate::rule::{Color, Rule};
use crate::state::CellStateBuffer;

#[derive(Debug, Clone, PartialEq)]
pub struct Cell<V> {
    coordinate: Coordinate,
    state: CellStateBuffer<V>,
    /// Ids of the neighbor cells, in neighborhood order. Fixed at construction.
    neighbors: Vec<usize>,
    evolvable: bool,
}

impl<V> Cell<V> {
    pub(crate) fn new(
        coordinate: Coordinate,
        state: CellStateBuffer<V>,
        neighbors: Option<Vec<usize>>,
    ) -> Self {
        let evolvable = neighbors.is_some();
        Self {
            coordinate,
            state,
            neighbors: neighbors.unwrap_or_default(),
            evolvable,
        }
    }

    /// Position of this cell in the grid.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// State held for the parity of `step`.
    pub fn get_current_state(&self, step: u64) -> &[V] {
        self.state.get_state_of_evolution_step(step)
    }

    /// Color `rule` assigns to `state`, the same answer as
    /// [`crate::Automaton::get_state_draw_color`]. A cell does not hold its
    /// rule, so a renderer that walks cells passes [`crate::Automaton::rule`].
    pub fn get_state_draw_color<R>(&self, rule: &R, state: &[V]) -> Color
    where
        R: Rule<Value = V>,
    {
        rule.get_draw_color(state)
    }

    /// The double buffer behind this cell.
    pub fn state(&self) -> &CellStateBuffer<V> {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut CellStateBuffer<V> {
        &mut self.state
    }

    /// Neighbor cell ids, valid as indices into the owning grid.
    pub fn neighbor_ids(&self) -> &[usize] {
        &self.neighbors
    }

    /// Neighbor coordinates, in the same order as [`Cell::neighbor_ids`].
    pub fn neighbor_coordinates<'a>(
        &'a self,
        dimensions: &'a Dimensions,
    ) -> impl Iterator<Item = Coordinate> + 'a {
        self.neighbors.iter().map(|&id| dimensions.coordinate_of(id))
    }

    /// False for cells the edge rule excludes; they keep their initial state.
    pub fn is_evolvable(&self) -> bool {
        self.evolvable
    }

    /// True if the state changed since the last acknowledged redraw.
    pub fn is_set_for_redraw(&self) -> bool {
        self.state.is_set_for_redraw()
    }

    /// Acknowledge a redraw.
    pub fn was_redrawn(&mut self) {
        self.state.was_redrawn();
    }
}
