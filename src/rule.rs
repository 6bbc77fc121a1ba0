//! The per-simulation transition logic supplied by the caller.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// RGB color a renderer should use for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Transition rule bound to an automaton for its whole lifetime.
///
/// A state is a fixed-arity sequence of `Value`s. Every method must be a pure
/// function of its arguments: the multi-worker strategy evaluates cells on
/// different threads and relies on identical inputs giving identical outputs.
pub trait Rule: Send + Sync + 'static {
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// State of the cell at `coordinate` before the first evolution step.
    /// Its length fixes the arity of that cell's states.
    fn init_state(&self, coordinate: &Coordinate) -> Vec<Self::Value>;

    /// Next state of a cell from its own last state and its neighbors' last
    /// states, in neighborhood order.
    fn evolve_cell(
        &self,
        last_cell_state: &[Self::Value],
        neighbors_last_states: &[&[Self::Value]],
    ) -> Vec<Self::Value>;

    /// Only consumed by renderers.
    fn get_draw_color(&self, state: &[Self::Value]) -> Color;
}
