//! Life-like outer-totalistic rules.
//!
//! A cell is alive (`[1]`) or dead (`[0]`). A dead cell with a neighbor count
//! in `birth` comes alive; a live cell with a count in `survival` stays alive.

use std::collections::HashSet;

use crate::coordinate::Coordinate;
use crate::rule::{Color, Rule};

/// Binary rule defined by birth and survival neighbor counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeLike {
    birth: Vec<usize>,
    survival: Vec<usize>,
    seed: HashSet<Coordinate>,
}

impl LifeLike {
    /// Neighbor counts that give birth and survival, and the cells alive
    /// before the first step.
    pub fn new<I, C>(birth: &[usize], survival: &[usize], alive: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        Self {
            birth: birth.to_vec(),
            survival: survival.to_vec(),
            seed: alive.into_iter().map(Into::into).collect(),
        }
    }

    /// Conway's Game of Life: B3/S23.
    pub fn game_of_life<I, C>(alive: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        Self::new(&[3], &[2, 3], alive)
    }

    /// B4/S4, meant for a 3D Moore neighborhood (26 neighbors).
    pub fn b4s4<I, C>(alive: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        Self::new(&[4], &[4], alive)
    }
}

impl Rule for LifeLike {
    type Value = u8;

    fn init_state(&self, coordinate: &Coordinate) -> Vec<u8> {
        vec![u8::from(self.seed.contains(coordinate))]
    }

    fn evolve_cell(&self, last_cell_state: &[u8], neighbors_last_states: &[&[u8]]) -> Vec<u8> {
        let neighbors = neighbors_last_states
            .iter()
            .filter(|state| state[0] != 0)
            .count();

        let alive = if last_cell_state[0] != 0 {
            self.survival.contains(&neighbors)
        } else {
            self.birth.contains(&neighbors)
        };
        vec![u8::from(alive)]
    }

    fn get_draw_color(&self, state: &[u8]) -> Color {
        if state[0] != 0 {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}
