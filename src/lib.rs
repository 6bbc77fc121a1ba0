//! Cellular Automata - n-dimensional cellular automaton engine
//!
//! A grid of cells, each holding a small vector of values, advanced one
//! synchronous step at a time by a user-supplied [`Rule`]. Evolution runs
//! either in the calling thread or partitioned across a pool of workers that
//! exchange boundary cells through channels. Both produce identical states.
//!
//! Build an automaton with [`CaFactory`].

pub mod automaton;
pub mod cell;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod factory;
pub mod neighborhood;
pub mod rule;
pub mod rules;
pub mod state;

pub use automaton::{Automaton, Cells, EvolutionStrategy};
pub use cell::Cell;
pub use config::{ActivityMode, EngineConfig};
pub use coordinate::{Coordinate, Dimensions};
pub use error::{AutomatonError, Result};
pub use factory::CaFactory;
pub use neighborhood::{EdgeRule, MooreNeighborhood, Neighborhood, VonNeumannNeighborhood};
pub use rule::{Color, Rule};
pub use state::CellStateBuffer;
