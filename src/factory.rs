//! Entry points that build a ready-to-run automaton.
//!
//! Every configuration error is reported before a single cell is built.

use std::sync::Arc;

use tracing::info;

use crate::automaton::{
    create_grid, Automaton, EvolutionStrategy, ParallelEvolution, SequentialEvolution,
};
use crate::config::EngineConfig;
use crate::coordinate::Dimensions;
use crate::error::{AutomatonError, Result};
use crate::neighborhood::Neighborhood;
use crate::rule::Rule;

/// Builds automata from a grid shape, a neighborhood, a rule and a worker count.
pub struct CaFactory;

impl CaFactory {
    /// One worker evolves sequentially, more partition the grid.
    pub fn make_automaton<R, N>(
        dimension: &[usize],
        neighborhood: &N,
        rule: R,
        workers: usize,
    ) -> Result<Automaton<R>>
    where
        R: Rule,
        N: Neighborhood + ?Sized,
    {
        Self::make_with_config(
            dimension,
            neighborhood,
            rule,
            &EngineConfig::with_workers(workers),
        )
    }

    /// Sequential evolution in the calling thread.
    pub fn make_single_worker_automaton<R, N>(
        dimension: &[usize],
        neighborhood: &N,
        rule: R,
    ) -> Result<Automaton<R>>
    where
        R: Rule,
        N: Neighborhood + ?Sized,
    {
        Self::make_automaton(dimension, neighborhood, rule, 1)
    }

    /// Always uses the partitioned strategy, even for a single worker.
    pub fn make_multi_worker_automaton<R, N>(
        dimension: &[usize],
        neighborhood: &N,
        rule: R,
        workers: usize,
    ) -> Result<Automaton<R>>
    where
        R: Rule,
        N: Neighborhood + ?Sized,
    {
        let config = EngineConfig::with_workers(workers);
        Self::build(dimension, neighborhood, rule, &config, true)
    }

    /// Worker count, activity mode and first redraw taken from `config`.
    pub fn make_with_config<R, N>(
        dimension: &[usize],
        neighborhood: &N,
        rule: R,
        config: &EngineConfig,
    ) -> Result<Automaton<R>>
    where
        R: Rule,
        N: Neighborhood + ?Sized,
    {
        Self::build(dimension, neighborhood, rule, config, config.workers > 1)
    }

    fn build<R, N>(
        dimension: &[usize],
        neighborhood: &N,
        rule: R,
        config: &EngineConfig,
        partitioned: bool,
    ) -> Result<Automaton<R>>
    where
        R: Rule,
        N: Neighborhood + ?Sized,
    {
        let dimensions = Dimensions::new(dimension.to_vec())?;
        let workers = config.workers;
        if workers == 0 {
            return Err(AutomatonError::InvalidWorkerCount(workers));
        }
        if workers > dimensions.cell_count() {
            return Err(AutomatonError::TooManyWorkers {
                workers,
                cells: dimensions.cell_count(),
            });
        }

        info!(
            extents = ?dimensions.extents(),
            workers,
            edge_rule = ?neighborhood.edge_rule(),
            activity = ?config.activity,
            "building automaton"
        );

        let rule = Arc::new(rule);
        let grid = create_grid(&dimensions, neighborhood, &*rule, config.draw_first_state)?;

        let strategy: Box<dyn EvolutionStrategy<R::Value>> = if partitioned {
            Box::new(ParallelEvolution::new(
                Arc::clone(&rule),
                grid,
                workers,
                config.activity,
            )?)
        } else {
            Box::new(SequentialEvolution::new(
                Arc::clone(&rule),
                grid,
                config.activity,
            ))
        };

        Ok(Automaton::new(rule, dimensions, strategy))
    }
}
