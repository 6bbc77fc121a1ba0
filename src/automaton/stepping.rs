//! Single-worker evolution: the whole grid stepped in one thread.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::trace;

use super::grid::Grid;
use super::shard::Shard;
use super::EvolutionStrategy;
use crate::cell::Cell;
use crate::config::ActivityMode;
use crate::error::Result;
use crate::rule::Rule;

/// Strategy that evolves every cell in the calling thread.
pub struct SequentialEvolution<R: Rule> {
    rule: Arc<R>,
    shard: Shard<R::Value>,
    activity: ActivityMode,
}

impl<R: Rule> SequentialEvolution<R> {
    pub(crate) fn new(rule: Arc<R>, grid: Grid<R::Value>, activity: ActivityMode) -> Self {
        Self {
            rule,
            shard: Shard::whole(grid.cells, grid.dependents),
            activity,
        }
    }
}

impl<R: Rule> EvolutionStrategy<R::Value> for SequentialEvolution<R> {
    fn evolve(&mut self, step: u64) -> Result<()> {
        let evaluated = self.shard.evolve(&*self.rule, step, self.activity)?;
        trace!(step, evaluated, "sequential step");
        Ok(())
    }

    fn cells(&mut self) -> Result<Cow<'_, [Cell<R::Value>]>> {
        Ok(Cow::Borrowed(self.shard.cells()))
    }

    fn mark_redrawn(&mut self) -> Result<()> {
        for cell in self.shard.cells_mut() {
            cell.was_redrawn();
        }
        Ok(())
    }

    fn worker_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::create_grid;
    use crate::coordinate::Dimensions;
    use crate::neighborhood::{EdgeRule, MooreNeighborhood};
    use crate::rules::LifeLike;

    fn cross(width: usize) -> (Dimensions, LifeLike) {
        let dims = Dimensions::new(vec![width, width, width]).unwrap();
        let rule = LifeLike::b4s4([[4, 4, 4], [3, 4, 4], [5, 4, 4], [4, 3, 4], [4, 5, 4]]);
        (dims, rule)
    }

    fn alive(strategy: &mut SequentialEvolution<LifeLike>, step: u64) -> usize {
        strategy
            .cells()
            .unwrap()
            .iter()
            .filter(|c| c.get_current_state(step) == [1])
            .count()
    }

    #[test]
    fn test_step_b4s4_basic() {
        let (dims, rule) = cross(8);
        let moore = MooreNeighborhood::new(EdgeRule::DropMissing);
        let grid = create_grid(&dims, &moore, &rule, false).unwrap();
        let mut strategy = SequentialEvolution::new(Arc::new(rule), grid, ActivityMode::All);

        assert_eq!(alive(&mut strategy, 0), 5);
        strategy.evolve(0).unwrap();

        let cells = strategy.cells().unwrap();
        let state = |c: [usize; 3]| cells[dims.index_of(&c.into()).unwrap()].get_current_state(0)[0];

        // Center had 4 neighbors, should survive
        assert_eq!(state([4, 4, 4]), 1);

        // Each arm had 3 neighbors, should die
        assert_eq!(state([3, 4, 4]), 0);
        assert_eq!(state([5, 4, 4]), 0);
        assert_eq!(state([4, 3, 4]), 0);
        assert_eq!(state([4, 5, 4]), 0);
    }

    #[test]
    fn test_step_empty_grid_stays_empty() {
        let dims = Dimensions::new(vec![4, 4, 4]).unwrap();
        let rule = LifeLike::b4s4(Vec::<[usize; 3]>::new());
        let grid = create_grid(
            &dims,
            &MooreNeighborhood::new(EdgeRule::WrapAround),
            &rule,
            false,
        )
        .unwrap();
        let mut strategy = SequentialEvolution::new(Arc::new(rule), grid, ActivityMode::All);

        strategy.evolve(0).unwrap();
        strategy.evolve(1).unwrap();
        assert_eq!(alive(&mut strategy, 1), 0);
        assert_eq!(strategy.worker_count(), 1);
    }

    #[test]
    fn test_mark_redrawn_clears_every_cell() {
        let (dims, rule) = cross(6);
        let grid = create_grid(
            &dims,
            &MooreNeighborhood::new(EdgeRule::WrapAround),
            &rule,
            true,
        )
        .unwrap();
        let mut strategy = SequentialEvolution::new(Arc::new(rule), grid, ActivityMode::All);

        assert!(strategy.cells().unwrap().iter().all(|c| c.is_set_for_redraw()));
        strategy.mark_redrawn().unwrap();
        assert!(strategy.cells().unwrap().iter().all(|c| !c.is_set_for_redraw()));

        strategy.evolve(0).unwrap();
        let dirty = strategy
            .cells()
            .unwrap()
            .iter()
            .filter(|c| c.is_set_for_redraw())
            .count();
        // Four arms died, four cells born on each side of the plane
        assert_eq!(dirty, 12);
    }
}
