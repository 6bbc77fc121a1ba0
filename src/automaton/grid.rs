//! Grid initialization: every cell's initial state and cached neighbor ids.

use crate::cell::Cell;
use crate::coordinate::Dimensions;
use crate::error::{AutomatonError, Result};
use crate::neighborhood::Neighborhood;
use crate::rule::Rule;
use crate::state::CellStateBuffer;

/// All cells of a freshly built grid, in id order.
pub(crate) struct Grid<V> {
    pub cells: Vec<Cell<V>>,
    /// For every cell id, the ids of the cells that list it as a neighbor.
    pub dependents: Vec<Vec<usize>>,
}

/// Build every cell of the grid. Neighbor lists are resolved here, once,
/// and every resolved id is checked against the grid.
pub(crate) fn create_grid<R, N>(
    dimensions: &Dimensions,
    neighborhood: &N,
    rule: &R,
    draw_first_state: bool,
) -> Result<Grid<R::Value>>
where
    R: Rule,
    N: Neighborhood + ?Sized,
{
    let offsets = neighborhood.offsets(dimensions.rank());
    let size = dimensions.cell_count();

    let mut cells = Vec::with_capacity(size);
    let mut dependents = vec![Vec::new(); size];

    for (id, coordinate) in dimensions.coordinates().enumerate() {
        let neighbors = neighborhood.neighbor_ids(&offsets, &coordinate, dimensions);
        if let Some(ids) = &neighbors {
            for &neighbor in ids {
                if neighbor >= size {
                    return Err(AutomatonError::NeighborOutOfRange { cell: id, neighbor });
                }
                // cells are visited in id order, so a repeat is always the last entry
                if dependents[neighbor].last() != Some(&id) {
                    dependents[neighbor].push(id);
                }
            }
        }

        let state = CellStateBuffer::new(rule.init_state(&coordinate), draw_first_state);
        cells.push(Cell::new(coordinate, state, neighbors));
    }

    Ok(Grid { cells, dependents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use crate::neighborhood::{EdgeRule, MooreNeighborhood, Offset, VonNeumannNeighborhood};
    use crate::rule::Color;

    struct SumOfCoordinates;

    impl Rule for SumOfCoordinates {
        type Value = usize;

        fn init_state(&self, coordinate: &Coordinate) -> Vec<usize> {
            vec![coordinate.components().iter().sum()]
        }

        fn evolve_cell(&self, last: &[usize], _neighbors: &[&[usize]]) -> Vec<usize> {
            last.to_vec()
        }

        fn get_draw_color(&self, _state: &[usize]) -> Color {
            Color::BLACK
        }
    }

    #[test]
    fn test_create_grid() {
        let dims = Dimensions::new(vec![8, 8, 8]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::WrapAround);
        let grid = create_grid(&dims, &moore, &SumOfCoordinates, false).unwrap();

        assert_eq!(grid.cells.len(), 512);
        assert!(grid.cells.iter().all(|c| c.neighbor_ids().len() == 26));
        assert!(grid.cells.iter().all(|c| c.is_evolvable()));

        let cell = &grid.cells[dims.index_of(&[1, 2, 3].into()).unwrap()];
        assert_eq!(cell.coordinate(), &Coordinate::from([1, 2, 3]));
        assert_eq!(cell.get_current_state(0), &[6]);
        assert!(!cell.is_set_for_redraw());
    }

    #[test]
    fn test_dependents_mirror_symmetric_neighborhood() {
        let dims = Dimensions::new(vec![4, 5]).unwrap();
        let von_neumann = VonNeumannNeighborhood::new(EdgeRule::DropMissing);
        let grid = create_grid(&dims, &von_neumann, &SumOfCoordinates, true).unwrap();

        for (id, cell) in grid.cells.iter().enumerate() {
            let mut neighbors = cell.neighbor_ids().to_vec();
            neighbors.sort_unstable();
            assert_eq!(grid.dependents[id], neighbors);
            assert!(cell.is_set_for_redraw());
        }
    }

    #[test]
    fn test_excluded_cells_have_no_neighbors() {
        let dims = Dimensions::new(vec![3, 3]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::ExcludeEdgeCells);
        let grid = create_grid(&dims, &moore, &SumOfCoordinates, false).unwrap();

        let evolvable: Vec<_> = grid
            .cells
            .iter()
            .filter(|c| c.is_evolvable())
            .map(|c| c.coordinate().clone())
            .collect();
        assert_eq!(evolvable, vec![Coordinate::from([1, 1])]);

        // The edge cells still feed the center
        let corner = dims.index_of(&[0, 0].into()).unwrap();
        assert_eq!(grid.dependents[corner], vec![4]);
        assert!(grid.cells[corner].neighbor_ids().is_empty());
    }

    #[test]
    fn test_repeated_neighbor_listed_once_as_dependent() {
        let dims = Dimensions::new(vec![2]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::WrapAround);
        let grid = create_grid(&dims, &moore, &SumOfCoordinates, false).unwrap();

        assert_eq!(grid.cells[0].neighbor_ids(), &[1, 1]);
        assert_eq!(grid.dependents[1], vec![0]);
        assert_eq!(grid.dependents[0], vec![1]);
    }

    /// Points every cell at the id just past the grid.
    struct PastTheEnd;

    impl Neighborhood for PastTheEnd {
        fn edge_rule(&self) -> EdgeRule {
            EdgeRule::WrapAround
        }

        fn offsets(&self, _rank: usize) -> Vec<Offset> {
            Vec::new()
        }

        fn neighbor_ids(
            &self,
            _offsets: &[Offset],
            _coordinate: &Coordinate,
            dimensions: &Dimensions,
        ) -> Option<Vec<usize>> {
            Some(vec![dimensions.cell_count()])
        }
    }

    #[test]
    fn test_neighbor_id_outside_grid_rejected() {
        let dims = Dimensions::new(vec![2, 2]).unwrap();
        assert!(matches!(
            create_grid(&dims, &PastTheEnd, &SumOfCoordinates, false),
            Err(AutomatonError::NeighborOutOfRange { cell: 0, neighbor: 4 })
        ));
    }
}
