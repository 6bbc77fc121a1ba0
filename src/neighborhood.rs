//! Neighborhood shapes and the edge rules that resolve them at the grid border.
//!
//! Offsets are enumerated lexicographically over `{-r..=r}^d` with the first
//! axis changing slowest, and the zero vector skipped. A neighbor list is
//! therefore deterministic for a given shape, edge rule and grid.

use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, Dimensions};
use crate::error::{AutomatonError, Result};

/// How offsets that leave the grid are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRule {
    /// First and last cell of every axis are neighbors (torus).
    #[default]
    WrapAround,
    /// Out-of-bounds offsets are omitted, so edge cells have fewer neighbors.
    DropMissing,
    /// Cells whose neighborhood leaves the grid are never evolved.
    ExcludeEdgeCells,
}

/// Relative offset from a cell to one of its neighbors.
pub type Offset = Vec<isize>;

/// Shape of the cells a cell reads, bound to an edge rule.
///
/// The grid is wired through [`Neighborhood::neighbor_ids`] alone. A custom
/// shape that is not a fixed set of offsets overrides that method.
pub trait Neighborhood: Send + Sync {
    /// Edge rule applied to offsets that leave the grid.
    fn edge_rule(&self) -> EdgeRule;

    /// Offsets for a grid of `rank` axes, in canonical order.
    fn offsets(&self, rank: usize) -> Vec<Offset>;

    /// Neighbor ids of `coordinate`, or `None` if the cell is excluded from
    /// evolution. `offsets` is `self.offsets(dimensions.rank())`, computed
    /// once per grid by the caller.
    fn neighbor_ids(
        &self,
        offsets: &[Offset],
        coordinate: &Coordinate,
        dimensions: &Dimensions,
    ) -> Option<Vec<usize>> {
        resolve_ids(offsets, self.edge_rule(), coordinate.components(), dimensions)
    }

    /// Neighbor coordinates of `coordinate`, derived from
    /// [`Neighborhood::neighbor_ids`]. Override that method, not this one.
    fn neighbors_of(
        &self,
        coordinate: &Coordinate,
        dimensions: &Dimensions,
    ) -> Option<Vec<Coordinate>> {
        let offsets = self.offsets(dimensions.rank());
        self.neighbor_ids(&offsets, coordinate, dimensions).map(|ids| {
            ids.into_iter()
                .map(|id| dimensions.coordinate_of(id))
                .collect()
        })
    }
}

/// Resolve offsets around `components` into neighbor ids under `edge_rule`.
pub(crate) fn resolve_ids(
    offsets: &[Offset],
    edge_rule: EdgeRule,
    components: &[usize],
    dimensions: &Dimensions,
) -> Option<Vec<usize>> {
    let extents = dimensions.extents();
    let mut ids = Vec::with_capacity(offsets.len());
    let mut target = vec![0; extents.len()];

    'offsets: for offset in offsets {
        for (axis, (&c, &delta)) in components.iter().zip(offset).enumerate() {
            let extent = extents[axis] as isize;
            let moved = c as isize + delta;
            target[axis] = if (0..extent).contains(&moved) {
                moved as usize
            } else {
                match edge_rule {
                    EdgeRule::WrapAround => moved.rem_euclid(extent) as usize,
                    EdgeRule::DropMissing => continue 'offsets,
                    EdgeRule::ExcludeEdgeCells => return None,
                }
            };
        }
        ids.push(dimensions.index_of_components(&target));
    }

    Some(ids)
}

/// Every vector of `{-range..=range}^rank` in lexicographic order.
fn offset_cube(rank: usize, range: usize) -> Vec<Offset> {
    let r = range as isize;
    let mut offsets = Vec::new();
    let mut current = vec![-r; rank];

    loop {
        offsets.push(current.clone());

        // odometer: the last axis ticks first
        let mut axis = rank;
        loop {
            if axis == 0 {
                return offsets;
            }
            axis -= 1;
            if current[axis] < r {
                current[axis] += 1;
                break;
            }
            current[axis] = -r;
        }
    }
}

fn check_range(range: usize) -> Result<usize> {
    if range == 0 {
        return Err(AutomatonError::InvalidRange);
    }
    Ok(range)
}

/// All cells within Chebyshev distance `range` (3^d - 1 cells for range 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MooreNeighborhood {
    edge_rule: EdgeRule,
    range: usize,
}

impl MooreNeighborhood {
    /// Range 1: every cell touching this one, diagonals included.
    pub fn new(edge_rule: EdgeRule) -> Self {
        Self {
            edge_rule,
            range: 1,
        }
    }

    /// Fails with `InvalidRange` for a range of 0.
    pub fn with_range(edge_rule: EdgeRule, range: usize) -> Result<Self> {
        Ok(Self {
            edge_rule,
            range: check_range(range)?,
        })
    }

    /// Radius of the neighborhood.
    pub fn range(&self) -> usize {
        self.range
    }
}

impl Neighborhood for MooreNeighborhood {
    fn edge_rule(&self) -> EdgeRule {
        self.edge_rule
    }

    fn offsets(&self, rank: usize) -> Vec<Offset> {
        offset_cube(rank, self.range)
            .into_iter()
            .filter(|offset| offset.iter().any(|&delta| delta != 0))
            .collect()
    }
}

/// All cells within Manhattan distance `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VonNeumannNeighborhood {
    edge_rule: EdgeRule,
    range: usize,
}

impl VonNeumannNeighborhood {
    /// Range 1: the two cells along each axis.
    pub fn new(edge_rule: EdgeRule) -> Self {
        Self {
            edge_rule,
            range: 1,
        }
    }

    /// Fails with `InvalidRange` for a range of 0.
    pub fn with_range(edge_rule: EdgeRule, range: usize) -> Result<Self> {
        Ok(Self {
            edge_rule,
            range: check_range(range)?,
        })
    }

    /// Radius of the neighborhood.
    pub fn range(&self) -> usize {
        self.range
    }
}

impl Neighborhood for VonNeumannNeighborhood {
    fn edge_rule(&self) -> EdgeRule {
        self.edge_rule
    }

    fn offsets(&self, rank: usize) -> Vec<Offset> {
        offset_cube(rank, self.range)
            .into_iter()
            .filter(|offset| {
                let distance: usize = offset.iter().map(|delta| delta.unsigned_abs()).sum();
                distance != 0 && distance <= self.range
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(list: &[[usize; 2]]) -> Vec<Coordinate> {
        list.iter().map(|&c| Coordinate::from(c)).collect()
    }

    #[test]
    fn test_moore_offset_counts() {
        let moore = MooreNeighborhood::new(EdgeRule::WrapAround);
        assert_eq!(moore.offsets(1).len(), 2);
        assert_eq!(moore.offsets(2).len(), 8);
        assert_eq!(moore.offsets(3).len(), 26);

        let wide = MooreNeighborhood::with_range(EdgeRule::WrapAround, 2).unwrap();
        assert_eq!(wide.offsets(2).len(), 24);
    }

    #[test]
    fn test_moore_offsets_are_lexicographic() {
        let moore = MooreNeighborhood::new(EdgeRule::DropMissing);
        assert_eq!(
            moore.offsets(2),
            vec![
                vec![-1, -1],
                vec![-1, 0],
                vec![-1, 1],
                vec![0, -1],
                vec![0, 1],
                vec![1, -1],
                vec![1, 0],
                vec![1, 1],
            ]
        );
    }

    #[test]
    fn test_von_neumann_offsets() {
        let von_neumann = VonNeumannNeighborhood::new(EdgeRule::WrapAround);
        assert_eq!(
            von_neumann.offsets(2),
            vec![vec![-1, 0], vec![0, -1], vec![0, 1], vec![1, 0]]
        );
        assert_eq!(von_neumann.offsets(3).len(), 6);

        let wide = VonNeumannNeighborhood::with_range(EdgeRule::WrapAround, 2).unwrap();
        assert_eq!(wide.offsets(2).len(), 12);
    }

    #[test]
    fn test_zero_range_rejected() {
        assert_eq!(
            MooreNeighborhood::with_range(EdgeRule::WrapAround, 0),
            Err(AutomatonError::InvalidRange)
        );
        assert_eq!(
            VonNeumannNeighborhood::with_range(EdgeRule::DropMissing, 0),
            Err(AutomatonError::InvalidRange)
        );
    }

    #[test]
    fn test_center_of_3x3_has_every_other_cell() {
        let dims = Dimensions::new(vec![3, 3]).unwrap();
        for edge_rule in [
            EdgeRule::WrapAround,
            EdgeRule::DropMissing,
            EdgeRule::ExcludeEdgeCells,
        ] {
            let moore = MooreNeighborhood::new(edge_rule);
            let neighbors = moore.neighbors_of(&[1, 1].into(), &dims).unwrap();
            assert_eq!(
                neighbors,
                coords(&[[0, 0], [0, 1], [0, 2], [1, 0], [1, 2], [2, 0], [2, 1], [2, 2]])
            );
        }
    }

    #[test]
    fn test_wrap_around_corner() {
        let dims = Dimensions::new(vec![3, 3]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::WrapAround);
        let neighbors = moore.neighbors_of(&[0, 0].into(), &dims).unwrap();
        assert_eq!(
            neighbors,
            coords(&[[2, 2], [2, 0], [2, 1], [0, 2], [0, 1], [1, 2], [1, 0], [1, 1]])
        );
    }

    #[test]
    fn test_drop_missing_corner() {
        let dims = Dimensions::new(vec![3, 3]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::DropMissing);
        let neighbors = moore.neighbors_of(&[0, 0].into(), &dims).unwrap();
        assert_eq!(neighbors, coords(&[[0, 1], [1, 0], [1, 1]]));
    }

    #[test]
    fn test_exclude_edge_cells() {
        let dims = Dimensions::new(vec![4, 4]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::ExcludeEdgeCells);
        assert_eq!(moore.neighbors_of(&[0, 2].into(), &dims), None);
        assert_eq!(moore.neighbors_of(&[3, 3].into(), &dims), None);
        assert_eq!(moore.neighbors_of(&[1, 2].into(), &dims).map(|n| n.len()), Some(8));
    }

    #[test]
    fn test_wrap_on_tiny_axis_keeps_one_entry_per_offset() {
        // On an axis of extent 2 both -1 and +1 land on the same cell.
        let dims = Dimensions::new(vec![2]).unwrap();
        let moore = MooreNeighborhood::new(EdgeRule::WrapAround);
        let neighbors = moore.neighbors_of(&[0].into(), &dims).unwrap();
        assert_eq!(neighbors, vec![Coordinate::from([1]), Coordinate::from([1])]);
    }
}
