//! N-dimensional coordinates and their dense row-major cell ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AutomatonError, Result};

/// Position of a cell, one component per grid axis.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate(Vec<usize>);

impl Coordinate {
    /// Wrap raw components, first axis first.
    pub fn new(components: Vec<usize>) -> Self {
        Self(components)
    }

    /// Components, one per axis.
    pub fn components(&self) -> &[usize] {
        &self.0
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Coordinate").field(&self.0).finish()
    }
}

impl From<Vec<usize>> for Coordinate {
    fn from(components: Vec<usize>) -> Self {
        Self(components)
    }
}

impl From<&[usize]> for Coordinate {
    fn from(components: &[usize]) -> Self {
        Self(components.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Coordinate {
    fn from(components: [usize; N]) -> Self {
        Self(components.to_vec())
    }
}

/// Extent of every axis of a grid. Fixed for the lifetime of an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Dimensions {
    extents: Vec<usize>,
    /// Row-major strides: the last axis varies fastest.
    strides: Vec<usize>,
    cell_count: usize,
}

impl Dimensions {
    /// Validate `extents`: at least one axis, none of size zero, and a cell
    /// count that fits in `usize`.
    pub fn new(extents: Vec<usize>) -> Result<Self> {
        if extents.is_empty() {
            return Err(AutomatonError::EmptyDimensions);
        }
        if let Some(axis) = extents.iter().position(|&extent| extent == 0) {
            return Err(AutomatonError::ZeroExtent { axis });
        }

        let mut strides = vec![1; extents.len()];
        let mut cell_count: usize = 1;
        for axis in (0..extents.len()).rev() {
            strides[axis] = cell_count;
            cell_count = cell_count
                .checked_mul(extents[axis])
                .ok_or(AutomatonError::GridTooLarge)?;
        }

        Ok(Self {
            extents,
            strides,
            cell_count,
        })
    }

    /// Size of every axis.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Number of cells in the grid (product of all extents).
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Check if a coordinate has the grid's rank and lies inside it.
    #[inline]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.rank() == self.rank()
            && coordinate
                .components()
                .iter()
                .zip(&self.extents)
                .all(|(&c, &extent)| c < extent)
    }

    /// Calculate the linear id of a coordinate, or `None` if it is outside the grid.
    #[inline]
    pub fn index_of(&self, coordinate: &Coordinate) -> Option<usize> {
        if !self.contains(coordinate) {
            return None;
        }
        Some(self.index_of_components(coordinate.components()))
    }

    /// Linear id of components already known to be in bounds.
    #[inline]
    pub(crate) fn index_of_components(&self, components: &[usize]) -> usize {
        components
            .iter()
            .zip(&self.strides)
            .map(|(&c, &stride)| c * stride)
            .sum()
    }

    /// Inverse of [`Dimensions::index_of`]. `index` must be below `cell_count()`.
    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        debug_assert!(index < self.cell_count);
        let mut rest = index;
        let components = self
            .strides
            .iter()
            .map(|&stride| {
                let c = rest / stride;
                rest %= stride;
                c
            })
            .collect();
        Coordinate(components)
    }

    /// All coordinates in ascending id order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.cell_count).map(move |index| self.coordinate_of(index))
    }
}

impl TryFrom<Vec<usize>> for Dimensions {
    type Error = AutomatonError;

    fn try_from(extents: Vec<usize>) -> Result<Self> {
        Self::new(extents)
    }
}

impl From<Dimensions> for Vec<usize> {
    fn from(dimensions: Dimensions) -> Self {
        dimensions.extents
    }
}
