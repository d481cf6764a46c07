//! Layout generation: turning a [`LayoutSpec`] into an ordered list of coordinates.
//!
//! Two layouts are supported:
//! - [`GridSpec`]: a regular 2D or 3D lattice, enumerated column-fastest, then row, then layer.
//! - [`FreeSpec`]: an explicit list of positions, or one expression resolved per node.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::Result;

pub mod free;
pub mod grid;

pub use free::{FreeSpec, PositionSource};
pub use grid::{GridIndex, GridShape, GridSpec};

/// Trait for position layouts.
pub trait PositionLayout {
    /// Checks the geometry without drawing any random numbers.
    fn validate(&self) -> Result<()>;

    /// Number of nodes this layout places, reconciling an optional requested count.
    fn node_count(&self, requested: Option<usize>) -> Result<usize>;

    /// Produces `count` coordinates in node ordinal order.
    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<Coordinate>>;
}

/// Layout of a layer: a lattice or free positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutSpec {
    Grid(GridSpec),
    Free(FreeSpec),
}

impl LayoutSpec {
    pub fn as_grid(&self) -> Option<&GridSpec> {
        match self {
            LayoutSpec::Grid(grid) => Some(grid),
            LayoutSpec::Free(_) => None,
        }
    }

    /// Extent given explicitly in the specification, if any.
    pub fn explicit_extent(&self) -> Option<&[f64]> {
        match self {
            LayoutSpec::Grid(grid) => grid.extent.as_deref(),
            LayoutSpec::Free(free) => free.extent.as_deref(),
        }
    }

    /// Center given explicitly in the specification, if any.
    pub fn explicit_center(&self) -> Option<&[f64]> {
        match self {
            LayoutSpec::Grid(grid) => grid.center.as_deref(),
            LayoutSpec::Free(free) => free.center.as_deref(),
        }
    }
}

impl PositionLayout for LayoutSpec {
    fn validate(&self) -> Result<()> {
        match self {
            LayoutSpec::Grid(grid) => grid.validate(),
            LayoutSpec::Free(free) => free.validate(),
        }
    }

    fn node_count(&self, requested: Option<usize>) -> Result<usize> {
        match self {
            LayoutSpec::Grid(grid) => grid.node_count(requested),
            LayoutSpec::Free(free) => free.node_count(requested),
        }
    }

    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<Coordinate>> {
        match self {
            LayoutSpec::Grid(grid) => grid.generate(count, rng),
            LayoutSpec::Free(free) => free.generate(count, rng),
        }
    }
}

impl From<GridSpec> for LayoutSpec {
    fn from(value: GridSpec) -> Self {
        LayoutSpec::Grid(value)
    }
}

impl From<FreeSpec> for LayoutSpec {
    fn from(value: FreeSpec) -> Self {
        LayoutSpec::Free(value)
    }
}

/// Validates `spec`, reconciles the node count and generates the coordinates.
pub fn generate<R: RngCore>(
    spec: &LayoutSpec,
    requested: Option<usize>,
    rng: &mut R,
) -> Result<Vec<Coordinate>> {
    spec.validate()?;
    let count = spec.node_count(requested)?;
    spec.generate(count, rng)
}

/// Per-axis `(min, max)` over `coordinates`; `None` for an empty slice.
pub fn bounding_box(coordinates: &[Coordinate]) -> Option<(Vec<f64>, Vec<f64>)> {
    let first = coordinates.first()?.to_vec();
    let mut min = first.clone();
    let mut max = first;
    for c in &coordinates[1..] {
        for (axis, v) in c.to_vec().into_iter().enumerate() {
            if let (Some(lo), Some(hi)) = (min.get_mut(axis), max.get_mut(axis)) {
                *lo = lo.min(v);
                *hi = hi.max(v);
            }
        }
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::Error;

    #[test]
    fn bounding_box_spans_all_axes() {
        let coords = [
            Coordinate::xyz(1.0, 5.0, -1.0),
            Coordinate::xyz(-2.0, 0.0, 4.0),
            Coordinate::xyz(0.0, 3.0, 0.0),
        ];
        let (min, max) = bounding_box(&coords).unwrap();
        assert_eq!(min, vec![-2.0, 0.0, -1.0]);
        assert_eq!(max, vec![1.0, 5.0, 4.0]);
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn generate_dispatches_and_checks_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = LayoutSpec::from(GridSpec::new(2, 4));
        assert_eq!(generate(&grid, None, &mut rng).unwrap().len(), 8);
        assert!(matches!(
            generate(&grid, Some(5), &mut rng),
            Err(Error::InvalidLayoutSpec(_))
        ));
    }

    #[test]
    fn explicit_extent_and_center_are_reported() {
        let spec = LayoutSpec::from(
            GridSpec::new(3, 3)
                .with_extent([2.0, 2.0])
                .with_center([1.0, 0.0]),
        );
        assert_eq!(spec.explicit_extent(), Some(&[2.0, 2.0][..]));
        assert_eq!(spec.explicit_center(), Some(&[1.0, 0.0][..]));
        assert!(spec.as_grid().is_some());
    }
}
