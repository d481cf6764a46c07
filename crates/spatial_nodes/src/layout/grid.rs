//! Regular grid layouts.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::layout::PositionLayout;

/// Lattice dimensions of a grid layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
    /// Depth of a 3D grid; `None` for a planar grid.
    pub layers: Option<usize>,
}

/// Lattice position of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub row: usize,
    pub column: usize,
    pub layer: usize,
}

impl GridShape {
    pub fn dimension(&self) -> usize {
        if self.layers.is_some() {
            3
        } else {
            2
        }
    }

    /// Number of lattice cells, saturating at `usize::MAX`.
    pub fn node_count(&self) -> usize {
        self.checked_node_count().unwrap_or(usize::MAX)
    }

    /// Number of lattice cells; `None` if the product overflows.
    pub fn checked_node_count(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.columns)?
            .checked_mul(self.layers.unwrap_or(1))
    }

    /// Lattice position of the node at `ordinal`; columns vary fastest, then rows, then layers.
    pub fn index_of(&self, ordinal: usize) -> Option<GridIndex> {
        if ordinal >= self.checked_node_count()? {
            return None;
        }
        let per_layer = self.rows * self.columns;
        Some(GridIndex {
            row: (ordinal % per_layer) / self.columns,
            column: ordinal % self.columns,
            layer: ordinal / per_layer,
        })
    }

    /// Inverse of [`GridShape::index_of`].
    pub fn ordinal_of(&self, index: GridIndex) -> Option<usize> {
        let layers = self.layers.unwrap_or(1);
        if index.row >= self.rows || index.column >= self.columns || index.layer >= layers {
            return None;
        }
        index
            .layer
            .checked_mul(self.rows)?
            .checked_add(index.row)?
            .checked_mul(self.columns)?
            .checked_add(index.column)
    }
}

/// Grid layout specification.
///
/// Nodes sit at the centres of `columns x rows (x layers)` equal cells tiling the
/// extent. Columns run along `+x`, rows from the top (`+y`) down, layers along `+z`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    pub rows: usize,
    pub columns: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layers: Option<usize>,
    /// Physical size per axis; defaults to the unit square or cube.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extent: Option<Vec<f64>>,
    /// Origin offset per axis; defaults to the origin.
    #[cfg_attr(feature = "serde", serde(default))]
    pub center: Option<Vec<f64>>,
}

impl GridSpec {
    /// Planar grid with `rows x columns` nodes.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            layers: None,
            extent: None,
            center: None,
        }
    }

    /// Makes the grid three-dimensional with `layers` layers.
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = Some(layers);
        self
    }

    pub fn with_extent(mut self, extent: impl Into<Vec<f64>>) -> Self {
        self.extent = Some(extent.into());
        self
    }

    pub fn with_center(mut self, center: impl Into<Vec<f64>>) -> Self {
        self.center = Some(center.into());
        self
    }

    pub fn shape(&self) -> GridShape {
        GridShape {
            rows: self.rows,
            columns: self.columns,
            layers: self.layers,
        }
    }

    pub fn dimension(&self) -> usize {
        self.shape().dimension()
    }

    /// Extent with the unit default applied.
    pub fn effective_extent(&self) -> Vec<f64> {
        self.extent
            .clone()
            .unwrap_or_else(|| vec![1.0; self.dimension()])
    }

    /// Center with the origin default applied.
    pub fn effective_center(&self) -> Vec<f64> {
        self.center
            .clone()
            .unwrap_or_else(|| vec![0.0; self.dimension()])
    }
}

impl PositionLayout for GridSpec {
    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 || self.layers == Some(0) {
            return Err(Error::InvalidLayoutSpec(format!(
                "grid rows, columns and layers must be positive (rows={}, columns={}, layers={:?})",
                self.rows, self.columns, self.layers
            )));
        }
        if self.shape().checked_node_count().is_none() {
            return Err(Error::InvalidLayoutSpec("grid node count overflows".into()));
        }
        let dimension = self.dimension();
        if let Some(extent) = &self.extent {
            if extent.len() != dimension {
                return Err(Error::InvalidLayoutSpec(format!(
                    "extent has {} values but the grid is {dimension}D",
                    extent.len()
                )));
            }
            if extent.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                return Err(Error::InvalidLayoutSpec(format!(
                    "extent values must be positive and finite, got {extent:?}"
                )));
            }
        }
        if let Some(center) = &self.center {
            if center.len() != dimension {
                return Err(Error::InvalidLayoutSpec(format!(
                    "center has {} values but the grid is {dimension}D",
                    center.len()
                )));
            }
            if center.iter().any(|c| !c.is_finite()) {
                return Err(Error::InvalidLayoutSpec(format!(
                    "center values must be finite, got {center:?}"
                )));
            }
        }
        Ok(())
    }

    fn node_count(&self, requested: Option<usize>) -> Result<usize> {
        let count = self
            .shape()
            .checked_node_count()
            .ok_or_else(|| Error::InvalidLayoutSpec("grid node count overflows".into()))?;
        match requested {
            Some(n) if n != count => Err(Error::InvalidLayoutSpec(format!(
                "requested {n} nodes but the grid holds {count}"
            ))),
            _ => Ok(count),
        }
    }

    fn generate(&self, count: usize, _rng: &mut dyn RngCore) -> Result<Vec<Coordinate>> {
        self.validate()?;
        let shape = self.shape();
        if count != shape.node_count() {
            return Err(Error::InvalidLayoutSpec(format!(
                "requested {count} nodes but the grid holds {}",
                shape.node_count()
            )));
        }

        let extent = self.effective_extent();
        let center = self.effective_center();

        let dx = extent[0] / self.columns as f64;
        let dy = extent[1] / self.rows as f64;
        let x0 = center[0] - extent[0] * 0.5 + dx * 0.5;
        let y0 = center[1] + extent[1] * 0.5 - dy * 0.5;

        let mut points = Vec::new();
        points.try_reserve_exact(count).map_err(|_| {
            Error::InvalidLayoutSpec(format!("cannot allocate positions for {count} grid nodes"))
        })?;
        match self.layers {
            None => {
                for row in 0..self.rows {
                    for col in 0..self.columns {
                        points.push(Coordinate::xy(
                            x0 + col as f64 * dx,
                            y0 - row as f64 * dy,
                        ));
                    }
                }
            }
            Some(layers) => {
                let dz = extent[2] / layers as f64;
                let z0 = center[2] - extent[2] * 0.5 + dz * 0.5;
                for layer in 0..layers {
                    for row in 0..self.rows {
                        for col in 0..self.columns {
                            points.push(Coordinate::xyz(
                                x0 + col as f64 * dx,
                                y0 - row as f64 * dy,
                                z0 + layer as f64 * dz,
                            ));
                        }
                    }
                }
            }
        }

        debug!(
            "Generated {} grid positions ({}x{}x{}).",
            points.len(),
            self.rows,
            self.columns,
            self.layers.unwrap_or(1)
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::layout::LayoutSpec;

    fn gen(spec: &GridSpec) -> Vec<Coordinate> {
        let mut rng = StdRng::seed_from_u64(0);
        spec.generate(spec.shape().node_count(), &mut rng).unwrap()
    }

    #[test]
    fn unit_grid_is_symmetric_about_origin() {
        let points = gen(&GridSpec::new(3, 3));
        assert_eq!(points.len(), 9);

        let third = 1.0 / 3.0;
        assert_eq!(points[0], Coordinate::xy(-0.5 + third * 0.5, 0.5 - third * 0.5));
        assert!(points[4].to_vec().iter().all(|c| c.abs() < 1e-12));

        let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| {
            let v = p.to_vec();
            (sx + v[0], sy + v[1])
        });
        assert!(sx.abs() < 1e-12 && sy.abs() < 1e-12);
        for p in &points {
            assert!(p.to_vec().iter().all(|c| c.abs() < 0.5));
        }
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn row_major_order_with_columns_fastest() {
        let points = gen(&GridSpec::new(2, 3).with_extent([3.0, 2.0]));
        let expected = [
            (-1.0, 0.5),
            (0.0, 0.5),
            (1.0, 0.5),
            (-1.0, -0.5),
            (0.0, -0.5),
            (1.0, -0.5),
        ];
        for (p, (x, y)) in points.iter().zip(expected) {
            assert_eq!(*p, Coordinate::xy(x, y));
        }
    }

    #[test]
    fn center_offsets_every_point() {
        let base = gen(&GridSpec::new(2, 2));
        let shifted = gen(&GridSpec::new(2, 2).with_center([10.0, -4.0]));
        for (a, b) in base.iter().zip(&shifted) {
            let (a, b) = (a.to_vec(), b.to_vec());
            assert!((b[0] - a[0] - 10.0).abs() < 1e-12);
            assert!((b[1] - a[1] + 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn three_dimensional_grid_enumerates_layers_last() {
        let spec = GridSpec::new(2, 2).with_layers(2).with_extent([2.0, 2.0, 4.0]);
        let points = gen(&spec);
        assert_eq!(points.len(), 8);
        assert!(points.iter().all(|p| p.dimension() == 3));
        assert_eq!(points[0].component(2), Some(-1.0));
        assert_eq!(points[3].component(2), Some(-1.0));
        assert_eq!(points[4].component(2), Some(1.0));
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        assert!(GridSpec::new(0, 3).validate().is_err());
        assert!(GridSpec::new(3, 0).validate().is_err());
        assert!(GridSpec::new(3, 3).with_layers(0).validate().is_err());
        assert!(GridSpec::new(3, 3)
            .with_extent([1.0, 1.0, 1.0])
            .validate()
            .is_err());
        assert!(GridSpec::new(3, 3).with_extent([1.0, -1.0]).validate().is_err());
        assert!(GridSpec::new(3, 3)
            .with_layers(2)
            .with_center([0.0, 0.0])
            .validate()
            .is_err());
        assert!(GridSpec::new(3, 3).with_extent([2.0, 2.0]).validate().is_ok());
    }

    #[test]
    fn index_of_and_ordinal_of_are_inverse() {
        let shape = GridSpec::new(3, 4).with_layers(2).shape();
        assert_eq!(shape.node_count(), 24);
        for ordinal in 0..shape.node_count() {
            let index = shape.index_of(ordinal).unwrap();
            assert_eq!(shape.ordinal_of(index), Some(ordinal));
        }
        assert_eq!(
            shape.index_of(5),
            Some(GridIndex {
                row: 1,
                column: 1,
                layer: 0
            })
        );
        assert!(shape.index_of(24).is_none());
    }

    #[test]
    fn overflowing_node_count_is_rejected() {
        let spec = GridSpec::new(usize::MAX, 2);
        assert!(spec.shape().checked_node_count().is_none());
        assert_eq!(spec.shape().node_count(), usize::MAX);
        assert!(spec.shape().index_of(0).is_none());
        assert!(matches!(spec.validate(), Err(Error::InvalidLayoutSpec(_))));
        assert!(matches!(
            PositionLayout::node_count(&spec, None),
            Err(Error::InvalidLayoutSpec(_))
        ));
        assert!(matches!(
            LayoutSpec::from(spec.clone()).node_count(None),
            Err(Error::InvalidLayoutSpec(_))
        ));

        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            spec.generate(usize::MAX, &mut rng),
            Err(Error::InvalidLayoutSpec(_))
        ));

        let deep = GridSpec::new(usize::MAX / 2, 1).with_layers(3);
        assert!(matches!(deep.validate(), Err(Error::InvalidLayoutSpec(_))));
    }
}
