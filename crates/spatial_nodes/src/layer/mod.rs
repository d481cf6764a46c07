//! Layers: spatially positioned node collections and their construction.
use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::kernel::NodeHandle;
use crate::layout::{bounding_box, GridShape, LayoutSpec};

pub mod assembler;
pub mod events;
pub mod request;

/// Read-only spatial description of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialMetadata {
    /// 2 or 3.
    pub dimension: usize,
    /// Physical size per axis: as specified, or the bounding box span of the positions.
    pub extent: Vec<f64>,
    pub center: Coordinate,
    /// Lattice shape for grid layers.
    pub grid: Option<GridShape>,
}

impl SpatialMetadata {
    /// Derives the metadata of a layout from its generated `positions`.
    pub fn compute(layout: &LayoutSpec, positions: &[Coordinate]) -> Result<Self> {
        match layout {
            LayoutSpec::Grid(grid) => Ok(Self {
                dimension: grid.dimension(),
                extent: grid.effective_extent(),
                center: Coordinate::from_slice(&grid.effective_center())?,
                grid: Some(grid.shape()),
            }),
            LayoutSpec::Free(free) => {
                let (min, max) = bounding_box(positions).ok_or_else(|| {
                    Error::InvalidLayoutSpec("a layer needs at least one position".into())
                })?;
                let extent = match &free.extent {
                    Some(extent) => extent.clone(),
                    None => min.iter().zip(&max).map(|(lo, hi)| hi - lo).collect(),
                };
                let center = match &free.center {
                    Some(center) => center.clone(),
                    None => min.iter().zip(&max).map(|(lo, hi)| 0.5 * (lo + hi)).collect(),
                };
                Ok(Self {
                    dimension: min.len(),
                    extent,
                    center: Coordinate::from_slice(&center)?,
                    grid: None,
                })
            }
        }
    }

    /// Axes along which the layer has no spatial spread.
    pub fn degenerate_axes(&self) -> Vec<usize> {
        self.extent
            .iter()
            .enumerate()
            .filter(|(_, e)| **e <= 0.0)
            .map(|(axis, _)| axis)
            .collect()
    }
}

/// An ordered collection of nodes, each paired with a coordinate.
///
/// Created once by [`assembler::create_layer`] and immutable afterwards. Node state
/// lives in the kernel; the layer only keeps the handles.
#[derive(Clone, Debug)]
pub struct Layer {
    model: String,
    nodes: Vec<NodeHandle>,
    positions: Vec<Coordinate>,
    spatial: SpatialMetadata,
}

impl Layer {
    pub(crate) fn new(
        model: String,
        nodes: Vec<NodeHandle>,
        positions: Vec<Coordinate>,
        spatial: SpatialMetadata,
    ) -> Self {
        debug_assert_eq!(nodes.len(), positions.len());
        Self {
            model,
            nodes,
            positions,
            spatial,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimensionality(&self) -> usize {
        self.spatial.dimension
    }

    pub fn extent(&self) -> &[f64] {
        &self.spatial.extent
    }

    pub fn center(&self) -> Coordinate {
        self.spatial.center
    }

    pub fn positions(&self) -> &[Coordinate] {
        &self.positions
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    pub fn spatial(&self) -> &SpatialMetadata {
        &self.spatial
    }

    pub fn grid_shape(&self) -> Option<GridShape> {
        self.spatial.grid
    }

    pub fn rows(&self) -> Option<usize> {
        self.spatial.grid.map(|g| g.rows)
    }

    pub fn columns(&self) -> Option<usize> {
        self.spatial.grid.map(|g| g.columns)
    }

    pub fn layers(&self) -> Option<usize> {
        self.spatial.grid.and_then(|g| g.layers)
    }

    /// Coordinate of `handle`, if the node belongs to this layer.
    pub fn position_of(&self, handle: NodeHandle) -> Option<&Coordinate> {
        let ordinal = self.nodes.iter().position(|h| *h == handle)?;
        self.positions.get(ordinal)
    }

    /// `(handle, coordinate)` pairs in node ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Coordinate)> + '_ {
        self.nodes.iter().copied().zip(self.positions.iter())
    }
}
