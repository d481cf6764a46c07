//! Free layouts: explicit position lists or one expression drawn per node.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::layout::{bounding_box, PositionLayout};
use crate::parameter::{NodeContext, ParameterExpression};

/// Where the positions of a free layer come from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PositionSource {
    /// One coordinate per node, in node order.
    Explicit(Vec<Coordinate>),
    /// Resolved once per node ordinal; each node gets an independent draw.
    Generated(ParameterExpression),
}

/// Free layout specification.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FreeSpec {
    pub positions: PositionSource,
    /// Bounding size per axis. Computed from the positions when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extent: Option<Vec<f64>>,
    /// Center of the extent. Only valid together with `extent`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub center: Option<Vec<f64>>,
    /// Declared dimensionality of the positions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dimension: Option<usize>,
}

impl FreeSpec {
    pub fn new(positions: PositionSource) -> Self {
        Self {
            positions,
            extent: None,
            center: None,
            dimension: None,
        }
    }

    /// Free layout from an explicit, ordered list of positions.
    pub fn explicit<I, C>(positions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        Self::new(PositionSource::Explicit(
            positions.into_iter().map(Into::into).collect(),
        ))
    }

    /// Free layout whose positions are drawn from `source`, once per node.
    pub fn generated(source: impl Into<ParameterExpression>) -> Self {
        Self::new(PositionSource::Generated(source.into()))
    }

    pub fn with_extent(mut self, extent: impl Into<Vec<f64>>) -> Self {
        self.extent = Some(extent.into());
        self
    }

    pub fn with_center(mut self, center: impl Into<Vec<f64>>) -> Self {
        self.center = Some(center.into());
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Dimensionality known without resolving anything.
    pub fn known_dimension(&self) -> Option<usize> {
        if let Some(d) = self.dimension {
            return Some(d);
        }
        if let Some(extent) = &self.extent {
            return Some(extent.len());
        }
        match &self.positions {
            PositionSource::Explicit(list) => list.first().map(Coordinate::dimension),
            PositionSource::Generated(_) => None,
        }
    }

    fn check_position(&self, position: &Coordinate, bounds: Option<&Bounds>) -> Result<()> {
        if let Some(d) = self.known_dimension() {
            if position.dimension() != d {
                return Err(Error::dimension(d, position.dimension(), "position"));
            }
        }
        if !position.is_finite() {
            return Err(Error::InvalidLayoutSpec(format!(
                "position {position:?} is not finite"
            )));
        }
        if let Some(bounds) = bounds {
            bounds.check(position)?;
        }
        Ok(())
    }
}

/// Axis-aligned box derived from an explicit extent and center.
struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    fn new(extent: &[f64], center: &[f64]) -> Self {
        Self {
            lower: extent.iter().zip(center).map(|(e, c)| c - e * 0.5).collect(),
            upper: extent.iter().zip(center).map(|(e, c)| c + e * 0.5).collect(),
        }
    }

    fn check(&self, position: &Coordinate) -> Result<()> {
        let inside = position
            .to_vec()
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .all(|(p, (lo, hi))| (*lo..=*hi).contains(p));
        if inside {
            Ok(())
        } else {
            Err(Error::InvalidLayoutSpec(format!(
                "position {:?} lies outside the extent [{:?}, {:?}]",
                position.to_vec(),
                self.lower,
                self.upper
            )))
        }
    }
}

impl PositionLayout for FreeSpec {
    fn validate(&self) -> Result<()> {
        if let Some(d) = self.dimension {
            if !(2..=3).contains(&d) {
                return Err(Error::InvalidLayoutSpec(format!(
                    "free layers are 2D or 3D, declared dimension is {d}"
                )));
            }
        }
        if let Some(extent) = &self.extent {
            if !(2..=3).contains(&extent.len()) {
                return Err(Error::InvalidLayoutSpec(format!(
                    "extent needs 2 or 3 values, got {}",
                    extent.len()
                )));
            }
            if extent.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                return Err(Error::InvalidLayoutSpec(format!(
                    "extent values must be positive and finite, got {extent:?}"
                )));
            }
            if let Some(d) = self.dimension {
                if d != extent.len() {
                    return Err(Error::InvalidLayoutSpec(format!(
                        "extent has {} values but the layer is {d}D",
                        extent.len()
                    )));
                }
            }
        }
        match (&self.extent, &self.center) {
            (None, Some(_)) => {
                return Err(Error::InvalidLayoutSpec(
                    "a free layer center requires an explicit extent".into(),
                ))
            }
            (Some(extent), Some(center)) if extent.len() != center.len() => {
                return Err(Error::InvalidLayoutSpec(format!(
                    "center has {} values but extent has {}",
                    center.len(),
                    extent.len()
                )))
            }
            _ => {}
        }

        match &self.positions {
            PositionSource::Explicit(list) => {
                let Some(first) = list.first() else {
                    return Err(Error::InvalidLayoutSpec(
                        "explicit position list is empty".into(),
                    ));
                };
                let d = first.dimension();
                if let Some(ordinal) = list.iter().position(|c| c.dimension() != d) {
                    return Err(Error::InvalidLayoutSpec(format!(
                        "position {ordinal} is {}D but position 0 is {d}D",
                        list[ordinal].dimension()
                    )));
                }
                if let Some(declared) = self.known_dimension() {
                    if declared != d {
                        return Err(Error::InvalidLayoutSpec(format!(
                            "layout is declared {declared}D but explicit positions are {d}D"
                        )));
                    }
                }
                Ok(())
            }
            PositionSource::Generated(expr) => expr.compile().map(|_| ()),
        }
    }

    fn node_count(&self, requested: Option<usize>) -> Result<usize> {
        match (&self.positions, requested) {
            (PositionSource::Explicit(list), Some(n)) if n != list.len() => {
                Err(Error::InvalidLayoutSpec(format!(
                    "requested {n} nodes but {} positions were given",
                    list.len()
                )))
            }
            (PositionSource::Explicit(list), _) => Ok(list.len()),
            (PositionSource::Generated(_), Some(0)) => Err(Error::InvalidLayoutSpec(
                "node count must be positive".into(),
            )),
            (PositionSource::Generated(_), Some(n)) => Ok(n),
            (PositionSource::Generated(_), None) => Err(Error::InvalidLayoutSpec(
                "generated positions require an explicit node count".into(),
            )),
        }
    }

    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<Coordinate>> {
        let points = match &self.positions {
            PositionSource::Explicit(list) => {
                self.validate()?;
                if count != list.len() {
                    return Err(Error::InvalidLayoutSpec(format!(
                        "requested {count} nodes but {} positions were given",
                        list.len()
                    )));
                }
                list.clone()
            }
            PositionSource::Generated(expr) => {
                let compiled = expr.compile()?;
                let mut points = Vec::with_capacity(count);
                let mut dimension = self.known_dimension();
                for ordinal in 0..count {
                    let ctx = NodeContext::new(ordinal);
                    let value = compiled
                        .resolve(&ctx, rng)
                        .map_err(|e| e.at_node(ordinal, "position"))?;
                    let found = value.dimension();
                    let expected = *dimension.get_or_insert(found);
                    if found != expected {
                        return Err(Error::dimension(expected, found, "position")
                            .at_node(ordinal, "position"));
                    }
                    if !(2..=3).contains(&found) {
                        let expected = if found < 2 { 2 } else { 3 };
                        return Err(Error::dimension(expected, found, "position")
                            .at_node(ordinal, "position"));
                    }
                    points.push(
                        Coordinate::from_slice(value.as_slice())
                            .map_err(|e| e.at_node(ordinal, "position"))?,
                    );
                }
                points
            }
        };

        // Without an explicit center the extent is placed around the bounding box midpoint.
        let bounds = self.extent.as_ref().map(|extent| {
            let center = match (&self.center, bounding_box(&points)) {
                (Some(center), _) => center.clone(),
                (None, Some((lo, hi))) => lo.iter().zip(&hi).map(|(l, h)| 0.5 * (l + h)).collect(),
                (None, None) => vec![0.0; extent.len()],
            };
            Bounds::new(extent, &center)
        });

        for (ordinal, position) in points.iter().enumerate() {
            self.check_position(position, bounds.as_ref())
                .map_err(|e| e.at_node(ordinal, "position"))?;
        }

        debug!("Generated {} free positions.", points.len());
        Ok(points)
    }
}
