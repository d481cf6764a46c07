//! Node coordinates in 2D or 3D space.
use glam::{DVec2, DVec3};
use mint::{Vector2, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Position of a node. Every coordinate of a layer has the same dimensionality.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coordinate {
    Planar(DVec2),
    Spatial(DVec3),
}

impl Coordinate {
    pub fn xy(x: f64, y: f64) -> Self {
        Coordinate::Planar(DVec2::new(x, y))
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Coordinate::Spatial(DVec3::new(x, y, z))
    }

    /// Builds a coordinate from 2 or 3 components.
    pub fn from_slice(components: &[f64]) -> Result<Self> {
        match *components {
            [x, y] => Ok(Coordinate::xy(x, y)),
            [x, y, z] => Ok(Coordinate::xyz(x, y, z)),
            _ => Err(Error::InvalidLayoutSpec(format!(
                "a position needs 2 or 3 components, got {}",
                components.len()
            ))),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Coordinate::Planar(_) => 2,
            Coordinate::Spatial(_) => 3,
        }
    }

    /// Component along `axis` (`0 = x`, `1 = y`, `2 = z`).
    pub fn component(&self, axis: usize) -> Option<f64> {
        self.to_vec().get(axis).copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Coordinate::Planar(p) => p.to_array().to_vec(),
            Coordinate::Spatial(p) => p.to_array().to_vec(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Coordinate::Planar(p) => p.is_finite(),
            Coordinate::Spatial(p) => p.is_finite(),
        }
    }
}

impl From<DVec2> for Coordinate {
    fn from(value: DVec2) -> Self {
        Coordinate::Planar(value)
    }
}

impl From<DVec3> for Coordinate {
    fn from(value: DVec3) -> Self {
        Coordinate::Spatial(value)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Coordinate::xy(x, y)
    }
}

impl From<[f64; 3]> for Coordinate {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Coordinate::xyz(x, y, z)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::xy(x, y)
    }
}

impl From<(f64, f64, f64)> for Coordinate {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Coordinate::xyz(x, y, z)
    }
}

impl From<Vector2<f64>> for Coordinate {
    fn from(value: Vector2<f64>) -> Self {
        Coordinate::Planar(DVec2::from(value))
    }
}

impl From<Vector3<f64>> for Coordinate {
    fn from(value: Vector3<f64>) -> Self {
        Coordinate::Spatial(DVec3::from(value))
    }
}
