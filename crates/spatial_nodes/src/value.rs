//! Resolved per-node values and their shapes.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A concrete value produced by resolving a parameter expression.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// Shape of a [`Value`]: a scalar or a vector of fixed length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Vector(usize),
}

impl Shape {
    /// Builds the shape for `dimension` components; `1` is a scalar.
    pub fn from_dimension(dimension: usize) -> Self {
        if dimension == 1 {
            Shape::Scalar
        } else {
            Shape::Vector(dimension)
        }
    }

    /// Number of components.
    pub fn dimension(self) -> usize {
        match self {
            Shape::Scalar => 1,
            Shape::Vector(d) => d,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Vector(d) => write!(f, "vector[{d}]"),
        }
    }
}

impl Value {
    /// Builds a value from components, collapsing a single component into a scalar.
    pub fn from_components(mut components: Vec<f64>) -> Self {
        if components.len() == 1 {
            Value::Scalar(components[0])
        } else {
            components.shrink_to_fit();
            Value::Vector(components)
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::Scalar,
            Value::Vector(v) => Shape::Vector(v.len()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.shape().dimension()
    }

    /// Components as a slice; a scalar is a one-element slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Value::Scalar(v) => std::slice::from_ref(v),
            Value::Vector(v) => v,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Vector(_) => None,
        }
    }

    /// Returns the scalar, failing with [`Error::DimensionMismatch`] for vectors.
    pub fn expect_scalar(&self, context: &str) -> Result<f64> {
        match self {
            Value::Scalar(v) => Ok(*v),
            Value::Vector(v) => Err(Error::dimension(1, v.len(), context)),
        }
    }

    /// Applies `f` to every component, keeping the shape.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Value {
        match self {
            Value::Scalar(v) => Value::Scalar(f(*v)),
            Value::Vector(v) => Value::Vector(v.iter().copied().map(f).collect()),
        }
    }

    /// Combines two values component-wise. A scalar broadcasts over a vector.
    pub fn zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b))),
            (Value::Scalar(a), Value::Vector(b)) => {
                Ok(Value::Vector(b.iter().map(|b| f(*a, *b)).collect()))
            }
            (Value::Vector(a), Value::Scalar(b)) => {
                Ok(Value::Vector(a.iter().map(|a| f(*a, *b)).collect()))
            }
            (Value::Vector(a), Value::Vector(b)) => {
                if a.len() != b.len() {
                    return Err(Error::dimension(a.len(), b.len(), "combined expression"));
                }
                Ok(Value::Vector(
                    a.iter().zip(b.iter()).map(|(a, b)| f(*a, *b)).collect(),
                ))
            }
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::from_components(value)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(value: [f64; N]) -> Self {
        Value::from_components(value.to_vec())
    }
}
