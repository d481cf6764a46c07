//! Parameter expressions: deferred per-node values.
//!
//! A [`ParameterExpression`] is a small tagged tree. It is compiled once into a
//! [`CompiledExpression`] (distributions are validated and their parameters
//! broadcast per axis) and then resolved once per node with a [`NodeContext`].
use std::ops;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::DistributionSpec;
use crate::value::Value;

pub mod compiled;

pub use compiled::{resolve, CompiledExpression, NodeContext};

/// Spatial axis of a coordinate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Component-wise transform applied to the value of an inner expression.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    Scale(f64),
    Offset(f64),
    Abs,
    Exp,
    Pow(f64),
    Clamp { min: f64, max: f64 },
}

impl Transform {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Transform::Scale(factor) => x * factor,
            Transform::Offset(offset) => x + offset,
            Transform::Abs => x.abs(),
            Transform::Exp => x.exp(),
            Transform::Pow(exp) => x.powf(exp),
            Transform::Clamp { min, max } => x.max(min).min(max),
        }
    }

    pub(crate) fn validate(self) -> Result<()> {
        match self {
            Transform::Clamp { min, max } if min.is_nan() || max.is_nan() || min > max => {
                Err(Error::InvalidConfig(format!(
                    "clamp requires min <= max (min={min}, max={max})"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Component-wise binary operation joining two expressions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
        }
    }
}

/// A deferred value, resolved once per node at creation time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterExpression {
    /// The same value for every node.
    Constant(Value),
    /// A fresh draw for every node.
    Distribution(DistributionSpec),
    /// The node's own coordinate along an axis.
    Position(Axis),
    Derived {
        expr: Box<ParameterExpression>,
        transform: Transform,
    },
    Combined {
        op: BinaryOp,
        lhs: Box<ParameterExpression>,
        rhs: Box<ParameterExpression>,
    },
}

impl ParameterExpression {
    pub fn constant(value: impl Into<Value>) -> Self {
        ParameterExpression::Constant(value.into())
    }

    pub fn position(axis: Axis) -> Self {
        ParameterExpression::Position(axis)
    }

    pub fn transform(self, transform: Transform) -> Self {
        ParameterExpression::Derived {
            expr: Box::new(self),
            transform,
        }
    }

    pub fn combine(self, op: BinaryOp, rhs: impl Into<ParameterExpression>) -> Self {
        ParameterExpression::Combined {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        self.transform(Transform::Scale(factor))
    }

    pub fn offset(self, offset: f64) -> Self {
        self.transform(Transform::Offset(offset))
    }

    pub fn abs(self) -> Self {
        self.transform(Transform::Abs)
    }

    pub fn exp(self) -> Self {
        self.transform(Transform::Exp)
    }

    pub fn pow(self, exp: f64) -> Self {
        self.transform(Transform::Pow(exp))
    }

    pub fn clamp(self, min: f64, max: f64) -> Self {
        self.transform(Transform::Clamp { min, max })
    }

    pub fn min(self, rhs: impl Into<ParameterExpression>) -> Self {
        self.combine(BinaryOp::Min, rhs)
    }

    pub fn max(self, rhs: impl Into<ParameterExpression>) -> Self {
        self.combine(BinaryOp::Max, rhs)
    }

    /// True when every node receives the same value.
    pub fn is_constant(&self) -> bool {
        match self {
            ParameterExpression::Constant(_) => true,
            ParameterExpression::Distribution(_) | ParameterExpression::Position(_) => false,
            ParameterExpression::Derived { expr, .. } => expr.is_constant(),
            ParameterExpression::Combined { lhs, rhs, .. } => {
                lhs.is_constant() && rhs.is_constant()
            }
        }
    }

    /// Validates the tree and produces its canonical, ready-to-resolve form.
    pub fn compile(&self) -> Result<CompiledExpression> {
        Ok(match self {
            ParameterExpression::Constant(value) => CompiledExpression::Constant(value.clone()),
            ParameterExpression::Distribution(spec) => {
                CompiledExpression::Distribution(spec.compile()?)
            }
            ParameterExpression::Position(axis) => CompiledExpression::Position(*axis),
            ParameterExpression::Derived { expr, transform } => {
                transform.validate()?;
                CompiledExpression::Derived(Box::new(expr.compile()?), *transform)
            }
            ParameterExpression::Combined { op, lhs, rhs } => CompiledExpression::Combined(
                *op,
                Box::new(lhs.compile()?),
                Box::new(rhs.compile()?),
            ),
        })
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(Value::Scalar(value))
    }
}

impl From<Value> for ParameterExpression {
    fn from(value: Value) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<DistributionSpec> for ParameterExpression {
    fn from(spec: DistributionSpec) -> Self {
        ParameterExpression::Distribution(spec)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<ParameterExpression>> ops::$trait<T> for ParameterExpression {
            type Output = ParameterExpression;

            fn $method(self, rhs: T) -> Self::Output {
                self.combine($op, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);
