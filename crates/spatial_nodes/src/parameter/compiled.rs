//! Compiled expressions and per-node resolution.
use rand::RngCore;

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::parameter::{Axis, BinaryOp, ParameterExpression, Transform};
use crate::random::Distribution;
use crate::value::{Shape, Value};

/// What a node exposes to the expressions resolved for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeContext {
    /// Zero-based creation-order index of the node within its layer.
    pub ordinal: usize,
    /// The node's coordinate, once known.
    pub position: Option<Coordinate>,
}

impl NodeContext {
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            position: None,
        }
    }

    pub fn with_position(mut self, position: Coordinate) -> Self {
        self.position = Some(position);
        self
    }
}

/// Validated expression tree ready to be resolved node by node.
#[derive(Clone, Debug, PartialEq)]
pub enum CompiledExpression {
    Constant(Value),
    Distribution(Distribution),
    Position(Axis),
    Derived(Box<CompiledExpression>, Transform),
    Combined(BinaryOp, Box<CompiledExpression>, Box<CompiledExpression>),
}

impl CompiledExpression {
    /// Statically known shape, or `None` if the operands cannot be combined.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            CompiledExpression::Constant(value) => Some(value.shape()),
            CompiledExpression::Distribution(d) => Some(d.shape()),
            CompiledExpression::Position(_) => Some(Shape::Scalar),
            CompiledExpression::Derived(inner, _) => inner.shape(),
            CompiledExpression::Combined(_, lhs, rhs) => match (lhs.shape()?, rhs.shape()?) {
                (Shape::Scalar, other) | (other, Shape::Scalar) => Some(other),
                (Shape::Vector(a), Shape::Vector(b)) if a == b => Some(Shape::Vector(a)),
                _ => None,
            },
        }
    }

    /// Resolves the expression for one node.
    ///
    /// Each call draws fresh samples from every distribution in the tree, left
    /// operand before right operand.
    pub fn resolve(&self, ctx: &NodeContext, rng: &mut dyn RngCore) -> Result<Value> {
        match self {
            CompiledExpression::Constant(value) => Ok(value.clone()),
            CompiledExpression::Distribution(d) => Ok(d.sample(rng)),
            CompiledExpression::Position(axis) => {
                let position = ctx
                    .position
                    .ok_or_else(|| Error::dimension(axis.index() + 1, 0, "position lookup"))?;
                position
                    .component(axis.index())
                    .map(Value::Scalar)
                    .ok_or_else(|| {
                        Error::dimension(axis.index() + 1, position.dimension(), "position lookup")
                    })
            }
            CompiledExpression::Derived(inner, transform) => {
                let value = inner.resolve(ctx, rng)?;
                Ok(value.map(|x| transform.apply(x)))
            }
            CompiledExpression::Combined(op, lhs, rhs) => {
                let a = lhs.resolve(ctx, rng)?;
                let b = rhs.resolve(ctx, rng)?;
                a.zip_with(&b, |a, b| op.apply(a, b))
            }
        }
    }

    /// Resolves the expression and checks that the value has the `expected` shape.
    pub fn resolve_as(
        &self,
        ctx: &NodeContext,
        rng: &mut dyn RngCore,
        expected: Shape,
        context: &str,
    ) -> Result<Value> {
        let value = self.resolve(ctx, rng)?;
        if value.shape() != expected {
            return Err(Error::dimension(
                expected.dimension(),
                value.dimension(),
                context,
            ));
        }
        Ok(value)
    }
}

/// Compiles `expr` and resolves it once for the node described by `ctx`.
pub fn resolve<R: RngCore>(
    expr: &ParameterExpression,
    ctx: &NodeContext,
    rng: &mut R,
) -> Result<Value> {
    expr.compile()?.resolve(ctx, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::DistributionSpec;

    fn ctx(ordinal: usize) -> NodeContext {
        NodeContext::new(ordinal)
    }

    #[test]
    fn constant_ignores_context() {
        let expr = ParameterExpression::from(200.0).compile().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for i in 0..10 {
            assert_eq!(
                expr.resolve(&ctx(i), &mut rng).unwrap(),
                Value::Scalar(200.0)
            );
        }
    }

    #[test]
    fn distribution_draws_fresh_value_per_node() {
        let expr = ParameterExpression::from(DistributionSpec::uniform(0.0, 1.0))
            .compile()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let values: Vec<f64> = (0..20)
            .map(|i| expr.resolve(&ctx(i), &mut rng).unwrap().as_scalar().unwrap())
            .collect();
        assert!(values.iter().any(|v| *v != values[0]));
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn same_seed_and_order_reproduce_values() {
        let expr = ParameterExpression::from(DistributionSpec::normal(0.0, 1.0).with_dimension(2))
            .compile()
            .unwrap();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..5)
                .map(|i| expr.resolve(&ctx(i), &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }

    #[test]
    fn position_reads_coordinate_components() {
        let expr = (ParameterExpression::position(Axis::Y) * 2.0).compile().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let c = ctx(0).with_position(Coordinate::xy(1.0, -0.25));
        assert_eq!(expr.resolve(&c, &mut rng).unwrap(), Value::Scalar(-0.5));
    }

    #[test]
    fn position_without_coordinate_or_axis_is_mismatch() {
        let mut rng = StdRng::seed_from_u64(4);
        let z = ParameterExpression::position(Axis::Z).compile().unwrap();

        let err = z.resolve(&ctx(0), &mut rng).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { found: 0, .. }));

        let planar = ctx(0).with_position(Coordinate::xy(0.0, 0.0));
        let err = z.resolve(&planar, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn resolve_as_rejects_wrong_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let scalar = ParameterExpression::from(DistributionSpec::uniform(0.0, 1.0))
            .compile()
            .unwrap();
        let err = scalar
            .resolve_as(&ctx(0), &mut rng, Shape::Vector(2), "position")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn shape_inference_handles_broadcast_and_mismatch() {
        let v2 = ParameterExpression::from(DistributionSpec::uniform(0.0, 1.0).with_dimension(2));
        let v3 = ParameterExpression::constant([1.0, 2.0, 3.0]);

        let ok = (v2.clone() * 3.0).compile().unwrap();
        assert_eq!(ok.shape(), Some(Shape::Vector(2)));

        let bad = (v2 + v3).compile().unwrap();
        assert_eq!(bad.shape(), None);
        let mut rng = StdRng::seed_from_u64(6);
        assert!(bad.resolve(&ctx(0), &mut rng).is_err());
    }

    #[test]
    fn free_function_compiles_and_resolves() {
        let mut rng = StdRng::seed_from_u64(7);
        let v = resolve(
            &ParameterExpression::from(DistributionSpec::exponential([0.5, 1.0])),
            &ctx(0),
            &mut rng,
        )
        .unwrap();
        assert_eq!(v.dimension(), 2);
        assert!(v.as_slice().iter().all(|x| *x >= 0.0));
    }
}
