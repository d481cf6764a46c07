#![forbid(unsafe_code)]
//! spatial_nodes: spatially organized node layers with lazily resolved random parameters.
//!
//! Modules:
//! - random: uniform, normal, lognormal and exponential distributions, scalar or per-axis vector
//! - parameter: constant, random, position-dependent and derived parameter expressions
//! - layout: grid and free layouts producing ordered 2D/3D coordinates
//! - kernel: node-instantiation and parameter-application services, plus an in-memory kernel
//! - layer: layer requests, the assembler, layer metadata and events
//!
//! All randomness flows through a generator supplied by the caller.
pub mod coordinate;
pub mod error;
pub mod kernel;
pub mod layer;
pub mod layout;
pub mod parameter;
pub mod random;
pub mod value;

/// Convenient re-exports for common types. Import with `use spatial_nodes::prelude::*;`.
pub mod prelude {
    pub use crate::coordinate::Coordinate;
    pub use crate::error::{Error, Result};
    pub use crate::kernel::{
        MemoryKernel, ModelRegistry, ModelSpec, NodeHandle, NodeInstantiation,
        ParameterApplication,
    };
    pub use crate::layer::assembler::{create_layer, create_layer_with_events, LayerAssembler};
    pub use crate::layer::events::{
        EventSink, FnSink, LayerEvent, LayerEventKind, MultiSink, VecSink,
    };
    pub use crate::layer::request::LayerRequest;
    pub use crate::layer::{Layer, SpatialMetadata};
    pub use crate::layout::{
        FreeSpec, GridShape, GridSpec, LayoutSpec, PositionLayout, PositionSource,
    };
    pub use crate::parameter::{
        resolve, Axis, BinaryOp, CompiledExpression, NodeContext, ParameterExpression, Transform,
    };
    pub use crate::random::{
        sample, seed_for_layer, AxisParam, Distribution, DistributionFamily, DistributionKind,
        DistributionSpec,
    };
    pub use crate::value::{Shape, Value};
}
