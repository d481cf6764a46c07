//! Interfaces to the simulation kernel that owns the nodes.
//!
//! Layer construction only needs two services from the kernel: creating nodes of a
//! model ([`NodeInstantiation`]) and assigning a value to a node's state variable
//! ([`ParameterApplication`]). [`MemoryKernel`] is a self-contained implementation
//! of both.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Value;

pub mod memory;

pub use memory::{MemoryKernel, ModelRegistry, ModelSpec, VariableSpec};

/// Opaque identifier of a node created by the kernel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node-instantiation service.
pub trait NodeInstantiation {
    /// Creates `count` nodes of `model` and returns their handles in creation order.
    ///
    /// Fails with [`crate::error::Error::UnknownModel`] for an unknown model and with
    /// [`crate::error::Error::InstantiationFailure`] when `count` is zero.
    fn instantiate(&mut self, model: &str, count: usize) -> Result<Vec<NodeHandle>>;
}

/// Parameter-application service.
pub trait ParameterApplication {
    /// Assigns `value` to the state variable `name` of `handle`.
    ///
    /// Fails with [`crate::error::Error::Parameter`] when the variable is unknown for
    /// the node's model or the value has the wrong shape.
    fn apply(&mut self, handle: NodeHandle, name: &str, value: &Value) -> Result<()>;
}

impl<T: NodeInstantiation + ?Sized> NodeInstantiation for &mut T {
    fn instantiate(&mut self, model: &str, count: usize) -> Result<Vec<NodeHandle>> {
        (**self).instantiate(model, count)
    }
}

impl<T: ParameterApplication + ?Sized> ParameterApplication for &mut T {
    fn apply(&mut self, handle: NodeHandle, name: &str, value: &Value) -> Result<()> {
        (**self).apply(handle, name, value)
    }
}
