//! In-memory kernel with a small model registry.
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{Error, Result};
use crate::kernel::{NodeHandle, NodeInstantiation, ParameterApplication};
use crate::value::{Shape, Value};

/// A state variable of a model.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSpec {
    pub shape: Shape,
    pub default: Value,
}

/// A node model: a name and its state variables with defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub variables: BTreeMap<String, VariableSpec>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Adds a variable whose shape is taken from its default value.
    pub fn with_variable(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        self.variables.insert(
            name.into(),
            VariableSpec {
                shape: default.shape(),
                default,
            },
        );
        self
    }

    /// Leaky integrate-and-fire neuron with alpha-shaped synaptic currents.
    pub fn iaf_psc_alpha() -> Self {
        Self::new("iaf_psc_alpha")
            .with_variable("C_m", 250.0)
            .with_variable("E_L", -70.0)
            .with_variable("I_e", 0.0)
            .with_variable("V_m", -70.0)
            .with_variable("V_reset", -70.0)
            .with_variable("V_th", -55.0)
            .with_variable("t_ref", 2.0)
            .with_variable("tau_m", 10.0)
            .with_variable("tau_syn_ex", 2.0)
            .with_variable("tau_syn_in", 2.0)
    }

    /// Relay neuron without tunable state.
    pub fn parrot_neuron() -> Self {
        Self::new("parrot_neuron")
    }
}

/// Registry of the models a kernel can instantiate.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Registry holding the built-in models.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        registry.register(ModelSpec::iaf_psc_alpha());
        registry.register(ModelSpec::parrot_neuron());
        registry
    }

    /// Registers `model`, replacing any model with the same name.
    pub fn register(&mut self, model: ModelSpec) -> &mut Self {
        self.models.insert(model.name.clone(), model);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Clone, Debug)]
struct NodeState {
    model: String,
    values: BTreeMap<String, Value>,
}

/// Kernel storing every node and its state in memory.
///
/// Handles are issued sequentially starting at 1 and are never reused.
#[derive(Clone, Debug)]
pub struct MemoryKernel {
    registry: ModelRegistry,
    nodes: Vec<NodeState>,
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new(ModelRegistry::with_builtin_models())
    }
}

impl MemoryKernel {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    /// Total number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, handle: NodeHandle) -> Option<&NodeState> {
        let index = usize::try_from(handle.0).ok()?.checked_sub(1)?;
        self.nodes.get(index)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut NodeState> {
        let index = usize::try_from(handle.0).ok()?.checked_sub(1)?;
        self.nodes.get_mut(index)
    }

    pub fn model_of(&self, handle: NodeHandle) -> Option<&str> {
        self.node(handle).map(|n| n.model.as_str())
    }

    /// Current value of `name` on `handle`.
    pub fn get(&self, handle: NodeHandle, name: &str) -> Option<&Value> {
        self.node(handle)?.values.get(name)
    }

    /// Values of `name` for every handle, in order; `None` if any lookup fails.
    pub fn collect(&self, handles: &[NodeHandle], name: &str) -> Option<Vec<Value>> {
        handles
            .iter()
            .map(|h| self.get(*h, name).cloned())
            .collect()
    }

    /// Scalar values of `name` for every handle, in order.
    pub fn collect_scalars(&self, handles: &[NodeHandle], name: &str) -> Option<Vec<f64>> {
        handles
            .iter()
            .map(|h| self.get(*h, name).and_then(Value::as_scalar))
            .collect()
    }
}

impl NodeInstantiation for MemoryKernel {
    fn instantiate(&mut self, model: &str, count: usize) -> Result<Vec<NodeHandle>> {
        let spec = self.registry.get(model).ok_or_else(|| Error::UnknownModel {
            model: model.to_owned(),
        })?;
        if count == 0 {
            return Err(Error::InstantiationFailure(format!(
                "cannot create zero nodes of '{model}'"
            )));
        }

        let defaults: BTreeMap<String, Value> = spec
            .variables
            .iter()
            .map(|(name, var)| (name.clone(), var.default.clone()))
            .collect();

        let first = self.nodes.len() as u64 + 1;
        self.nodes.reserve(count);
        for _ in 0..count {
            self.nodes.push(NodeState {
                model: model.to_owned(),
                values: defaults.clone(),
            });
        }
        debug!("Instantiated {} '{}' nodes from {}.", count, model, first);
        Ok((first..first + count as u64).map(NodeHandle).collect())
    }
}

impl ParameterApplication for MemoryKernel {
    fn apply(&mut self, handle: NodeHandle, name: &str, value: &Value) -> Result<()> {
        let parameter_error = |message: String| Error::Parameter {
            name: name.to_owned(),
            message,
        };

        let model = self
            .node(handle)
            .map(|n| n.model.clone())
            .ok_or_else(|| parameter_error(format!("unknown node {handle}")))?;
        let expected = self
            .registry
            .get(&model)
            .and_then(|m| m.variables.get(name))
            .map(|v| v.shape)
            .ok_or_else(|| {
                parameter_error(format!("'{model}' has no state variable of this name"))
            })?;
        if value.shape() != expected {
            return Err(parameter_error(format!(
                "expected a {expected} value, got {}",
                value.shape()
            )));
        }

        if let Some(node) = self.node_mut(handle) {
            node.values.insert(name.to_owned(), value.clone());
        }
        Ok(())
    }
}
