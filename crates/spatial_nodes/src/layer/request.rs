//! Layer requests: the configuration consumed by the assembler.
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{LayoutSpec, PositionLayout};
use crate::parameter::ParameterExpression;

/// Everything needed to create one layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct LayerRequest {
    /// Model identifier passed to the kernel.
    pub model: String,
    /// Node count; required for generated free layouts, implied otherwise.
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: Option<usize>,
    pub layout: LayoutSpec,
    /// Per-node parameters, resolved in this order for every node.
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Vec<(String, ParameterExpression)>,
}

impl LayerRequest {
    pub fn new(model: impl Into<String>, layout: impl Into<LayoutSpec>) -> Self {
        Self {
            model: model.into(),
            count: None,
            layout: layout.into(),
            params: Vec::new(),
        }
    }

    /// Sets the node count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Adds a parameter, replacing an earlier one with the same name in place.
    pub fn with_param(
        mut self,
        name: impl Into<String>,
        expr: impl Into<ParameterExpression>,
    ) -> Self {
        let name = name.into();
        let expr = expr.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = expr,
            None => self.params.push((name, expr)),
        }
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParameterExpression> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, expr)| expr)
    }

    /// Number of nodes the request will create.
    pub fn node_count(&self) -> Result<usize> {
        self.layout.node_count(self.count)
    }

    /// Validates the request, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig("model identifier must not be empty".into()));
        }
        let mut seen = HashSet::with_capacity(self.params.len());
        for (name, _) in &self.params {
            if name.trim().is_empty() {
                return Err(Error::InvalidConfig("parameter names must not be empty".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "parameter '{name}' is given more than once"
                )));
            }
        }
        self.layout.validate()?;
        self.node_count()?;
        Ok(())
    }

    /// Parses a request from RON text.
    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}
