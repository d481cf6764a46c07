//! Declarative distribution specifications and their compiled per-axis form.
use std::fmt;
use std::str::FromStr;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::{ComponentSampling, Exponential, LogNormal, Normal, Uniform};
use crate::value::{Shape, Value};

/// A distribution parameter given either once for all axes or once per axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum AxisParam {
    /// Broadcast across every axis.
    Scalar(f64),
    /// One value per axis.
    PerAxis(Vec<f64>),
}

impl AxisParam {
    /// Number of axes fixed by this parameter, if any.
    pub fn axis_count(&self) -> Option<usize> {
        match self {
            AxisParam::Scalar(_) => None,
            AxisParam::PerAxis(values) => Some(values.len()),
        }
    }

    /// Canonical per-axis values for `dimension` axes.
    pub fn per_axis(&self, name: &str, dimension: usize) -> Result<Vec<f64>> {
        match self {
            AxisParam::Scalar(v) => Ok(vec![*v; dimension]),
            AxisParam::PerAxis(values) if values.len() == dimension => Ok(values.clone()),
            AxisParam::PerAxis(values) => Err(Error::InvalidDistributionSpec(format!(
                "parameter '{name}' has {} values but the distribution has dimension {dimension}",
                values.len()
            ))),
        }
    }
}

impl From<f64> for AxisParam {
    fn from(value: f64) -> Self {
        AxisParam::Scalar(value)
    }
}

impl From<Vec<f64>> for AxisParam {
    fn from(value: Vec<f64>) -> Self {
        AxisParam::PerAxis(value)
    }
}

impl<const N: usize> From<[f64; N]> for AxisParam {
    fn from(value: [f64; N]) -> Self {
        AxisParam::PerAxis(value.to_vec())
    }
}

/// Supported distribution families.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Uniform,
    Normal,
    Lognormal,
    Exponential,
}

impl DistributionKind {
    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Uniform => "uniform",
            DistributionKind::Normal => "normal",
            DistributionKind::Lognormal => "lognormal",
            DistributionKind::Exponential => "exponential",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(DistributionKind::Uniform),
            "normal" => Ok(DistributionKind::Normal),
            "lognormal" => Ok(DistributionKind::Lognormal),
            "exponential" => Ok(DistributionKind::Exponential),
            other => Err(Error::InvalidDistributionSpec(format!(
                "unsupported distribution kind '{other}'"
            ))),
        }
    }
}

/// Family-specific parameters of a distribution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum DistributionFamily {
    Uniform { min: AxisParam, max: AxisParam },
    Normal { loc: AxisParam, scale: AxisParam },
    Lognormal { mean: AxisParam, sigma: AxisParam },
    Exponential { scale: AxisParam },
}

impl DistributionFamily {
    /// Family with every parameter at its default.
    pub fn default_for(kind: DistributionKind) -> Self {
        match kind {
            DistributionKind::Uniform => DistributionFamily::Uniform {
                min: AxisParam::Scalar(0.0),
                max: AxisParam::Scalar(1.0),
            },
            DistributionKind::Normal => DistributionFamily::Normal {
                loc: AxisParam::Scalar(0.0),
                scale: AxisParam::Scalar(1.0),
            },
            DistributionKind::Lognormal => DistributionFamily::Lognormal {
                mean: AxisParam::Scalar(0.0),
                sigma: AxisParam::Scalar(1.0),
            },
            DistributionKind::Exponential => DistributionFamily::Exponential {
                scale: AxisParam::Scalar(1.0),
            },
        }
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            DistributionFamily::Uniform { .. } => DistributionKind::Uniform,
            DistributionFamily::Normal { .. } => DistributionKind::Normal,
            DistributionFamily::Lognormal { .. } => DistributionKind::Lognormal,
            DistributionFamily::Exponential { .. } => DistributionKind::Exponential,
        }
    }

    fn params(&self) -> Vec<(&'static str, &AxisParam)> {
        match self {
            DistributionFamily::Uniform { min, max } => vec![("min", min), ("max", max)],
            DistributionFamily::Normal { loc, scale } => vec![("loc", loc), ("scale", scale)],
            DistributionFamily::Lognormal { mean, sigma } => {
                vec![("mean", mean), ("sigma", sigma)]
            }
            DistributionFamily::Exponential { scale } => vec![("scale", scale)],
        }
    }

    fn param_mut(&mut self, name: &str) -> Option<&mut AxisParam> {
        match (self, name) {
            (DistributionFamily::Uniform { min, .. }, "min") => Some(min),
            (DistributionFamily::Uniform { max, .. }, "max") => Some(max),
            (DistributionFamily::Normal { loc, .. }, "loc") => Some(loc),
            (DistributionFamily::Normal { scale, .. }, "scale") => Some(scale),
            (DistributionFamily::Lognormal { mean, .. }, "mean") => Some(mean),
            (DistributionFamily::Lognormal { sigma, .. }, "sigma") => Some(sigma),
            (DistributionFamily::Exponential { scale }, "scale") => Some(scale),
            _ => None,
        }
    }
}

/// A random distribution with an optional declared dimension.
///
/// Without an explicit `dimension` the dimension is taken from the per-axis
/// parameters, or is `1` when every parameter is a scalar.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionSpec {
    pub family: DistributionFamily,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dimension: Option<usize>,
}

impl DistributionSpec {
    pub fn new(family: DistributionFamily) -> Self {
        Self {
            family,
            dimension: None,
        }
    }

    /// Uniform on `[min, max)` per axis.
    pub fn uniform(min: impl Into<AxisParam>, max: impl Into<AxisParam>) -> Self {
        Self::new(DistributionFamily::Uniform {
            min: min.into(),
            max: max.into(),
        })
    }

    pub fn normal(loc: impl Into<AxisParam>, scale: impl Into<AxisParam>) -> Self {
        Self::new(DistributionFamily::Normal {
            loc: loc.into(),
            scale: scale.into(),
        })
    }

    pub fn lognormal(mean: impl Into<AxisParam>, sigma: impl Into<AxisParam>) -> Self {
        Self::new(DistributionFamily::Lognormal {
            mean: mean.into(),
            sigma: sigma.into(),
        })
    }

    pub fn exponential(scale: impl Into<AxisParam>) -> Self {
        Self::new(DistributionFamily::Exponential {
            scale: scale.into(),
        })
    }

    /// Builds a spec from a kind name and named parameters.
    ///
    /// Parameters left out keep their defaults: `uniform{min=0, max=1}`,
    /// `normal{loc=0, scale=1}`, `lognormal{mean=0, sigma=1}`, `exponential{scale=1}`.
    pub fn from_kind(
        kind: &str,
        params: &[(&str, AxisParam)],
        dimension: Option<usize>,
    ) -> Result<Self> {
        let kind: DistributionKind = kind.parse()?;
        let mut family = DistributionFamily::default_for(kind);
        for (name, value) in params {
            let slot = family.param_mut(name).ok_or_else(|| {
                Error::InvalidDistributionSpec(format!(
                    "unknown parameter '{name}' for {kind} distribution"
                ))
            })?;
            *slot = value.clone();
        }
        Ok(Self { family, dimension })
    }

    /// Sets the declared dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn kind(&self) -> DistributionKind {
        self.family.kind()
    }

    /// Effective dimension: declared, or inferred from the per-axis parameters.
    pub fn resolved_dimension(&self) -> Result<usize> {
        let mut inferred: Option<(&str, usize)> = None;
        for (name, param) in self.family.params() {
            let Some(len) = param.axis_count() else {
                continue;
            };
            if len == 0 {
                return Err(Error::InvalidDistributionSpec(format!(
                    "parameter '{name}' has no values"
                )));
            }
            match inferred {
                Some((first, n)) if n != len => {
                    return Err(Error::InvalidDistributionSpec(format!(
                        "parameters '{first}' ({n} values) and '{name}' ({len} values) disagree"
                    )));
                }
                None => inferred = Some((name, len)),
                _ => {}
            }
        }

        match (self.dimension, inferred) {
            (Some(0), _) => Err(Error::InvalidDistributionSpec(
                "dimension must be a positive integer".into(),
            )),
            (Some(d), Some((name, n))) if d != n => Err(Error::InvalidDistributionSpec(format!(
                "dimension {d} does not match the {n} values of parameter '{name}'"
            ))),
            (Some(d), _) => Ok(d),
            (None, Some((_, n))) => Ok(n),
            (None, None) => Ok(1),
        }
    }

    /// Resolves the parameters into a canonical per-axis [`Distribution`].
    pub fn compile(&self) -> Result<Distribution> {
        let dimension = self.resolved_dimension()?;
        let axes = match &self.family {
            DistributionFamily::Uniform { min, max } => {
                let min = min.per_axis("min", dimension)?;
                let max = max.per_axis("max", dimension)?;
                zip_axes(&min, &max, |a, b| Uniform::new(a, b).map(AxisSampler::Uniform))?
            }
            DistributionFamily::Normal { loc, scale } => {
                let loc = loc.per_axis("loc", dimension)?;
                let scale = scale.per_axis("scale", dimension)?;
                zip_axes(&loc, &scale, |a, b| Normal::new(a, b).map(AxisSampler::Normal))?
            }
            DistributionFamily::Lognormal { mean, sigma } => {
                let mean = mean.per_axis("mean", dimension)?;
                let sigma = sigma.per_axis("sigma", dimension)?;
                zip_axes(&mean, &sigma, |a, b| {
                    LogNormal::new(a, b).map(AxisSampler::Lognormal)
                })?
            }
            DistributionFamily::Exponential { scale } => scale
                .per_axis("scale", dimension)?
                .into_iter()
                .map(|s| Exponential::new(s).map(AxisSampler::Exponential))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Distribution {
            kind: self.kind(),
            axes,
        })
    }
}

impl From<DistributionKind> for DistributionSpec {
    fn from(kind: DistributionKind) -> Self {
        Self::new(DistributionFamily::default_for(kind))
    }
}

fn zip_axes(
    a: &[f64],
    b: &[f64],
    build: impl Fn(f64, f64) -> Result<AxisSampler>,
) -> Result<Vec<AxisSampler>> {
    a.iter().zip(b.iter()).map(|(a, b)| build(*a, *b)).collect()
}

#[derive(Debug, Clone, PartialEq)]
enum AxisSampler {
    Uniform(Uniform),
    Normal(Normal),
    Lognormal(LogNormal),
    Exponential(Exponential),
}

impl ComponentSampling for AxisSampler {
    #[inline]
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match self {
            AxisSampler::Uniform(d) => d.sample(rng),
            AxisSampler::Normal(d) => d.sample(rng),
            AxisSampler::Lognormal(d) => d.sample(rng),
            AxisSampler::Exponential(d) => d.sample(rng),
        }
    }
}

/// A validated distribution with one sampler per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    kind: DistributionKind,
    axes: Vec<AxisSampler>,
}

impl Distribution {
    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    pub fn shape(&self) -> Shape {
        Shape::from_dimension(self.dimension())
    }

    /// Draws one sample; components are drawn independently in axis order.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Value {
        if let [axis] = self.axes.as_slice() {
            return Value::Scalar(axis.sample(rng));
        }
        Value::Vector(self.axes.iter().map(|axis| axis.sample(rng)).collect())
    }
}
