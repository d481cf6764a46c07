//! Layer assembly: positions, node instantiation and per-node parameters.
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::kernel::{NodeInstantiation, ParameterApplication};
use crate::layer::events::{EventSink, LayerEvent, LayerEventKind};
use crate::layer::request::LayerRequest;
use crate::layer::{Layer, SpatialMetadata};
use crate::layout::PositionLayout;
use crate::parameter::{CompiledExpression, NodeContext};
use crate::random::seed_for_layer;

/// Creates the layer described by `request` in `kernel`.
///
/// All positions are generated first. Nodes are then instantiated in one call and
/// parameterized in node ordinal order, each node resolving its parameters in the
/// order they appear in the request. Errors raised while resolving or applying a
/// value carry the ordinal of the offending node.
pub fn create_layer<K, R>(kernel: &mut K, request: &LayerRequest, rng: &mut R) -> Result<Layer>
where
    K: NodeInstantiation + ParameterApplication + ?Sized,
    R: RngCore,
{
    create_layer_internal(kernel, request, rng, &mut ())
}

/// Like [`create_layer`], reporting progress to `sink`.
pub fn create_layer_with_events<K, R>(
    kernel: &mut K,
    request: &LayerRequest,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Result<Layer>
where
    K: NodeInstantiation + ParameterApplication + ?Sized,
    R: RngCore,
{
    create_layer_internal(kernel, request, rng, sink)
}

fn create_layer_internal<K>(
    kernel: &mut K,
    request: &LayerRequest,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> Result<Layer>
where
    K: NodeInstantiation + ParameterApplication + ?Sized,
{
    request.validate()?;
    let count = request.node_count()?;
    let params = request
        .params
        .iter()
        .map(|(name, expr)| expr.compile().map(|compiled| (name.as_str(), compiled)))
        .collect::<Result<Vec<(&str, CompiledExpression)>>>()?;

    info!(
        "Creating layer of {} '{}' nodes with {} parameter(s).",
        count,
        request.model,
        params.len()
    );
    if sink.wants(LayerEventKind::LayerStarted) {
        sink.send(LayerEvent::LayerStarted {
            model: request.model.clone(),
            node_count: count,
            parameters: params.iter().map(|(name, _)| (*name).to_owned()).collect(),
        });
    }

    let positions = request.layout.generate(count, rng)?;
    let spatial = SpatialMetadata::compute(&request.layout, &positions)?;
    if sink.wants(LayerEventKind::PositionsGenerated) {
        sink.send(LayerEvent::PositionsGenerated {
            count: positions.len(),
            dimension: spatial.dimension,
        });
    }
    for axis in spatial.degenerate_axes() {
        warn!(
            "Layer of '{}' has zero extent along axis {}.",
            request.model, axis
        );
        if sink.wants(LayerEventKind::Warning) {
            sink.send(LayerEvent::Warning {
                context: format!("{}:axis{}", request.model, axis),
                message: "layer has zero extent along this axis".into(),
            });
        }
    }

    let nodes = kernel.instantiate(&request.model, count)?;
    if nodes.len() != count {
        return Err(Error::InstantiationFailure(format!(
            "kernel returned {} handles for {} requested '{}' nodes",
            nodes.len(),
            count,
            request.model
        )));
    }
    if sink.wants(LayerEventKind::NodesInstantiated) {
        sink.send(LayerEvent::NodesInstantiated {
            model: request.model.clone(),
            handles: nodes.clone(),
        });
    }

    if !params.is_empty() {
        let report = sink.wants(LayerEventKind::NodeParameterized);
        for (ordinal, (&handle, &position)) in nodes.iter().zip(&positions).enumerate() {
            let ctx = NodeContext::new(ordinal).with_position(position);
            let mut values = Vec::with_capacity(if report { params.len() } else { 0 });
            for (name, expr) in &params {
                let value = expr
                    .resolve(&ctx, rng)
                    .map_err(|e| e.at_node(ordinal, *name))?;
                kernel
                    .apply(handle, name, &value)
                    .map_err(|e| e.at_node(ordinal, *name))?;
                if report {
                    values.push(((*name).to_owned(), value));
                }
            }
            if report {
                sink.send(LayerEvent::NodeParameterized {
                    ordinal,
                    handle,
                    position,
                    values,
                });
            }
        }
        debug!("Parameterized {} nodes.", nodes.len());
    }

    let layer = Layer::new(request.model.clone(), nodes, positions, spatial);
    info!(
        "Created {}D layer of {} '{}' nodes, extent {:?}.",
        layer.dimensionality(),
        layer.size(),
        layer.model(),
        layer.extent()
    );
    if sink.wants(LayerEventKind::LayerFinished) {
        sink.send(LayerEvent::LayerFinished {
            model: layer.model().to_owned(),
            size: layer.size(),
            spatial: layer.spatial().clone(),
        });
    }
    Ok(layer)
}

/// Creates successive layers in one kernel.
///
/// Each layer created through [`LayerAssembler::create_seeded`] draws from its own
/// generator seeded by [`seed_for_layer`], so a layer's values depend only on the
/// base seed and its index.
pub struct LayerAssembler<'a, K: ?Sized> {
    /// Kernel receiving the nodes.
    pub kernel: &'a mut K,
    /// Base seed for [`LayerAssembler::create_seeded`].
    pub base_seed: u64,
    layers_created: u64,
}

impl<'a, K> LayerAssembler<'a, K>
where
    K: NodeInstantiation + ParameterApplication + ?Sized,
{
    pub fn new(kernel: &'a mut K) -> Self {
        Self {
            kernel,
            base_seed: 0,
            layers_created: 0,
        }
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Number of layers created so far.
    pub fn layers_created(&self) -> u64 {
        self.layers_created
    }

    pub fn create(&mut self, request: &LayerRequest, rng: &mut impl RngCore) -> Result<Layer> {
        self.create_with_events(request, rng, &mut ())
    }

    pub fn create_with_events(
        &mut self,
        request: &LayerRequest,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<Layer> {
        let layer = create_layer_internal(&mut *self.kernel, request, rng, sink)?;
        self.layers_created += 1;
        Ok(layer)
    }

    /// Creates a layer from a generator derived from the base seed and layer index.
    pub fn create_seeded(&mut self, request: &LayerRequest) -> Result<Layer> {
        self.create_seeded_with_events(request, &mut ())
    }

    /// Like [`LayerAssembler::create_seeded`], reporting progress to `sink`.
    pub fn create_seeded_with_events(
        &mut self,
        request: &LayerRequest,
        sink: &mut dyn EventSink,
    ) -> Result<Layer> {
        let seed = seed_for_layer(self.base_seed, self.layers_created);
        let mut rng = StdRng::seed_from_u64(seed);
        self.create_with_events(request, &mut rng, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use crate::kernel::{MemoryKernel, NodeHandle};
    use crate::layer::events::VecSink;
    use crate::layout::{FreeSpec, GridSpec};
    use crate::parameter::{Axis, ParameterExpression};
    use crate::random::DistributionSpec;
    use crate::value::Value;

    #[test]
    fn creates_grid_layer_with_parameters() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(1);
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(3, 3))
            .with_param("V_m", DistributionSpec::uniform(-70.0, -55.0))
            .with_param("C_m", 200.0);

        let layer = create_layer(&mut kernel, &request, &mut rng).unwrap();
        assert_eq!(layer.size(), 9);
        assert_eq!(layer.rows(), Some(3));
        assert_eq!(layer.columns(), Some(3));

        let c_m = kernel.collect_scalars(layer.nodes(), "C_m").unwrap();
        assert!(c_m.iter().all(|c| *c == 200.0));
        let v_m = kernel.collect_scalars(layer.nodes(), "V_m").unwrap();
        assert!(v_m.iter().all(|v| (-70.0..-55.0).contains(v)));
    }

    #[test]
    fn position_dependent_parameters_see_node_coordinates() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(2);
        let request = LayerRequest::new(
            "iaf_psc_alpha",
            FreeSpec::explicit([(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]),
        )
        .with_param("I_e", ParameterExpression::position(Axis::X).scale(10.0));

        let layer = create_layer(&mut kernel, &request, &mut rng).unwrap();
        let i_e = kernel.collect_scalars(layer.nodes(), "I_e").unwrap();
        assert_eq!(i_e, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn resolution_errors_carry_node_ordinal() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(3);
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(2, 2))
            .with_param("V_m", DistributionSpec::uniform(0.0, 1.0).with_dimension(2));

        let err = create_layer(&mut kernel, &request, &mut rng).unwrap_err();
        assert_eq!(err.ordinal(), Some(0));
        assert!(matches!(err.root(), Error::Parameter { .. }), "{err}");
    }

    #[test]
    fn unknown_model_fails_before_parameters() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(4);
        let request = LayerRequest::new("no_such_model", GridSpec::new(2, 2));
        assert!(matches!(
            create_layer(&mut kernel, &request, &mut rng),
            Err(Error::UnknownModel { .. })
        ));
        assert_eq!(kernel.node_count(), 0);
    }

    #[test]
    fn invalid_layout_creates_no_nodes() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(5);
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(3, 0));
        assert!(matches!(
            create_layer(&mut kernel, &request, &mut rng),
            Err(Error::InvalidLayoutSpec(_))
        ));
        assert_eq!(kernel.node_count(), 0);
    }

    #[test]
    fn events_follow_construction_order() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(6);
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(1, 2))
            .with_param("V_m", -60.0);
        let mut sink = VecSink::new();

        create_layer_with_events(&mut kernel, &request, &mut rng, &mut sink).unwrap();
        let kinds: Vec<_> = sink.as_slice().iter().map(LayerEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerEventKind::LayerStarted,
                LayerEventKind::PositionsGenerated,
                LayerEventKind::NodesInstantiated,
                LayerEventKind::NodeParameterized,
                LayerEventKind::NodeParameterized,
                LayerEventKind::LayerFinished,
            ]
        );
        match &sink.as_slice()[4] {
            LayerEvent::NodeParameterized {
                ordinal,
                handle,
                values,
                ..
            } => {
                assert_eq!(*ordinal, 1);
                assert_eq!(*handle, NodeHandle(2));
                assert_eq!(values, &vec![("V_m".to_owned(), Value::Scalar(-60.0))]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn flat_free_layer_emits_warning() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(7);
        let request = LayerRequest::new(
            "parrot_neuron",
            FreeSpec::explicit([Coordinate::xy(0.0, 0.0), Coordinate::xy(1.0, 0.0)]),
        );
        let mut sink = VecSink::only([LayerEventKind::Warning]);

        create_layer_with_events(&mut kernel, &request, &mut rng, &mut sink).unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn seeded_assembler_is_reproducible_per_layer_index() {
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(2, 2))
            .with_param("V_m", DistributionSpec::normal(-65.0, 2.0));

        let run = |base_seed| {
            let mut kernel = MemoryKernel::default();
            let mut assembler = LayerAssembler::new(&mut kernel).with_base_seed(base_seed);
            let a = assembler.create_seeded(&request).unwrap();
            let b = assembler.create_seeded(&request).unwrap();
            assert_eq!(assembler.layers_created(), 2);
            (
                kernel.collect_scalars(a.nodes(), "V_m").unwrap(),
                kernel.collect_scalars(b.nodes(), "V_m").unwrap(),
            )
        };

        let (first_a, first_b) = run(11);
        let (second_a, second_b) = run(11);
        assert_eq!(first_a, second_a);
        assert_eq!(first_b, second_b);
        assert_ne!(first_a, first_b);
    }

    #[test]
    fn seeded_events_match_plain_seeded_run() {
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(2, 3))
            .with_param("V_m", DistributionSpec::uniform(-70.0, -55.0));

        let mut plain_kernel = MemoryKernel::default();
        let plain = LayerAssembler::new(&mut plain_kernel)
            .with_base_seed(42)
            .create_seeded(&request)
            .unwrap();

        let mut kernel = MemoryKernel::default();
        let mut assembler = LayerAssembler::new(&mut kernel).with_base_seed(42);
        let mut sink = VecSink::only([LayerEventKind::LayerFinished]);
        let layer = assembler
            .create_seeded_with_events(&request, &mut sink)
            .unwrap();
        assert_eq!(assembler.layers_created(), 1);
        assert_eq!(sink.len(), 1);

        assert_eq!(
            kernel.collect_scalars(layer.nodes(), "V_m").unwrap(),
            plain_kernel.collect_scalars(plain.nodes(), "V_m").unwrap()
        );

        let mut other_kernel = MemoryKernel::default();
        let other = LayerAssembler::new(&mut other_kernel)
            .with_base_seed(43)
            .create_seeded(&request)
            .unwrap();
        assert_ne!(
            other_kernel.collect_scalars(other.nodes(), "V_m").unwrap(),
            plain_kernel.collect_scalars(plain.nodes(), "V_m").unwrap()
        );
    }

    #[test]
    fn single_component_constant_applies_to_scalar_variable() {
        let mut kernel = MemoryKernel::default();
        let mut rng = StdRng::seed_from_u64(5);
        let request = LayerRequest::new("iaf_psc_alpha", GridSpec::new(2, 2))
            .with_param("C_m", ParameterExpression::constant([250.0]));

        let layer = create_layer(&mut kernel, &request, &mut rng).unwrap();
        let c_m = kernel.collect_scalars(layer.nodes(), "C_m").unwrap();
        assert_eq!(c_m, vec![250.0; 4]);
    }
}
