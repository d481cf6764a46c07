use spatial_nodes::prelude::*;
use spatial_nodes_examples::{init_tracing, print_layer, print_scalar_summary};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 4x5x2 lattice; the input current grows with depth and a noisy threshold is
    // clamped to a physiological range.
    let grid = GridSpec::new(4, 5)
        .with_layers(2)
        .with_extent([4.0, 5.0, 2.0]);
    let request = LayerRequest::new("iaf_psc_alpha", grid)
        .with_param(
            "I_e",
            ParameterExpression::position(Axis::Z).offset(1.0).scale(150.0),
        )
        .with_param(
            "V_th",
            ParameterExpression::from(DistributionSpec::normal(-55.0, 2.0)).clamp(-60.0, -50.0),
        )
        .with_param(
            "tau_m",
            ParameterExpression::from(DistributionSpec::exponential(5.0)) + 5.0,
        );

    let mut kernel = MemoryKernel::default();
    let mut assembler = LayerAssembler::new(&mut kernel).with_base_seed(42);
    let mut sink = VecSink::only([LayerEventKind::Warning, LayerEventKind::LayerFinished]);
    let layer = assembler.create_seeded_with_events(&request, &mut sink)?;
    info!(events = sink.len(), "layer events recorded");
    for event in sink.as_slice() {
        if let LayerEvent::Warning { context, message } = event {
            info!("warning from {context}: {message}");
        }
    }

    print_layer(&layer, 6);
    for name in ["I_e", "V_th", "tau_m"] {
        print_scalar_summary(&kernel, &layer, name);
    }

    Ok(())
}
