use rand::rngs::StdRng;
use rand::SeedableRng;
use spatial_nodes::prelude::*;
use spatial_nodes_examples::{init_tracing, print_layer};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut kernel = MemoryKernel::default();
    let mut rng = StdRng::seed_from_u64(7);

    // Positions drawn per node from a 2D lognormal.
    let planar = LayerRequest::new(
        "iaf_psc_alpha",
        FreeSpec::generated(DistributionSpec::lognormal(1.0, 2.0).with_dimension(2)),
    )
    .with_count(33);
    let layer = create_layer(&mut kernel, &planar, &mut rng)?;
    print_layer(&layer, 5);

    // Per-axis parameters fix the dimension at three.
    let spatial = LayerRequest::new(
        "iaf_psc_alpha",
        FreeSpec::generated(DistributionSpec::lognormal([1.0, 1.0, 1.0], [2.0, 2.0, 2.0])),
    )
    .with_count(20);
    let layer = create_layer(&mut kernel, &spatial, &mut rng)?;
    print_layer(&layer, 5);

    Ok(())
}
