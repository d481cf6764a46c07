use rand::rngs::StdRng;
use rand::SeedableRng;
use spatial_nodes::prelude::*;
use spatial_nodes_examples::{init_tracing, print_layer, print_scalar_summary};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 3x3 lattice on a 2x2 square centred at the origin.
    let request = LayerRequest::new(
        "iaf_psc_alpha",
        GridSpec::new(3, 3).with_extent([2.0, 2.0]),
    )
    .with_param("V_m", DistributionSpec::uniform(-70.0, -55.0))
    .with_param("C_m", 200.0);

    let mut kernel = MemoryKernel::default();
    let mut rng = StdRng::seed_from_u64(2025);
    let layer = create_layer(&mut kernel, &request, &mut rng)?;

    print_layer(&layer, layer.size());
    print_scalar_summary(&kernel, &layer, "V_m");
    print_scalar_summary(&kernel, &layer, "C_m");

    Ok(())
}
