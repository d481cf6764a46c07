use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spatial_nodes::prelude::*;
use spatial_nodes_examples::{init_tracing, print_layer, print_scalar_summary};

const REQUEST: &str = r#"(
    model: "iaf_psc_alpha",
    layout: Free((
        positions: Explicit([Planar((1.0, 1.0)), Planar((2.0, 2.0)), Planar((3.0, 3.0))]),
    )),
    params: [
        ("V_m", Distribution((family: Normal(loc: -65.0, scale: 1.5)))),
        ("C_m", Constant(200.0)),
    ],
)"#;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A path argument replaces the built-in request.
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => REQUEST.to_owned(),
    };
    let request = LayerRequest::from_ron_str(&text)?;

    let mut kernel = MemoryKernel::default();
    let mut rng = StdRng::seed_from_u64(1);
    let layer = create_layer(&mut kernel, &request, &mut rng)?;

    print_layer(&layer, layer.size());
    print_scalar_summary(&kernel, &layer, "V_m");

    Ok(())
}
