mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use spatial_nodes::prelude::*;

const GRID_SIDES: [usize; 4] = [8, 16, 32, 64];
const FREE_COUNTS: [usize; 3] = [256, 1024, 4096];

fn grid_request(side: usize) -> LayerRequest {
    LayerRequest::new("iaf_psc_alpha", GridSpec::new(side, side).with_extent([1.0, 1.0]))
        .with_param("V_m", DistributionSpec::uniform(-70.0, -55.0))
        .with_param("C_m", 200.0)
        .with_param(
            "I_e",
            ParameterExpression::position(Axis::X).abs().scale(100.0),
        )
}

fn assembly_grid_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly/grid");

    for &side in &GRID_SIDES {
        let request = grid_request(side);
        group.throughput(common::elements_throughput(side * side));
        let mut rng = StdRng::seed_from_u64(0x6121D_u64 ^ side as u64);

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let mut kernel = MemoryKernel::default();
                let layer =
                    create_layer(&mut kernel, &request, &mut rng).expect("valid grid request");
                black_box(layer.size());
            });
        });
    }

    group.finish();
}

fn assembly_free_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly/free_generated");

    for &count in &FREE_COUNTS {
        let request = LayerRequest::new(
            "iaf_psc_alpha",
            FreeSpec::generated(DistributionSpec::uniform([-0.5, -0.5], [0.5, 0.5])),
        )
        .with_count(count)
        .with_param("V_m", DistributionSpec::normal(-65.0, 2.0));
        group.throughput(common::elements_throughput(count));
        let mut rng = StdRng::seed_from_u64(0xF2EE_u64 ^ count as u64);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut kernel = MemoryKernel::default();
                let layer =
                    create_layer(&mut kernel, &request, &mut rng).expect("valid free request");
                black_box(layer.size());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = assembly_grid_benches, assembly_free_benches
}
criterion_main!(benches);
