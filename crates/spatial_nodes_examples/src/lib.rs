#![forbid(unsafe_code)]
//! Shared helpers for the spatial_nodes example binaries.
use glam::DVec3;
use spatial_nodes::prelude::*;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes logging; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spatial_nodes=debug"));
    // A subscriber may already be installed when binaries share a process.
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Mean node position; planar positions contribute `z = 0`.
pub fn centroid(layer: &Layer) -> DVec3 {
    if layer.size() == 0 {
        return DVec3::ZERO;
    }
    let sum = layer
        .positions()
        .iter()
        .map(|position| match *position {
            Coordinate::Planar(p) => p.extend(0.0),
            Coordinate::Spatial(p) => p,
        })
        .fold(DVec3::ZERO, |acc, p| acc + p);
    sum / layer.size() as f64
}

/// Prints the layer metadata and the first `limit` nodes with their positions.
pub fn print_layer(layer: &Layer, limit: usize) {
    println!(
        "layer of {} '{}' nodes, {}D, extent {:?}, center {:?}",
        layer.size(),
        layer.model(),
        layer.dimensionality(),
        layer.extent(),
        layer.center().to_vec()
    );
    info!(centroid = ?centroid(layer), "layer placed");
    if let Some(shape) = layer.grid_shape() {
        println!(
            "grid: {} rows x {} columns x {} layers",
            shape.rows,
            shape.columns,
            shape.layers.unwrap_or(1)
        );
    }
    for (handle, position) in layer.iter().take(limit) {
        println!("  {handle} at {:?}", position.to_vec());
    }
    if layer.size() > limit {
        println!("  ... {} more", layer.size() - limit);
    }
}

/// Prints min, mean and max of a scalar state variable across the layer.
pub fn print_scalar_summary(kernel: &MemoryKernel, layer: &Layer, name: &str) {
    let Some(values) = kernel.collect_scalars(layer.nodes(), name) else {
        println!("{name}: not a scalar variable of '{}'", layer.model());
        return;
    };
    if values.is_empty() {
        return;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    println!("{name}: min {min:.3}, mean {mean:.3}, max {max:.3}");
}
