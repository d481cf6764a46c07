#![cfg(feature = "ron")]

use rand::rngs::StdRng;
use rand::SeedableRng;
use spatial_nodes::prelude::*;

#[test]
fn generated_free_layer_from_ron() {
    let text = r#"(
        model: "iaf_psc_alpha",
        count: Some(12),
        layout: Free((
            positions: Generated(Distribution((
                family: Lognormal(mean: [1.0, 1.0, 1.0], sigma: 2.0),
            ))),
        )),
        params: [
            ("V_m", Distribution((family: Uniform(min: -70.0, max: -55.0)))),
        ],
    )"#;
    let request = LayerRequest::from_ron_str(text).unwrap();
    let mut kernel = MemoryKernel::default();
    let layer = create_layer(&mut kernel, &request, &mut StdRng::seed_from_u64(3)).unwrap();

    assert_eq!(layer.size(), 12);
    assert_eq!(layer.dimensionality(), 3);
    let v_m = kernel.collect_scalars(layer.nodes(), "V_m").unwrap();
    assert!(v_m.iter().all(|v| (-70.0..-55.0).contains(v)));
}

#[test]
fn request_survives_ron_round_trip() {
    let request = LayerRequest::new(
        "iaf_psc_alpha",
        GridSpec::new(2, 3).with_extent([3.0, 2.0]),
    )
    .with_param("I_e", ParameterExpression::position(Axis::X).scale(10.0))
    .with_param("C_m", 200.0);

    let text = ron::to_string(&request).unwrap();
    let parsed = LayerRequest::from_ron_str(&text).unwrap();
    assert_eq!(parsed, request);
}

#[test]
fn malformed_ron_is_reported() {
    let err = LayerRequest::from_ron_str("(model: 3)").unwrap_err();
    assert!(matches!(err, Error::Ron(_)), "{err}");
}
