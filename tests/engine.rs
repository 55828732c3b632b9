//! End-to-end scenarios from spec.md §8 (S1-S6), driven entirely through the
//! public `Engine` API the way a real caller would use it.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crt_tensor_mpc::protocol::arith::ScaleConstant;
use crt_tensor_mpc::protocol::io::{decode_output, encode_input};
use crt_tensor_mpc::{Engine, EngineConfig, Role};

fn config() -> EngineConfig {
    EngineConfig::spdz_default(HashMap::new())
}

fn input(engine: &mut Engine, config: &EngineConfig, values: &[f64], rows: usize, cols: usize) -> crt_tensor_mpc::PrivateTensor {
    let m = DMatrix::from_row_slice(rows, cols, values);
    let (placed_feed, x) = engine.define_input(encode_input(&m, config));
    assert_eq!(placed_feed.role(), Role::Ip);
    x
}

/// S1: dot([[1.5, -2.25]], [[2.0],[4.0]]) reveals [[-6.0]] within 3e-4.
#[test]
fn s1_dot_product() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[1.5, -2.25], 1, 2);
    let y = input(&mut engine, &config, &[2.0, 4.0], 2, 1);

    let z = engine.dot(x, y).unwrap();
    let revealed = engine.reveal(z);
    let decoded = decode_output(revealed.as_ref(), &config);
    assert!((decoded[(0, 0)] - -6.0).abs() < 3e-4, "{}", decoded[(0, 0)]);
}

/// S2: square([0.5, 1.0, -1.5]) reveals [0.25, 1.0, 2.25].
#[test]
fn s2_elementwise_square() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[0.5, 1.0, -1.5], 1, 3);

    let y = engine.square(x).unwrap();
    let revealed = engine.reveal(y);
    let decoded = decode_output(revealed.as_ref(), &config);
    for (got, want) in [decoded[(0, 0)], decoded[(0, 1)], decoded[(0, 2)]].into_iter().zip([0.25, 1.0, 2.25]) {
        assert!((got - want).abs() < 3e-4, "{got} vs {want}");
    }
}

/// S3: sigmoid([0.0, 1.0, -1.0]) reveals [0.5, 0.7310..., 0.2689...] within 1e-3.
#[test]
fn s3_sigmoid_within_domain() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[0.0, 1.0, -1.0], 1, 3);

    let y = engine.sigmoid(x).unwrap();
    let revealed = engine.reveal(y);
    let decoded = decode_output(revealed.as_ref(), &config);
    for (got, want) in [decoded[(0, 0)], decoded[(0, 1)], decoded[(0, 2)]].into_iter().zip([0.5, 0.7310585786, 0.2689414214])
    {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

/// S4: add([1.0,2.0], [3.0,-1.0]) reveals [4.0, 1.0] exactly (no truncation error).
#[test]
fn s4_add_is_exact() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[1.0, 2.0], 1, 2);
    let y = input(&mut engine, &config, &[3.0, -1.0], 1, 2);

    let z = engine.add(x, y).unwrap();
    let revealed = engine.reveal(z);
    assert_eq!(revealed.role(), Role::Or);
    let decoded = decode_output(revealed.as_ref(), &config);
    assert!((decoded[(0, 0)] - 4.0).abs() < 1e-9);
    assert!((decoded[(0, 1)] - 1.0).abs() < 1e-9);
}

/// S5: building mul(X, Y) twice with the same X, Y returns one memoized node
/// (observable here as handle equality rather than counting CP triple
/// sites, since this crate has no separate graph-visualization layer).
#[test]
fn s5_repeated_mul_is_memoized() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[1.0], 1, 1);
    let y = input(&mut engine, &config, &[2.0], 1, 1);

    let z1 = engine.mul(x, y).unwrap();
    let z2 = engine.mul(x, y).unwrap();
    assert_eq!(z1, z2);
}

/// S6: share randomness is never memoized; 1000 independent draws of a
/// fixed secret's share0 should look uniform, spot-checked via a coarse
/// chi-squared statistic on the smallest modulus component.
#[test]
fn s6_share_randomness_is_uniform() {
    let config = config();
    let mi = config.m[0];
    let mut counts = vec![0u32; mi as usize];

    for _ in 0..2000 {
        let secret = crt_tensor_mpc::tensor::residue::ResidueTensor::zeros(1, 1, config.num_components());
        let (s0, _s1) = crt_tensor_mpc::tensor::sharing::share(&secret, &config);
        let v = s0.component(0)[(0, 0)];
        counts[v as usize] += 1;
    }

    let expected = 2000.0 / mi as f64;
    let chi_squared: f64 = counts.iter().map(|&c| (c as f64 - expected).powi(2) / expected).sum();
    // Degrees of freedom = mi - 1 = 1200; at this scale the statistic should
    // land comfortably near its mean (~1200), not blow up into the
    // thousands the way a constant or low-entropy generator would.
    assert!(chi_squared < 3.0 * (mi as f64 - 1.0), "chi_squared = {chi_squared}");
}

/// Testable property 4: scale by an integer constant is exact (no truncation).
#[test]
fn scale_by_integer_constant_is_exact() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[1.25], 1, 1);

    let y = engine.scale(x, ScaleConstant::Integer(4)).unwrap();
    let revealed = engine.reveal(y);
    let decoded = decode_output(revealed.as_ref(), &config);
    assert!((decoded[(0, 0)] - 5.0).abs() < 1e-9);
}

/// Testable property 9: truncating a value already scaled by 2^f and then
/// truncated once returns a fixed point of the original value.
#[test]
fn truncation_fixed_point_for_low_precision_values() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[2.0], 1, 1);
    let scaled = engine.scale(x, ScaleConstant::Integer(config.big_k)).unwrap();
    let truncated = engine.truncate(scaled).unwrap();

    let revealed = engine.reveal(truncated);
    let decoded = decode_output(revealed.as_ref(), &config);
    assert!((decoded[(0, 0)] - 2.0).abs() < 2.0 * 2f64.powi(-(config.fractional_bits as i32)));
}

/// Testable property 10: cache consistency after running cache updates.
#[test]
fn cache_consistency_after_update() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let x = input(&mut engine, &config, &[7.0], 1, 1);
    let cached = engine.cache(x.into()).unwrap();
    engine.run_cache_updates();

    let fresh = engine.reveal(x);
    let cached_private = match cached {
        crt_tensor_mpc::AnyTensor::Private(p) => p,
        _ => panic!("cache on a PrivateTensor must return a PrivateTensor"),
    };
    let from_cache = engine.reveal(cached_private);
    assert_eq!(fresh, from_cache);
}

/// Testable property 8: add is associative up to the ring, exactly (no
/// multiplicative truncation noise is involved).
#[test]
fn add_is_associative_in_the_ring() {
    let config = config();
    let mut engine = Engine::new(config.clone());
    let a = input(&mut engine, &config, &[1.0], 1, 1);
    let b = input(&mut engine, &config, &[2.5], 1, 1);
    let c = input(&mut engine, &config, &[-0.75], 1, 1);

    let ab = engine.add(a, b).unwrap();
    let left = engine.add(ab, c).unwrap();
    let bc = engine.add(b, c).unwrap();
    let right = engine.add(a, bc).unwrap();

    let left_revealed = engine.reveal(left);
    let right_revealed = engine.reveal(right);
    assert_eq!(left_revealed, right_revealed);
}
