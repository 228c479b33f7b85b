use nalgebra::Vector3;
use pbx_box::PeriodicBox;
use pbx_core::rng::RngHandle;
use pbx_core::rng::derive_substream_seed;
use pbx_data::{
    canonical_hash, generate_system, generate_system_stream, GenerateOptions, ReplicaCount,
    UnitCell,
};
use proptest::prelude::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn triclinic_cell() -> UnitCell {
    let sim_box = PeriodicBox::new(2.0, 3.0, 4.0, 0.2, -0.1, 0.3, false).unwrap();
    UnitCell::from_parts(
        sim_box,
        vec![Vector3::new(0.1, 0.2, 0.3), Vector3::new(0.6, 0.7, 0.8)],
    )
    .unwrap()
}

#[test]
fn simple_cubic_pair_replication_hits_centered_corners() {
    let mut rng = RngHandle::from_seed(0);
    let system = UnitCell::sc()
        .to_system(&GenerateOptions::replicas(2), &mut rng)
        .unwrap();
    assert_eq!(system.len(), 8);
    assert!(approx(system.sim_box.lengths().x, 2.0));
    assert!(approx(system.sim_box.lengths().y, 2.0));
    assert!(approx(system.sim_box.lengths().z, 2.0));
    for p in &system.positions {
        for value in p.iter() {
            assert!(approx(*value, -1.0) || approx(*value, 0.0), "{p:?}");
        }
    }
    let mut seen = system
        .positions
        .iter()
        .map(|p| (p.x as i32, p.y as i32, p.z as i32))
        .collect::<Vec<_>>();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 8);
}

#[test]
fn positions_follow_replica_then_basis_order() {
    let mut rng = RngHandle::from_seed(0);
    let cell = UnitCell::bcc();
    let system = cell
        .to_system(&GenerateOptions::replicas([2, 3, 1]), &mut rng)
        .unwrap();
    assert_eq!(system.len(), 2 * 3 * 1 * 2);
    let mut idx = 0;
    for i in 0..2 {
        for j in 0..3 {
            let offset = Vector3::new(i as f64, j as f64, 0.0);
            for site in cell.basis_positions() {
                let expected = cell
                    .sim_box()
                    .make_absolute(&(site + offset - Vector3::repeat(0.5)));
                assert_eq!(system.positions[idx], expected);
                idx += 1;
            }
        }
    }
}

#[test]
fn single_replica_maps_shifted_basis_through_the_cell() {
    let cell = triclinic_cell();
    let options = GenerateOptions::default().with_scale(1.5);
    let mut rng = RngHandle::from_seed(3);
    let system = cell.to_system(&options, &mut rng).unwrap();
    assert_eq!(system.len(), cell.num_basis());
    for (site, position) in cell.basis_positions().iter().zip(&system.positions) {
        let expected = cell
            .sim_box()
            .make_absolute(&((site - Vector3::repeat(0.5)) * 1.5));
        assert_eq!(*position, expected);
    }
    let expected_box = cell.sim_box().scaled(1.5).unwrap();
    assert!((system.sim_box.to_matrix() - expected_box.to_matrix()).norm() < 1e-12);
}

#[test]
fn output_box_scales_lattice_per_axis() {
    let cell = triclinic_cell();
    let mut rng = RngHandle::from_seed(0);
    let system = cell
        .to_system(
            &GenerateOptions::replicas([2, 1, 3]).with_scale(0.5),
            &mut rng,
        )
        .unwrap();
    let [a1, a2, a3] = cell.sim_box().lattice_vectors();
    let [b1, b2, b3] = system.sim_box.lattice_vectors();
    assert!((b1 - a1 * 1.0).norm() < 1e-12);
    assert!((b2 - a2 * 0.5).norm() < 1e-12);
    assert!((b3 - a3 * 1.5).norm() < 1e-12);
    assert_eq!(system.provenance.replicas, [2, 1, 3]);
}

#[test]
fn square_cells_stay_flat() {
    let mut rng = RngHandle::from_seed(0);
    let system = UnitCell::square()
        .to_system(&GenerateOptions::replicas(3), &mut rng)
        .unwrap();
    assert!(system.sim_box.is_2d());
    assert_eq!(system.len(), 9);
    assert_eq!(system.provenance.replicas, [3, 3, 1]);
    assert!(system.positions.iter().all(|p| p.z == 0.0));
}

#[test]
fn square_noise_keeps_z_and_wraps_into_the_box() {
    let options = GenerateOptions::replicas(4).with_sigma_noise(0.4);
    let system = generate_system(&UnitCell::square(), &options, 17).unwrap();
    assert_eq!(system.len(), 16);
    for p in &system.positions {
        assert_eq!(p.z, 0.0);
        let f = system.sim_box.make_fractional(p);
        assert!((0.0..1.0).contains(&f.x), "{f:?}");
        assert!((0.0..1.0).contains(&f.y), "{f:?}");
    }
}

#[test]
fn noisy_cubic_systems_stay_inside_the_box() {
    let options = GenerateOptions::replicas(2).with_sigma_noise(-0.3);
    let system = generate_system(&UnitCell::fcc(), &options, 5).unwrap();
    assert_eq!(system.len(), 32);
    for p in &system.positions {
        let f = system.sim_box.make_fractional(p);
        for value in f.iter() {
            assert!((0.0..1.0).contains(value), "{f:?}");
        }
    }
}

#[test]
fn out_of_plane_replicas_fail_for_2d_cells() {
    let mut rng = RngHandle::from_seed(0);
    let err = UnitCell::square()
        .to_system(&GenerateOptions::replicas((2, 2, 2)), &mut rng)
        .unwrap_err();
    assert_eq!(err.code(), "replicas-2d");
}

#[test]
fn invalid_scale_and_sigma_are_rejected() {
    let mut rng = RngHandle::from_seed(0);
    let cell = UnitCell::sc();
    for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = cell
            .to_system(&GenerateOptions::default().with_scale(scale), &mut rng)
            .unwrap_err();
        assert_eq!(err.code(), "scale-invalid");
    }
    let err = cell
        .to_system(
            &GenerateOptions::default().with_sigma_noise(f64::NAN),
            &mut rng,
        )
        .unwrap_err();
    assert_eq!(err.code(), "sigma-invalid");
}

#[test]
fn oversized_replica_grids_fail_cleanly() {
    let mut rng = RngHandle::from_seed(0);
    let cell = UnitCell::sc();
    for options in [
        GenerateOptions::replicas(3_000_000),
        GenerateOptions::replicas(2_000_000),
        GenerateOptions::replicas([u32::MAX, u32::MAX, u32::MAX]),
        GenerateOptions::replicas([2048, 1024, 1024]),
    ] {
        let err = cell.to_system(&options, &mut rng).unwrap_err();
        assert_eq!(err.code(), "replicas-too-many");
    }
    let err = UnitCell::fcc()
        .to_system(&GenerateOptions::replicas([1024, 1024, 256]), &mut rng)
        .unwrap_err();
    assert_eq!(err.info().context.get("basis").map(String::as_str), Some("4"));
}

#[test]
fn empty_basis_yields_no_positions() {
    let cell = UnitCell::new(2.0, Vec::new()).unwrap();
    let system = generate_system(&cell, &GenerateOptions::replicas(3), 0).unwrap();
    assert!(system.is_empty());
    assert!(approx(system.sim_box.lengths().x, 6.0));
}

#[test]
fn same_seed_reproduces_the_same_system() {
    let options = GenerateOptions::replicas(3).with_sigma_noise(0.05);
    let a = generate_system(&UnitCell::fcc(), &options, 42).unwrap();
    let b = generate_system(&UnitCell::fcc(), &options, 42).unwrap();
    let c = generate_system(&UnitCell::fcc(), &options, 43).unwrap();
    assert_eq!(a, b);
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
    assert_ne!(canonical_hash(&a), canonical_hash(&c));
    assert_eq!(a.provenance.seed, Some(42));
}

#[test]
fn substreams_give_independent_reproducible_samples() {
    let options = GenerateOptions::replicas(2).with_sigma_noise(0.1);
    let cell = UnitCell::bcc();
    let first = generate_system_stream(&cell, &options, 42, 0).unwrap();
    let again = generate_system_stream(&cell, &options, 42, 0).unwrap();
    let second = generate_system_stream(&cell, &options, 42, 1).unwrap();
    assert_eq!(first, again);
    assert_ne!(first.positions, second.positions);
    assert_eq!(first.provenance.seed, Some(42));
    assert_eq!(first.provenance.stream, Some(0));

    let direct = generate_system(&cell, &options, derive_substream_seed(42, 1)).unwrap();
    assert_eq!(direct.positions, second.positions);
    assert_eq!(direct.provenance.stream, None);
}

#[test]
fn zero_noise_ignores_the_rng() {
    let options = GenerateOptions::replicas(2);
    let a = generate_system(&UnitCell::bcc(), &options, 1).unwrap();
    let b = generate_system(&UnitCell::bcc(), &options, 2).unwrap();
    assert_eq!(a.positions, b.positions);
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
}

#[test]
fn positions_array_is_n_by_three() {
    let system = generate_system(&UnitCell::fcc(), &GenerateOptions::replicas(2), 0).unwrap();
    let array = system.positions_array().unwrap();
    assert_eq!(array.shape(), &[32, 3]);
    assert_eq!(array[[0, 0]], system.positions[0].x as f32);
}

proptest! {
    #[test]
    fn particle_count_matches_replica_grid(
        nx in 1u32..4,
        ny in 1u32..4,
        nz in 1u32..4,
        scale in 0.25f64..3.0,
    ) {
        let options = GenerateOptions {
            num_replicas: ReplicaCount::PerAxis([nx, ny, nz]),
            scale,
            sigma_noise: 0.0,
        };
        let system = generate_system(&UnitCell::fcc(), &options, 0).unwrap();
        prop_assert_eq!(system.len(), (nx * ny * nz * 4) as usize);
        let lengths = system.sim_box.lengths();
        prop_assert!((lengths.x - nx as f64 * scale).abs() < 1e-9);
        prop_assert!((lengths.y - ny as f64 * scale).abs() < 1e-9);
        prop_assert!((lengths.z - nz as f64 * scale).abs() < 1e-9);
    }
}
