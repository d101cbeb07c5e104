mod common;

use common::*;
use crystal::Crystal;
use cubspl::BoundaryCondition;
use dwmpi::SerialComm;
use fhkl::{PhaseConvention, FHKL};
use gvector::GVector;
use lattice::Lattice;
use psiinit::*;
use pwbasis::PWBasis;
use vector3::Vector3f64;

fn params(qmax: f64) -> TableParams {
    TableParams {
        qmax,
        dq: 0.01,
        bc: BoundaryCondition::Natural,
        normalize: false,
    }
}

fn load(files: &[(String, String)]) -> RadialOrbitalStore {
    RadialOrbitalStore::load(files, false, &SerialComm, 0).unwrap()
}

#[test]
fn test_two_types_s_and_p_give_eight_columns() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let crystal = two_species_crystal(10.0);
    let gvec = GVector::new(crystal.get_latt(), 8, 8, 8);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);

    let gindex: Vec<usize> = (0..10).collect();
    let pwwfc = PWBasis::from_gindex(Vector3f64::new(0.1, 0.05, 0.02), 0, &gindex, &gvec);

    let projector =
        KPointProjector::setup(load(&files), crystal.get_atom_species(), &params(5.0)).unwrap();

    let nband = 12;
    let block = projector
        .project(&gvec, &pwwfc, &sfact, crystal.get_latt().volume(), nband)
        .unwrap();

    assert_eq!(block.nrow(), 10);
    assert_eq!(block.ncol(), nband);
    assert_eq!(block.nfilled(), 8);
    assert_eq!(projector.get_map().total_count(), (1 + 3) + (1 + 3));

    for j in 0..8 {
        assert!(block.column_norm2(j) > 0.0, "column {} is empty", j);
    }

    for j in 8..nband {
        assert_eq!(block.column_norm2(j), 0.0);
    }
}

#[test]
fn test_fewer_bands_than_projectors_keeps_all_projectors() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let crystal = two_species_crystal(10.0);
    let gvec = GVector::new(crystal.get_latt(), 8, 8, 8);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);
    let pwwfc = PWBasis::new(Vector3f64::new(0.0, 0.1, 0.0), 0, 2.0, &gvec);

    let projector =
        KPointProjector::setup(load(&files), crystal.get_atom_species(), &params(3.0)).unwrap();

    let block = projector
        .project(&gvec, &pwwfc, &sfact, crystal.get_latt().volume(), 3)
        .unwrap();

    assert_eq!(block.ncol(), 8);
    assert_eq!(block.nfilled(), 8);
}

#[test]
fn test_coefficients_follow_the_projection_formula() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let crystal = two_species_crystal(9.0);
    let gvec = GVector::new(crystal.get_latt(), 8, 8, 8);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);
    let xk = Vector3f64::new(0.1, -0.05, 0.2);
    let pwwfc = PWBasis::new(xk, 0, 2.5, &gvec);

    let projector =
        KPointProjector::setup(load(&files), crystal.get_atom_species(), &params(3.0)).unwrap();

    let volume = crystal.get_latt().volume();
    let block = projector.project(&gvec, &pwwfc, &sfact, volume, 8).unwrap();

    let map = projector.get_map();
    let table = projector.get_table();
    let kg_cart = pwwfc.get_kg_cart(&gvec);
    let positions = crystal.get_atom_positions_cart();

    // atom B (iat 1), p orbital, m = 1
    let j = map.column_of(1, 1, 0, 1).unwrap();
    let slot = map.radial_slot(1, 1).unwrap();

    for (ig, kg) in kg_cart.iter().enumerate() {
        let q = kg.norm2();
        let f = table.evaluate(slot, q).unwrap();
        let y = special::real_spherical_harmonics(1, 1, *kg);
        let s = (-types::c64::new(0.0, 1.0) * kg.dot_product(&positions[1])).exp();

        let expected = dwconsts::FOURPI / volume.sqrt() * types::c64::new(0.0, 1.0) * f * y * s;

        assert!((block[[ig, j]] - expected).norm() < 1.0e-12);
    }
}

#[test]
fn test_norm_matches_real_space_normalization() {
    // isolated Gaussians in a big cell: sum over G of |c|^2 -> \int r^2 chi^2
    let dir = tempfile::tempdir().unwrap();
    let path = write_orb_file(dir.path(), "H.orb", "H", 0.01, &gaussian_sp_orbitals(1.0));
    let files = vec![("H".to_string(), path)];

    let alat = 15.0;
    let latt = Lattice::cubic(alat);
    let crystal = Crystal::new(latt, &["H"], &[Vector3f64::new(0.1, 0.2, 0.3)]);

    let ecut: f64 = 18.0;
    let gmax = (2.0 * ecut).sqrt();
    let gvec = GVector::for_cutoff(crystal.get_latt(), gmax + 0.2);
    let xk = Vector3f64::new(0.1, 0.05, 0.0);
    let pwwfc = PWBasis::new(xk, 0, ecut, &gvec);

    let store = load(&files);
    let expected: Vec<f64> = store.get_types()[0]
        .get_orbitals()
        .iter()
        .map(|o| o.norm2(RadialKind::Chi))
        .collect();

    let projector =
        KPointProjector::setup(store, crystal.get_atom_species(), &params(gmax + 0.04)).unwrap();

    let block = projector
        .project(&gvec, &pwwfc, &FHKL::new(&crystal, &gvec, PhaseConvention::KG), crystal.get_latt().volume(), 4)
        .unwrap();

    let map = projector.get_map();

    for (ichi, l) in [(0usize, 0usize), (1, 1)].iter() {
        for m in utility::get_quant_num_m(*l) {
            let j = map.column_of(0, *l, 0, m).unwrap();
            let norm = block.column_norm2(j);

            assert!(
                (norm - expected[*ichi]).abs() < 1.0e-3 * expected[*ichi],
                "l = {} m = {}: {} vs {}",
                l,
                m,
                norm,
                expected[*ichi]
            );
        }
    }
}

#[test]
fn test_gaussian_file_transforms_to_closed_form() {
    let alpha = 0.9;
    let dir = tempfile::tempdir().unwrap();
    let path = write_orb_file(dir.path(), "X.orb", "X", 0.01, &gaussian_sp_orbitals(alpha));
    let files = vec![("X".to_string(), path)];

    let projector =
        KPointProjector::setup(load(&files), &["X".to_string()], &params(6.0)).unwrap();

    let slot = projector.get_map().radial_slot(0, 0).unwrap();
    let table = projector.get_table();

    let norm = std::f64::consts::PI.sqrt() / (4.0 * alpha.powf(1.5));

    for k in 2..120 {
        let q = 0.05 * k as f64 + 0.001;
        let expected = norm * (-q * q / (4.0 * alpha)).exp();

        assert!((table.evaluate(slot, q).unwrap() - expected).abs() < 1.0e-8);
    }
}

#[test]
fn test_q_zero_equals_direct_transform_for_every_orbital() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());
    let store = load(&files);

    let projector = KPointProjector::setup(
        store.clone(),
        &["A".to_string(), "B".to_string()],
        &params(4.0),
    )
    .unwrap();

    for (it, atom) in store.get_types().iter().enumerate() {
        for (ichi, o) in atom.get_orbitals().iter().enumerate() {
            let slot = projector.get_map().radial_slot(it, ichi).unwrap();
            let direct = direct_transform(o, store.get_kind(), 0.0);

            assert!((projector.get_table().evaluate(slot, 0.0).unwrap() - direct).abs() < 1.0e-12);
        }
    }
}

#[test]
fn test_empty_basis_is_dimension_error() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let crystal = two_species_crystal(10.0);
    let gvec = GVector::new(crystal.get_latt(), 6, 6, 6);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);
    let pwwfc = PWBasis::from_gindex(Vector3f64::zeros(), 0, &[], &gvec);

    let projector =
        KPointProjector::setup(load(&files), crystal.get_atom_species(), &params(3.0)).unwrap();

    assert!(matches!(
        projector.project(&gvec, &pwwfc, &sfact, crystal.get_latt().volume(), 8),
        Err(PsiInitError::Dimension(_))
    ));
}

#[test]
fn test_atom_of_unknown_type_is_value_error() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let species = vec!["A".to_string(), "C".to_string()];

    assert!(matches!(
        KPointProjector::setup(load(&files), &species, &params(3.0)),
        Err(PsiInitError::Value(_))
    ));
}

#[test]
fn test_phase_conventions_agree_at_gamma() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let crystal = two_species_crystal(8.0);
    let gvec = GVector::new(crystal.get_latt(), 8, 8, 8);
    let pwwfc = PWBasis::new(Vector3f64::zeros(), 0, 3.0, &gvec);

    let projector =
        KPointProjector::setup(load(&files), crystal.get_atom_species(), &params(3.0)).unwrap();

    let volume = crystal.get_latt().volume();

    let a = projector
        .project(&gvec, &pwwfc, &FHKL::new(&crystal, &gvec, PhaseConvention::KG), volume, 8)
        .unwrap();
    let b = projector
        .project(&gvec, &pwwfc, &FHKL::new(&crystal, &gvec, PhaseConvention::G), volume, 8)
        .unwrap();

    for (x, y) in a.as_slice().iter().zip(b.as_slice().iter()) {
        assert!((x - y).norm() < 1.0e-12);
    }
}

#[test]
fn test_atomic_log_grid_matches_uniform_grid() {
    // u(r) = r chi(r) on a logarithmic grid, integrated with trapezoids
    let alpha = 1.0;

    let rlog: Vec<f64> = (0..7001).map(|i| 1.0e-5 * (0.002 * i as f64).exp()).collect();
    let u: Vec<f64> = rlog.iter().map(|&r| r * gaussian(alpha, 0, r)).collect();

    let atomic = RadialOrbitalStore::from_tables(
        RadialKind::RChi,
        vec![AtomOrbitals::new("H", "H", "H.upf", vec![RadialOrbital::new(0, 0, rlog, u).unwrap()]).unwrap()],
    )
    .unwrap();

    let runi: Vec<f64> = (0..1201).map(|i| i as f64 * 0.01).collect();
    let chi: Vec<f64> = runi.iter().map(|&r| gaussian(alpha, 0, r)).collect();

    let nao = RadialOrbitalStore::from_tables(
        RadialKind::Chi,
        vec![AtomOrbitals::new("H", "H", "H.orb", vec![RadialOrbital::new(0, 0, runi, chi).unwrap()]).unwrap()],
    )
    .unwrap();

    let species = vec!["H".to_string()];
    let pa = KPointProjector::setup(atomic, &species, &params(4.0)).unwrap();
    let pn = KPointProjector::setup(nao, &species, &params(4.0)).unwrap();

    for k in 0..40 {
        let q = 0.1 * k as f64;
        let fa = pa.get_table().evaluate(0, q).unwrap();
        let fn_ = pn.get_table().evaluate(0, q).unwrap();

        assert!((fa - fn_).abs() < 2.0e-5, "q = {}: {} vs {}", q, fa, fn_);
    }
}
