mod common;

use common::*;
use dwmpi::{Comm, ThreadComm};
use fhkl::{PhaseConvention, FHKL};
use gvector::GVector;
use kpts_distribution::KPartition;
use psiinit::*;

#[test]
fn test_every_rank_receives_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let serial = RadialOrbitalStore::load(&files, false, &dwmpi::SerialComm, 0).unwrap();

    let images = ThreadComm::run(3, |comm| {
        RadialOrbitalStore::load(&files, false, &comm, 0).map(|store| store.to_bytes())
    });

    for image in images {
        assert_eq!(image.unwrap(), serial.to_bytes());
    }
}

#[test]
fn test_missing_file_fails_on_every_rank() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = two_species_files(dir.path());

    let missing = dir.path().join("nowhere.orb").to_str().unwrap().to_string();
    files[1].1 = missing.clone();

    let results = ThreadComm::run(3, |comm| {
        let rank = comm.rank();
        (rank, RadialOrbitalStore::load(&files, false, &comm, 0))
    });

    for (rank, r) in results {
        match r {
            Err(PsiInitError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("rank {}: unexpected {:?}", rank, other),
        }
    }
}

fn run_nao(nrank: usize, nkpt: usize) -> Vec<WfcStore> {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let ecut = 3.0;
    let control = control("nao", &files, 12, ecut);

    let crystal = two_species_crystal(8.0);
    let gvec = GVector::new(crystal.get_latt(), 12, 12, 12);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);

    let mut pwbases = bases(&gvec, ecut);
    pwbases.truncate(nkpt);

    ThreadComm::run(nrank, |comm| {
        let mut init = psiinit::new(&control, None).unwrap();
        let mut wfc = WfcStore::new();

        let orchestrator = Orchestrator::new(&control, KPartition::new(nkpt, nrank), &comm).unwrap();

        orchestrator
            .initialize(init.as_mut(), &crystal, &gvec, &pwbases, &sfact, &mut wfc)
            .unwrap();

        wfc
    })
}

#[test]
fn test_ranks_together_reproduce_the_serial_run() {
    let serial = run_nao(1, 5).pop().unwrap();
    assert_eq!(serial.len(), 5);

    let per_rank = run_nao(3, 5);

    let partition = KPartition::new(5, 3);

    let mut merged = WfcStore::new();

    for (rank, wfc) in per_rank.into_iter().enumerate() {
        assert_eq!(wfc.k_indices(), partition.get_k_range(rank).collect::<Vec<usize>>());
        merged.append(wfc);
    }

    assert_eq!(merged, serial);
}

#[test]
fn test_ranks_without_kpoints_still_take_part() {
    let per_rank = run_nao(4, 2);

    assert_eq!(per_rank[0].k_indices(), vec![0]);
    assert_eq!(per_rank[1].k_indices(), vec![1]);
    assert!(per_rank[2].is_empty());
    assert!(per_rank[3].is_empty());

    let serial = run_nao(1, 2).pop().unwrap();

    let mut merged = WfcStore::new();
    for wfc in per_rank {
        merged.append(wfc);
    }

    assert_eq!(merged, serial);
}

#[test]
fn test_failure_on_one_rank_fails_every_rank() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_species_files(dir.path());

    let ecut = 3.0;
    let control = control("nao", &files, 12, ecut);

    let crystal = two_species_crystal(8.0);
    let gvec = GVector::new(crystal.get_latt(), 12, 12, 12);
    let sfact = FHKL::new(&crystal, &gvec, PhaseConvention::KG);

    let mut pwbases = bases(&gvec, ecut);
    pwbases.truncate(2);

    // k-point 1 belongs to rank 1
    pwbases[1] = pwbasis::PWBasis::from_gindex(pwbases[1].get_k_cart(), 1, &[], &gvec);

    let results = ThreadComm::run(2, |comm| {
        let mut init = psiinit::new(&control, None).unwrap();
        let mut wfc = WfcStore::new();

        let orchestrator = Orchestrator::new(&control, KPartition::new(2, 2), &comm).unwrap();

        let r = orchestrator.initialize(init.as_mut(), &crystal, &gvec, &pwbases, &sfact, &mut wfc);

        (r, wfc.len())
    });

    let errors: Vec<PsiInitError> = results
        .into_iter()
        .map(|(r, installed)| {
            assert_eq!(installed, 0);
            r.unwrap_err()
        })
        .collect();

    assert!(matches!(errors[0], PsiInitError::Dimension(_)));
    assert_eq!(errors[0], errors[1]);
}
