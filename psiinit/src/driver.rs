use crate::block::WfcStore;
use crate::error::{PsiInitError, Result};
use crate::random::RandomFiller;
use crate::wire::{WireReader, WireWriter};
use crate::PsiInitializer;
use control::Control;
use crystal::Crystal;
use dwmpi::{Comm, SerialComm};
use fhkl::{PhaseConvention, StructureFactor};
use gvector::GVector;
use kpts_distribution::KPartition;
use pwbasis::PWBasis;

/// What happened at one k-point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KPointReport {
    pub ik: usize,
    pub npw: usize,
    /// columns written by the initializer
    pub nprojected: usize,
    /// columns written by the random filler afterwards
    pub nrandom: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub method: String,
    pub kpoints: Vec<KPointReport>,
}

/// Runs one initializer over the k-points owned by this rank.
///
/// Setup (file reading, broadcast, tabulation) is collective and finishes on
/// every rank before any projection starts. After the owned k-points are
/// projected the ranks exchange their status: an error on any rank aborts the
/// whole initialization on every rank, each returning the same error, and
/// nothing is installed into the wavefunction store.
pub struct Orchestrator<'a> {
    comm: &'a dyn Comm,
    partition: KPartition,
    nband: usize,
    filler: Option<RandomFiller>,
    verbose: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(control: &Control, partition: KPartition, comm: &'a dyn Comm) -> Result<Orchestrator<'a>> {
        if partition.get_n_ranks() != comm.size() {
            return Err(PsiInitError::Dimension(format!(
                "k-point partition is for {} ranks, the world has {}",
                partition.get_n_ranks(),
                comm.size()
            )));
        }

        let filler = if control.get_fill_unprojected() {
            Some(RandomFiller::new(control.get_random_seed()))
        } else {
            None
        };

        Ok(Orchestrator {
            comm,
            partition,
            nband: control.get_nband(),
            filler,
            verbose: control.is_verbose(),
        })
    }

    pub fn get_partition(&self) -> &KPartition {
        &self.partition
    }

    /// `pwbases` is indexed by global k index and covers every k-point of the
    /// partition; only the owned entries are touched.
    pub fn initialize(
        &self,
        init: &mut dyn PsiInitializer,
        crystal: &Crystal,
        gvec: &GVector,
        pwbases: &[PWBasis],
        sfact: &dyn StructureFactor,
        wfc: &mut WfcStore,
    ) -> Result<InitReport> {
        if pwbases.len() != self.partition.get_n_kpoints() {
            return Err(PsiInitError::Dimension(format!(
                "{} plane-wave bases for {} k-points",
                pwbases.len(),
                self.partition.get_n_kpoints()
            )));
        }

        init.setup(crystal, self.comm)?;

        self.comm.barrier()?;

        if self.comm.is_root() && self.verbose {
            init.display();
        }

        let local = self.project_owned(init, gvec, pwbases, sfact, crystal.get_latt().volume());

        // a failure on any rank fails every rank, before anything is installed
        agree_on_status(self.comm, local.as_ref().err())?;

        let (blocks, kpoints) = local?;

        wfc.append(blocks);

        Ok(InitReport {
            method: init.method().to_string(),
            kpoints,
        })
    }

    fn project_owned(
        &self,
        init: &dyn PsiInitializer,
        gvec: &GVector,
        pwbases: &[PWBasis],
        sfact: &dyn StructureFactor,
        volume: f64,
    ) -> Result<(WfcStore, Vec<KPointReport>)> {
        let mut blocks = WfcStore::new();
        let mut kpoints = Vec::new();

        for ik in self.partition.get_k_range(self.comm.rank()) {
            let pwwfc = &pwbases[ik];

            let mut block = init.project(gvec, pwwfc, sfact, volume, self.nband)?;

            let nprojected = block.nfilled();

            let nrandom = match self.filler.as_ref() {
                Some(filler) => filler.fill(&mut block, pwwfc, nprojected),
                None => 0,
            };

            log::info!(
                "{} initial wavefunctions at k-point {}: {} plane waves, {} projected, {} random",
                init.method(),
                ik,
                block.nrow(),
                nprojected,
                nrandom
            );

            kpoints.push(KPointReport {
                ik,
                npw: block.nrow(),
                nprojected,
                nrandom,
            });

            blocks.insert(ik, block);
        }

        Ok((blocks, kpoints))
    }
}

/// Every rank publishes its status in rank order. All ranks return the error
/// of the lowest failing rank, or Ok when none failed.
fn agree_on_status(comm: &dyn Comm, local: Option<&PsiInitError>) -> Result<()> {
    let mut first = None;

    for root in 0..comm.size() {
        let mut bytes = Vec::new();

        if comm.rank() == root {
            let mut w = WireWriter::new();

            match local {
                None => w.put_u8(0),

                Some(e) => {
                    w.put_u8(1);
                    w.put_error(e);
                }
            }

            bytes = w.into_bytes();
        }

        comm.bcast_bytes(&mut bytes, root)?;

        let mut r = WireReader::new(&bytes);

        if r.get_u8()? != 0 {
            let e = r.get_error()?;

            if first.is_none() {
                log::warn!("initialization failed on rank {}: {}", root, e);
                first = Some(e);
            }
        }
    }

    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// One rank owning every k-point.
pub fn initialize_serial(
    control: &Control,
    init: &mut dyn PsiInitializer,
    crystal: &Crystal,
    gvec: &GVector,
    pwbases: &[PWBasis],
    sfact: &dyn StructureFactor,
    wfc: &mut WfcStore,
) -> Result<InitReport> {
    let comm = SerialComm;

    let orchestrator = Orchestrator::new(control, KPartition::single(pwbases.len()), &comm)?;

    orchestrator.initialize(init, crystal, gvec, pwbases, sfact, wfc)
}

pub fn phase_convention(control: &Control) -> Result<PhaseConvention> {
    PhaseConvention::from_str(control.get_phase_convention()).ok_or_else(|| {
        PsiInitError::Config(format!(
            "unknown phase convention '{}'",
            control.get_phase_convention()
        ))
    })
}
