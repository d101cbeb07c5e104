use crate::block::WfcBlock;
use crate::error::{PsiInitError, Result};
use crate::kpoint::{KPointProjector, TableParams};
use crate::orbital::RadialOrbitalStore;
use crate::random::RandomFiller;
use crate::PsiInitializer;
use control::Control;
use crystal::Crystal;
use dwmpi::{Comm, MPI_ROOT};
use fhkl::StructureFactor;
use gvector::GVector;
use pwbasis::PWBasis;

/// Pseudo-atomic wavefunctions, typically u(r) = r chi(r) on the logarithmic
/// grid of a pseudopotential file, one radial function per l.
pub struct AtomicInitializer {
    method: String,
    // only needed on the root rank; taken by setup
    tables: Option<RadialOrbitalStore>,
    params: TableParams,
    mix: Option<(RandomFiller, f64)>,
    projector: Option<KPointProjector>,
}

impl AtomicInitializer {
    pub fn new(control: &Control, tables: Option<RadialOrbitalStore>) -> Result<AtomicInitializer> {
        let method = control.get_init_wfc().to_string();

        let mix = if method.ends_with("+random") {
            Some((
                RandomFiller::new(control.get_random_seed()),
                control.get_random_mix(),
            ))
        } else {
            None
        };

        Ok(AtomicInitializer {
            method,
            tables,
            params: TableParams::from_control(control)?,
            mix,
            projector: None,
        })
    }

    pub fn get_projector(&self) -> Option<&KPointProjector> {
        self.projector.as_ref()
    }
}

fn check_one_zeta_per_l(store: &RadialOrbitalStore) -> Result<()> {
    for atom in store.get_types() {
        if let Some(o) = atom.get_orbitals().iter().find(|o| o.get_zeta() > 0) {
            return Err(PsiInitError::Value(format!(
                "species '{}': atomic wavefunctions carry one radial function per l, found a second one for l = {}",
                atom.get_species(),
                o.get_l()
            )));
        }
    }

    Ok(())
}

impl PsiInitializer for AtomicInitializer {
    fn method(&self) -> &str {
        &self.method
    }

    fn setup(&mut self, crystal: &Crystal, comm: &dyn Comm) -> Result<()> {
        let held = if comm.rank() == MPI_ROOT {
            Some(self.tables.take().ok_or_else(|| {
                PsiInitError::Config(
                    "init_wfc = atomic needs pseudo-atomic radial tables on the root rank".to_string(),
                )
            }))
        } else {
            None
        };

        let mut store = RadialOrbitalStore::bcast_result(held, comm, MPI_ROOT)?;

        check_one_zeta_per_l(&store)?;

        if self.params.normalize {
            store.normalize()?;
        }

        self.projector = Some(KPointProjector::setup(
            store,
            crystal.get_atom_species(),
            &self.params,
        )?);

        Ok(())
    }

    fn project(
        &self,
        gvec: &GVector,
        pwwfc: &PWBasis,
        sfact: &dyn StructureFactor,
        volume: f64,
        nband: usize,
    ) -> Result<WfcBlock> {
        let projector = self.projector.as_ref().ok_or_else(|| {
            PsiInitError::Key("atomic projection requested before setup".to_string())
        })?;

        let mut block = projector.project(gvec, pwwfc, sfact, volume, nband)?;

        if let Some((filler, weight)) = self.mix.as_ref() {
            filler.mix(&mut block, pwwfc, *weight);
        }

        Ok(block)
    }

    fn display(&self) {
        println!("   {:-^80}", " pseudo-atomic wavefunctions ");
        println!();

        if let Some(p) = self.projector.as_ref() {
            for atom in p.get_store().get_types() {
                println!(
                    "   {:<8} : {} radial functions, lmax = {}",
                    atom.get_species(),
                    atom.get_n_orbitals(),
                    atom.get_lmax().unwrap_or(0)
                );
            }

            println!();

            p.get_map().display();
        }
    }
}
