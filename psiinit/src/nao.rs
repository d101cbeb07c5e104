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

/// Numerical atomic orbitals read from `.orb` files.
pub struct NaoInitializer {
    method: String,
    orbital_files: Vec<(String, String)>,
    params: TableParams,
    mix: Option<(RandomFiller, f64)>,
    projector: Option<KPointProjector>,
}

impl NaoInitializer {
    pub fn new(control: &Control) -> Result<NaoInitializer> {
        let orbital_files = control.get_orbital_files().to_vec();

        if orbital_files.is_empty() {
            return Err(PsiInitError::Config(
                "init_wfc = nao needs at least one 'orbital_file = <species> <path>'".to_string(),
            ));
        }

        let method = control.get_init_wfc().to_string();

        let mix = if method.ends_with("+random") {
            Some((
                RandomFiller::new(control.get_random_seed()),
                control.get_random_mix(),
            ))
        } else {
            None
        };

        Ok(NaoInitializer {
            method,
            orbital_files,
            params: TableParams::from_control(control)?,
            mix,
            projector: None,
        })
    }

    pub fn get_projector(&self) -> Option<&KPointProjector> {
        self.projector.as_ref()
    }

    pub fn get_store(&self) -> Option<&RadialOrbitalStore> {
        self.projector.as_ref().map(|p| p.get_store())
    }

    pub fn external_orbs(&self) -> Vec<&str> {
        self.orbital_files.iter().map(|(_, path)| path.as_str()).collect()
    }
}

impl PsiInitializer for NaoInitializer {
    fn method(&self) -> &str {
        &self.method
    }

    fn setup(&mut self, crystal: &Crystal, comm: &dyn Comm) -> Result<()> {
        let store =
            RadialOrbitalStore::load(&self.orbital_files, self.params.normalize, comm, MPI_ROOT)?;

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
            PsiInitError::Key("nao projection requested before setup".to_string())
        })?;

        let mut block = projector.project(gvec, pwwfc, sfact, volume, nband)?;

        if let Some((filler, weight)) = self.mix.as_ref() {
            filler.mix(&mut block, pwwfc, *weight);
        }

        Ok(block)
    }

    fn display(&self) {
        println!("   {:-^80}", " numerical atomic orbitals ");
        println!();

        for (species, path) in self.orbital_files.iter() {
            println!("   {:<8} : {}", species, path);
        }

        println!();

        if let Some(p) = self.projector.as_ref() {
            p.get_map().display();
        }
    }
}
