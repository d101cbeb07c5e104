use crate::block::WfcBlock;
use crate::error::{PsiInitError, Result};
use crate::PsiInitializer;
use control::Control;
use crystal::Crystal;
use dwmpi::Comm;
use fhkl::StructureFactor;
use gvector::GVector;
use pwbasis::PWBasis;
use rand::{rngs::StdRng, SeedableRng};
use types::c64;

// keeps the noise of the *+random flavors apart from the band filling
const MIX_STREAM: u64 = 1 << 32;

/// Damped random plane-wave amplitudes, reproducible per k-point.
///
/// The generator of a k-point is seeded with `seed + k_index`, so the
/// numbers do not depend on which rank handles the k-point. Seed 0 draws
/// from the operating system instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomFiller {
    seed: Option<u64>,
}

impl RandomFiller {
    pub fn new(seed: u64) -> RandomFiller {
        RandomFiller {
            seed: if seed == 0 { None } else { Some(seed) },
        }
    }

    fn rng_for(&self, ik: usize, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream).wrapping_add(ik as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Fills columns `from..ncol` and marks the whole block filled; returns
    /// the number of columns written.
    pub fn fill(&self, block: &mut WfcBlock, pwwfc: &PWBasis, from: usize) -> usize {
        let ncol = block.ncol();

        if from >= ncol {
            return 0;
        }

        let mut rng = self.rng_for(pwwfc.get_k_index(), 0);
        let kg = pwwfc.get_kg();

        for j in from..ncol {
            utility::make_damped_rand_vector(&mut rng, kg, block.column_mut(j));
        }

        block.set_nfilled(ncol);

        ncol - from
    }

    /// Adds `weight` times a normalized random vector to each filled column.
    pub fn mix(&self, block: &mut WfcBlock, pwwfc: &PWBasis, weight: f64) {
        let mut rng = self.rng_for(pwwfc.get_k_index(), MIX_STREAM);
        let kg = pwwfc.get_kg();

        let mut noise = vec![c64::new(0.0, 0.0); block.nrow()];

        for j in 0..block.nfilled() {
            utility::make_damped_rand_vector(&mut rng, kg, &mut noise);

            for (z, r) in block.column_mut(j).iter_mut().zip(noise.iter()) {
                *z += *r * weight;
            }
        }
    }
}

/// Every band random.
pub struct RandomInitializer {
    filler: RandomFiller,
}

impl RandomInitializer {
    pub fn new(control: &Control) -> RandomInitializer {
        RandomInitializer {
            filler: RandomFiller::new(control.get_random_seed()),
        }
    }
}

impl PsiInitializer for RandomInitializer {
    fn method(&self) -> &str {
        "random"
    }

    fn setup(&mut self, _crystal: &Crystal, _comm: &dyn Comm) -> Result<()> {
        Ok(())
    }

    fn project(
        &self,
        _gvec: &GVector,
        pwwfc: &PWBasis,
        _sfact: &dyn StructureFactor,
        _volume: f64,
        nband: usize,
    ) -> Result<WfcBlock> {
        let npw = pwwfc.get_n_plane_waves();

        if npw == 0 {
            return Err(PsiInitError::Dimension(format!(
                "k-point {} has no plane waves",
                pwwfc.get_k_index()
            )));
        }

        let mut block = WfcBlock::new(npw, nband);

        self.filler.fill(&mut block, pwwfc, 0);

        Ok(block)
    }
}
