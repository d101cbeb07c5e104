//! Initial wavefunctions for the plane-wave solver.
//!
//! Radial orbitals are read once, Bessel-transformed into reciprocal-space
//! tables and projected onto the plane waves of every owned k-point:
//!
//! ```text
//! orbital files -> RadialOrbitalStore -> RadialTransformTable + ProjectorIndexMap
//!               -> KPointProjector (per k-point) -> WfcBlock
//! ```
//!
//! `Orchestrator` sequences the steps over the ranks of a `dwmpi::Comm`.

mod atomic;
mod block;
mod driver;
mod error;
mod kpoint;
mod nao;
mod orbfile;
mod orbital;
mod projmap;
mod radtab;
mod random;
mod wire;

pub use atomic::AtomicInitializer;
pub use block::{WfcBlock, WfcStore};
pub use driver::{initialize_serial, phase_convention, InitReport, KPointReport, Orchestrator};
pub use error::{PsiInitError, Result};
pub use kpoint::{KPointProjector, TableParams};
pub use nao::NaoInitializer;
pub use orbfile::{parse_orb, read_orb_file};
pub use orbital::{AtomOrbitals, RadialKind, RadialOrbital, RadialOrbitalStore};
pub use projmap::{ProjectorColumn, ProjectorIndexMap};
pub use radtab::{direct_transform, integrate, RadialTransformTable};
pub use random::{RandomFiller, RandomInitializer};

use control::Control;
use crystal::Crystal;
use dwmpi::Comm;
use fhkl::StructureFactor;
use gvector::GVector;
use pwbasis::PWBasis;

/// One way of producing initial wavefunctions.
pub trait PsiInitializer: Sync {
    /// "nao", "nao+random", "atomic", "atomic+random" or "random"
    fn method(&self) -> &str;

    /// One-time setup, collective over `comm`.
    fn setup(&mut self, crystal: &Crystal, comm: &dyn Comm) -> Result<()>;

    /// Coefficient block of one k-point with at least `nband` columns.
    fn project(
        &self,
        gvec: &GVector,
        pwwfc: &PWBasis,
        sfact: &dyn StructureFactor,
        volume: f64,
        nband: usize,
    ) -> Result<WfcBlock>;

    fn display(&self) {
        println!("   initial wavefunctions : {}", self.method());
    }
}

/// The initializer selected by `init_wfc`. The atomic flavors take their
/// radial tables from `atomic_tables`, which only the root rank needs.
pub fn new(control: &Control, atomic_tables: Option<RadialOrbitalStore>) -> Result<Box<dyn PsiInitializer>> {
    let init: Box<dyn PsiInitializer>;

    match control.get_init_wfc() {
        "nao" | "nao+random" => {
            init = Box::new(NaoInitializer::new(control)?);
        }

        "atomic" | "atomic+random" => {
            init = Box::new(AtomicInitializer::new(control, atomic_tables)?);
        }

        "random" => {
            init = Box::new(RandomInitializer::new(control));
        }

        other => {
            return Err(PsiInitError::Config(format!(
                "unknown init_wfc scheme '{}'",
                other
            )));
        }
    }

    Ok(init)
}
