use crate::block::WfcBlock;
use crate::error::{PsiInitError, Result};
use crate::orbital::RadialOrbitalStore;
use crate::projmap::ProjectorIndexMap;
use crate::radtab::RadialTransformTable;
use control::Control;
use cubspl::BoundaryCondition;
use dwconsts::*;
use fhkl::StructureFactor;
use gvector::GVector;
use itertools::multizip;
use kgylm::KGYLM;
use pwbasis::PWBasis;
use rayon::prelude::*;
use types::c64;

const PARALLEL_MIN_LEN: usize = 8192;

#[inline]
fn use_parallel_for_len(len: usize) -> bool {
    len >= PARALLEL_MIN_LEN && rayon::current_num_threads() > 1
}

/// How the reciprocal-space tables are built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableParams {
    pub qmax: f64,
    pub dq: f64,
    pub bc: BoundaryCondition,
    pub normalize: bool,
}

impl TableParams {
    pub fn from_control(control: &Control) -> Result<TableParams> {
        let bc = BoundaryCondition::from_str(control.get_nao_spline_bc()).ok_or_else(|| {
            PsiInitError::Config(format!(
                "unknown spline boundary condition '{}'",
                control.get_nao_spline_bc()
            ))
        })?;

        Ok(TableParams {
            qmax: control.get_nao_qmax(),
            dq: control.get_nao_dq(),
            bc,
            normalize: control.get_nao_normalize(),
        })
    }
}

/// Projects radial functions onto the plane waves of one k-point:
///
///   c(G, j) = 4 pi / sqrt(Omega) i^l F(|k+G|) Y_lm(k+G) S_a(G)
///
/// with F from the radial table, real Y_lm and S_a from the structure-factor
/// provider. Column j runs over `ProjectorIndexMap::get_columns`.
pub struct KPointProjector {
    store: RadialOrbitalStore,
    table: RadialTransformTable,
    map: ProjectorIndexMap,
}

impl KPointProjector {
    /// Builds the index map for the atoms and tabulates every radial function.
    pub fn setup(
        store: RadialOrbitalStore,
        atom_species: &[String],
        params: &TableParams,
    ) -> Result<KPointProjector> {
        let map = ProjectorIndexMap::build(&store, atom_species)?;

        let mut table = RadialTransformTable::allocate_table(&map, params.qmax, params.dq, params.bc)?;

        table.tabulate(&store, &map)?;

        log::info!(
            "{} radial functions tabulated up to q = {:.3} bohr^-1, {} projectors over {} atoms",
            map.get_n_radial(),
            table.get_qmax(),
            map.total_count(),
            map.get_n_atoms()
        );

        Ok(KPointProjector { store, table, map })
    }

    pub fn get_store(&self) -> &RadialOrbitalStore {
        &self.store
    }

    pub fn get_table(&self) -> &RadialTransformTable {
        &self.table
    }

    pub fn get_map(&self) -> &ProjectorIndexMap {
        &self.map
    }

    /// Block of max(nband, projectors) columns; only the projector columns
    /// are written, `nfilled` reports how many.
    pub fn project(
        &self,
        gvec: &GVector,
        pwwfc: &PWBasis,
        sfact: &dyn StructureFactor,
        volume: f64,
        nband: usize,
    ) -> Result<WfcBlock> {
        let npw = pwwfc.get_n_plane_waves();
        let ik = pwwfc.get_k_index();

        if npw == 0 {
            return Err(PsiInitError::Dimension(format!(
                "k-point {} has no plane waves",
                ik
            )));
        }

        if !(volume > 0.0) {
            return Err(PsiInitError::Value(format!("cell volume {} is not positive", volume)));
        }

        let natoms = self.map.get_n_atoms();

        if sfact.get_n_atoms() != natoms {
            return Err(PsiInitError::Dimension(format!(
                "structure factors given for {} atoms, projectors built for {}",
                sfact.get_n_atoms(),
                natoms
            )));
        }

        // F(|k+G|) of every radial function

        let kg = pwwfc.get_kg();
        let nslot = self.map.get_n_radial();

        let mut radial = vec![0.0; nslot * npw];

        for (slot, f) in radial.chunks_mut(npw).enumerate() {
            self.table.evaluate_many(slot, kg, f)?;
        }

        let kgylm = KGYLM::new(self.map.get_max_lmax(), gvec, pwwfc);

        let mut phases = Vec::with_capacity(natoms);

        for iat in 0..natoms {
            let s = sfact.atom_phase(iat, pwwfc);

            if s.len() != npw {
                return Err(PsiInitError::Dimension(format!(
                    "structure factor of atom {} has {} entries for {} plane waves",
                    iat,
                    s.len(),
                    npw
                )));
            }

            phases.push(s);
        }

        let columns = self.map.get_columns();
        let nproj = columns.len();

        let mut slots = Vec::with_capacity(nproj);
        let mut ylms = Vec::with_capacity(nproj);

        for c in columns.iter() {
            slots.push(self.map.radial_slot(c.itype, c.ichi)?);

            ylms.push(kgylm.get_data(c.l, c.m).ok_or_else(|| {
                PsiInitError::Key(format!("no Y_lm tabulated for l = {} m = {}", c.l, c.m))
            })?);
        }

        let pref = FOURPI / volume.sqrt();

        let mut block = WfcBlock::new(npw, nband.max(nproj));

        let fill = |(j, col): (usize, &mut [c64])| {
            let c = &columns[j];

            let f = &radial[slots[j] * npw..(slots[j] + 1) * npw];

            let fac = i_pow(c.l) * pref;

            for (z, f, y, s) in multizip((col.iter_mut(), f.iter(), ylms[j].iter(), phases[c.iat].iter())) {
                *z = fac * (f * y) * s;
            }
        };

        let head = &mut block.as_mut_slice()[..npw * nproj];

        if use_parallel_for_len(npw * nproj) {
            head.par_chunks_mut(npw).enumerate().for_each(fill);
        } else {
            head.chunks_mut(npw).enumerate().for_each(fill);
        }

        block.set_nfilled(nproj);

        log::debug!(
            "k-point {}: {} plane waves, {} projector columns, {} bands left unfilled",
            ik,
            npw,
            nproj,
            block.ncol() - nproj
        );

        Ok(block)
    }
}
