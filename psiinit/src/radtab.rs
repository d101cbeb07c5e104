//! Reciprocal-space radial tables.
//!
//! For every radial function
//!
//!   F(q) = \int r^2 chi(r) j_l(q r) dr
//!
//! is sampled at q_i = i dq, i = 0 .. nq-1, on the function's own radial
//! grid (composite Simpson when the grid is uniform, trapezoid otherwise),
//! then fitted with a cubic spline. Beyond the last sample the last cubic
//! segment is continued.

use crate::error::{PsiInitError, Result};
use crate::orbital::{RadialKind, RadialOrbital, RadialOrbitalStore};
use crate::projmap::ProjectorIndexMap;
use cubspl::{BoundaryCondition, CubicSpline};
use rayon::prelude::*;

const PARALLEL_MIN_LEN: usize = 8192;

#[inline]
fn use_parallel_for_len(len: usize) -> bool {
    len >= PARALLEL_MIN_LEN && rayon::current_num_threads() > 1
}

const UNIFORM_GRID_TOL: f64 = 1.0e-8;

// per radial function; the default dq = 0.01 needs a few thousand
const MAX_Q_SAMPLES: usize = 1 << 20;

/// Quadrature on a radial grid.
pub fn integrate(y: &[f64], r: &[f64]) -> f64 {
    if integral::is_uniform(r, UNIFORM_GRID_TOL) && r.len() > 1 {
        integral::simpson(y, r[1] - r[0])
    } else {
        integral::trapezoid(y, r)
    }
}

/// The transform of one radial function at one q, straight from its grid.
pub fn direct_transform(orbital: &RadialOrbital, kind: RadialKind, q: f64) -> f64 {
    let l = orbital.get_l();
    let r = orbital.get_rgrid();
    let chi = orbital.get_chi();

    let y: Vec<f64> = r
        .iter()
        .zip(chi.iter())
        .map(|(&r, &c)| {
            let w = match kind {
                RadialKind::Chi => r * r * c,
                RadialKind::RChi => r * c,
            };

            w * special::spherical_bessel_jn(l, q * r)
        })
        .collect();

    integrate(&y, r)
}

pub struct RadialTransformTable {
    dq: f64,
    nq: usize,
    bc: BoundaryCondition,
    // [slot][iq], slot from ProjectorIndexMap::radial_slot
    samples: Vec<f64>,
    splines: Vec<CubicSpline>,
}

impl RadialTransformTable {
    /// Sizes the sample arena for every radial function of `map`; the table
    /// cannot be evaluated until `tabulate` has run.
    pub fn allocate_table(
        map: &ProjectorIndexMap,
        qmax: f64,
        dq: f64,
        bc: BoundaryCondition,
    ) -> Result<RadialTransformTable> {
        if !(dq > 0.0) || !(qmax > 0.0) {
            return Err(PsiInitError::Value(format!(
                "reciprocal-space table needs dq > 0 and qmax > 0, got dq = {} qmax = {}",
                dq, qmax
            )));
        }

        let nseg = (qmax / dq - dwconsts::EPS8).ceil().max(1.0);

        if !(nseg < MAX_Q_SAMPLES as f64) {
            return Err(PsiInitError::Value(format!(
                "qmax / dq = {} / {} asks for more than {} q samples",
                qmax, dq, MAX_Q_SAMPLES
            )));
        }

        // qmax/dq landing a hair above an integer must not add a sample
        let nq = nseg as usize + 1;

        let nslot = map.get_n_radial();

        log::debug!(
            "radial transform table: {} functions x {} q samples, dq = {}",
            nslot,
            nq,
            dq
        );

        Ok(RadialTransformTable {
            dq,
            nq,
            bc,
            samples: vec![0.0; nslot * nq],
            splines: Vec::new(),
        })
    }

    pub fn tabulate(&mut self, store: &RadialOrbitalStore, map: &ProjectorIndexMap) -> Result<()> {
        let kind = store.get_kind();

        let mut orbitals = Vec::with_capacity(map.get_n_radial());

        for (it, atom) in store.get_types().iter().enumerate() {
            for ichi in 0..atom.get_n_orbitals() {
                let slot = map.radial_slot(it, ichi)?;

                if slot != orbitals.len() {
                    return Err(PsiInitError::Dimension(format!(
                        "radial slot {} of type {} orbital {} is out of order",
                        slot, it, ichi
                    )));
                }

                orbitals.push(store.get_orbital(it, ichi)?);
            }
        }

        if orbitals.len() * self.nq != self.samples.len() {
            return Err(PsiInitError::Dimension(format!(
                "table allocated for {} radial functions, store holds {}",
                self.samples.len() / self.nq,
                orbitals.len()
            )));
        }

        let nq = self.nq;
        let dq = self.dq;

        let fill = |(slot, f): (usize, &mut [f64])| {
            for (iq, v) in f.iter_mut().enumerate() {
                *v = direct_transform(orbitals[slot], kind, iq as f64 * dq);
            }
        };

        let work = orbitals.iter().map(|o| o.get_nr()).sum::<usize>() * nq;

        if use_parallel_for_len(work) {
            self.samples.par_chunks_mut(nq).enumerate().for_each(fill);
        } else {
            self.samples.chunks_mut(nq).enumerate().for_each(fill);
        }

        let qgrid: Vec<f64> = (0..nq).map(|iq| iq as f64 * dq).collect();

        let mut splines = Vec::with_capacity(orbitals.len());

        for (slot, f) in self.samples.chunks(nq).enumerate() {
            let spl = CubicSpline::new(&qgrid, f, self.bc).map_err(|e| {
                let o = orbitals[slot];
                PsiInitError::Value(format!(
                    "spline of radial function l = {} zeta = {} (slot {}): {}",
                    o.get_l(),
                    o.get_zeta(),
                    slot,
                    e
                ))
            })?;

            splines.push(spl);
        }

        self.splines = splines;

        Ok(())
    }

    pub fn is_tabulated(&self) -> bool {
        !self.splines.is_empty() || self.samples.is_empty()
    }

    pub fn get_dq(&self) -> f64 {
        self.dq
    }

    pub fn get_nq(&self) -> usize {
        self.nq
    }

    pub fn get_qmax(&self) -> f64 {
        (self.nq - 1) as f64 * self.dq
    }

    /// Raw samples of one slot.
    pub fn get_samples(&self, slot: usize) -> Result<&[f64]> {
        self.check_slot(slot)?;

        Ok(&self.samples[slot * self.nq..(slot + 1) * self.nq])
    }

    fn check_slot(&self, slot: usize) -> Result<&CubicSpline> {
        if self.splines.is_empty() && !self.samples.is_empty() {
            return Err(PsiInitError::Key(
                "radial transform table evaluated before tabulation".to_string(),
            ));
        }

        self.splines.get(slot).ok_or_else(|| {
            PsiInitError::Key(format!(
                "radial slot {} out of range, {} tabulated",
                slot,
                self.splines.len()
            ))
        })
    }

    /// F(q) of one slot; q beyond qmax continues the last cubic segment.
    pub fn evaluate(&self, slot: usize, q: f64) -> Result<f64> {
        let spl = self.check_slot(slot)?;

        if !(q >= 0.0) {
            return Err(PsiInitError::Domain(format!(
                "radial table of slot {} evaluated at q = {}",
                slot, q
            )));
        }

        Ok(spl.eval(q))
    }

    pub fn evaluate_many(&self, slot: usize, q: &[f64], f: &mut [f64]) -> Result<()> {
        let spl = self.check_slot(slot)?;

        if q.len() != f.len() {
            return Err(PsiInitError::Dimension(format!(
                "{} q values for {} outputs",
                q.len(),
                f.len()
            )));
        }

        if let Some(bad) = q.iter().find(|&&x| !(x >= 0.0)) {
            return Err(PsiInitError::Domain(format!(
                "radial table of slot {} evaluated at q = {}",
                slot, bad
            )));
        }

        spl.eval_many(q, f);

        Ok(())
    }
}
