use crystal::Crystal;
use dwconsts::*;
use gvector::GVector;
use num_traits::Zero;
use pwbasis::PWBasis;
use types::c64;
use vector3::*;

/// Which wavevector enters the atomic phase factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseConvention {
    /// S = exp(-i (k+G) . tau), Bloch phase included
    KG,
    /// S = exp(-i G . tau)
    G,
}

impl PhaseConvention {
    pub fn from_str(s: &str) -> Option<PhaseConvention> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Some(PhaseConvention::KG),
            "g" => Some(PhaseConvention::G),
            _ => None,
        }
    }
}

/// Per-atom phase factors over the plane waves of one k-point.
pub trait StructureFactor: Sync {
    fn get_n_atoms(&self) -> usize;

    /// One value per plane wave of `pwwfc`, in basis order.
    fn atom_phase(&self, iat: usize, pwwfc: &PWBasis) -> Vec<c64>;
}

/// Structure factors computed directly from the crystal geometry.
pub struct FHKL<'a> {
    gvec: &'a GVector,
    atom_positions: Vec<Vector3f64>,
    atom_positions_cart: Vec<Vector3f64>,
    convention: PhaseConvention,
}

impl<'a> FHKL<'a> {
    pub fn new(crystal: &Crystal, gvec: &'a GVector, convention: PhaseConvention) -> FHKL<'a> {
        FHKL {
            gvec,
            atom_positions: crystal.get_atom_positions().to_vec(),
            atom_positions_cart: crystal.get_atom_positions_cart(),
            convention,
        }
    }
}

impl<'a> StructureFactor for FHKL<'a> {
    fn get_n_atoms(&self) -> usize {
        self.atom_positions.len()
    }

    fn atom_phase(&self, iat: usize, pwwfc: &PWBasis) -> Vec<c64> {
        match self.convention {
            PhaseConvention::G => compute_structure_factor_for_many_g_one_atom(
                self.gvec.get_miller(),
                pwwfc.get_gindex(),
                self.atom_positions[iat],
            ),

            PhaseConvention::KG => compute_structure_factor_for_many_kg_one_atom(
                &pwwfc.get_kg_cart(self.gvec),
                self.atom_positions_cart[iat],
            ),
        }
    }
}

/// Sum over all atoms of exp(-i 2 pi m . tau_frac).
pub fn compute_structure_factor(
    miller: &[Vector3i32],
    gindex: &[usize],
    atom_positions: &[Vector3f64],
) -> Vec<c64> {
    let mut sfact = vec![c64::zero(); gindex.len()];

    for at in atom_positions {
        let one = compute_structure_factor_for_many_g_one_atom(miller, gindex, *at);

        for (s, t) in sfact.iter_mut().zip(one) {
            *s += t;
        }
    }

    sfact
}

pub fn compute_structure_factor_for_many_g_one_atom(
    miller: &[Vector3i32],
    gindex: &[usize],
    atom_position: Vector3f64,
) -> Vec<c64> {
    gindex
        .iter()
        .map(|ig| {
            let gr = miller[*ig].to_f64().dot_product(&atom_position);

            (-I_C64 * TWOPI * gr).exp()
        })
        .collect()
}

pub fn compute_structure_factor_for_many_kg_one_atom(
    kg_cart: &[Vector3f64],
    atom_position_cart: Vector3f64,
) -> Vec<c64> {
    kg_cart
        .iter()
        .map(|kg| (-I_C64 * kg.dot_product(&atom_position_cart)).exp())
        .collect()
}
