use crate::error::{PsiInitError, Result};
use crate::orbital::RadialOrbitalStore;

/// One projector column: which atom, which radial function, which m.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectorColumn {
    pub iat: usize,
    pub itype: usize,
    /// index of the radial function within its type (l, then zeta)
    pub ichi: usize,
    pub l: usize,
    pub zeta: usize,
    pub m: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeBlock {
    species: String,
    // (l, zeta) of each radial function, same order as the store
    channels: Vec<(usize, usize)>,
    // first local projector index of each channel
    channel_start: Vec<usize>,
    nproj: usize,
    // first slot of this type in the flat radial arena
    radial_offset: usize,
    // atoms of this type, in crystal order
    atoms: Vec<usize>,
}

/// Flat enumeration of projectors.
///
/// Within a type the order is l ascending, zeta ascending, m = -l ..= l.
/// Columns of the coefficient block run over types in type order, over the
/// atoms of each type in crystal order, then over the projectors of the
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectorIndexMap {
    types: Vec<TypeBlock>,
    // per atom, first column
    atom_offset: Vec<usize>,
    atom_type: Vec<usize>,
    columns: Vec<ProjectorColumn>,
    nradial: usize,
}

impl ProjectorIndexMap {
    /// `atom_species` gives the species label of every atom in crystal order.
    pub fn build(store: &RadialOrbitalStore, atom_species: &[String]) -> Result<ProjectorIndexMap> {
        let mut atom_type = Vec::with_capacity(atom_species.len());

        for (iat, sp) in atom_species.iter().enumerate() {
            let it = store.type_index(sp).ok_or_else(|| {
                PsiInitError::Value(format!(
                    "atom {} of species '{}' has no radial orbitals loaded",
                    iat, sp
                ))
            })?;

            atom_type.push(it);
        }

        let mut types = Vec::with_capacity(store.get_n_types());
        let mut nradial = 0;

        for (it, atom) in store.get_types().iter().enumerate() {
            let channels: Vec<(usize, usize)> = atom
                .get_orbitals()
                .iter()
                .map(|o| (o.get_l(), o.get_zeta()))
                .collect();

            let mut channel_start = Vec::with_capacity(channels.len());
            let mut nproj = 0;

            for (l, _) in channels.iter() {
                channel_start.push(nproj);
                nproj += 2 * l + 1;
            }

            let atoms = (0..atom_type.len()).filter(|&iat| atom_type[iat] == it).collect();

            types.push(TypeBlock {
                species: atom.get_species().to_string(),
                channels,
                channel_start,
                nproj,
                radial_offset: nradial,
                atoms,
            });

            nradial += atom.get_n_orbitals();
        }

        let mut atom_offset = vec![0; atom_type.len()];
        let mut columns = Vec::new();

        for (it, tb) in types.iter().enumerate() {
            for &iat in tb.atoms.iter() {
                atom_offset[iat] = columns.len();

                for (ichi, &(l, zeta)) in tb.channels.iter().enumerate() {
                    for m in utility::get_quant_num_m(l) {
                        columns.push(ProjectorColumn {
                            iat,
                            itype: it,
                            ichi,
                            l,
                            zeta,
                            m,
                        });
                    }
                }
            }
        }

        Ok(ProjectorIndexMap {
            types,
            atom_offset,
            atom_type,
            columns,
            nradial,
        })
    }

    fn get_block(&self, it: usize) -> Result<&TypeBlock> {
        self.types.get(it).ok_or_else(|| {
            PsiInitError::Key(format!(
                "atom type {} out of range, {} types enumerated",
                it,
                self.types.len()
            ))
        })
    }

    /// Index of (l, zeta, m) within the projectors of type `it`.
    pub fn index_of(&self, it: usize, l: usize, zeta: usize, m: i32) -> Result<usize> {
        let tb = self.get_block(it)?;

        let ichi = tb
            .channels
            .iter()
            .position(|&c| c == (l, zeta))
            .ok_or_else(|| {
                PsiInitError::Key(format!(
                    "species '{}' has no radial function l = {} zeta = {}",
                    tb.species, l, zeta
                ))
            })?;

        if m.unsigned_abs() as usize > l {
            return Err(PsiInitError::Key(format!(
                "m = {} out of range for l = {}",
                m, l
            )));
        }

        Ok(tb.channel_start[ichi] + (m + l as i32) as usize)
    }

    /// Column of (l, zeta, m) on atom `iat` in the coefficient block.
    pub fn column_of(&self, iat: usize, l: usize, zeta: usize, m: i32) -> Result<usize> {
        let it = *self.atom_type.get(iat).ok_or_else(|| {
            PsiInitError::Key(format!(
                "atom {} out of range, {} atoms enumerated",
                iat,
                self.atom_type.len()
            ))
        })?;

        Ok(self.atom_offset[iat] + self.index_of(it, l, zeta, m)?)
    }

    /// Projectors over all atoms.
    pub fn total_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get_columns(&self) -> &[ProjectorColumn] {
        &self.columns
    }

    pub fn get_n_types(&self) -> usize {
        self.types.len()
    }

    pub fn get_n_atoms(&self) -> usize {
        self.atom_type.len()
    }

    pub fn get_atom_type(&self, iat: usize) -> Option<usize> {
        self.atom_type.get(iat).copied()
    }

    /// Projectors of one atom of type `it`.
    pub fn get_n_proj_of_type(&self, it: usize) -> Result<usize> {
        Ok(self.get_block(it)?.nproj)
    }

    pub fn get_max_lmax(&self) -> usize {
        self.types
            .iter()
            .flat_map(|tb| tb.channels.iter().map(|c| c.0))
            .max()
            .unwrap_or(0)
    }

    /// Number of radial functions over all types.
    pub fn get_n_radial(&self) -> usize {
        self.nradial
    }

    /// Slot of radial function `ichi` of type `it` in the flat radial arena.
    pub fn radial_slot(&self, it: usize, ichi: usize) -> Result<usize> {
        let tb = self.get_block(it)?;

        if ichi >= tb.channels.len() {
            return Err(PsiInitError::Key(format!(
                "species '{}' has {} radial functions, index {} requested",
                tb.species,
                tb.channels.len(),
                ichi
            )));
        }

        Ok(tb.radial_offset + ichi)
    }

    pub fn display(&self) {
        println!("   {:-^80}", " projectors ");
        println!();

        println!(
            "   {:>6} {:>8} {:>6} {:>4} {:>4} {:>4} {:>8}",
            "column", "species", "atom", "l", "zeta", "m", "local"
        );

        for (j, c) in self.columns.iter().enumerate() {
            println!(
                "   {:>6} {:>8} {:>6} {:>4} {:>4} {:>4} {:>8}",
                j,
                self.types[c.itype].species,
                c.iat,
                c.l,
                c.zeta,
                c.m,
                j - self.atom_offset[c.iat]
            );
        }

        println!();
    }
}
