use dwconsts::*;
use itertools::Itertools;
use lattice::Lattice;
use vector3::*;

/// Unit cell geometry: lattice vectors plus atoms given by species label and
/// fractional position.
#[derive(Debug, Default, Clone)]
pub struct Crystal {
    latt: Lattice,
    atom_positions: Vec<Vector3f64>,
    atom_species: Vec<String>,
    atom_indices_by_specie: Vec<Vec<usize>>,
}

impl Crystal {
    pub fn new(latt: Lattice, atom_species: &[&str], atom_positions: &[Vector3f64]) -> Crystal {
        assert_eq!(
            atom_species.len(),
            atom_positions.len(),
            "one species label per atom position"
        );

        let atom_species: Vec<String> = atom_species.iter().map(|s| s.to_string()).collect();

        let atom_indices_by_specie = atom_species
            .iter()
            .unique()
            .map(|sp| {
                atom_species
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| *s == sp)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        Crystal {
            latt,
            atom_positions: atom_positions.to_vec(),
            atom_species,
            atom_indices_by_specie,
        }
    }

    pub fn get_latt(&self) -> &Lattice {
        &self.latt
    }

    pub fn get_unique_species(&self) -> Vec<String> {
        // Preserve first-occurrence order while removing duplicates.
        self.atom_species.iter().unique().cloned().collect()
    }

    pub fn get_n_unique_species(&self) -> usize {
        self.atom_indices_by_specie.len()
    }

    pub fn get_atom_indices_of_specie(&self, isp: usize) -> &[usize] {
        &self.atom_indices_by_specie[isp]
    }

    pub fn get_n_atoms(&self) -> usize {
        self.atom_positions.len()
    }

    pub fn get_atom_species(&self) -> &[String] {
        &self.atom_species
    }

    pub fn get_atom_positions(&self) -> &[Vector3f64] {
        &self.atom_positions
    }

    pub fn get_atom_positions_cart(&self) -> Vec<Vector3f64> {
        self.atom_positions
            .iter()
            .map(|p| self.latt.frac_to_cart(*p))
            .collect()
    }

    pub fn display(&self) {
        println!("   {:-^88}", " crystal structure ");
        println!();

        for (name, v) in [
            ("a", self.latt.get_vector_a()),
            ("b", self.latt.get_vector_b()),
            ("c", self.latt.get_vector_c()),
        ] {
            println!(
                "   {} = {:20.12}  {:20.12}  {:20.12}",
                name,
                v.x * BOHR_TO_ANG,
                v.y * BOHR_TO_ANG,
                v.z * BOHR_TO_ANG
            );
        }

        println!();
        println!("   natoms = {}", self.get_n_atoms());
        println!();

        for (i, atom) in self.atom_positions.iter().enumerate() {
            println!(
                "   {:<3} {:>4} : {:16.12}  {:16.12}  {:16.12}",
                i + 1,
                self.atom_species[i],
                atom.x,
                atom.y,
                atom.z
            );
        }

        println!();
    }
}
