use crate::error::{PsiInitError, Result};
use crate::orbfile;
use crate::wire::{WireReader, WireWriter};
use dwmpi::Comm;

/// What the stored amplitudes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialKind {
    /// chi(r) itself, as in numerical atomic orbital files
    Chi,
    /// u(r) = r chi(r), as in pseudopotential files
    RChi,
}

/// One radial function on its own grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialOrbital {
    l: usize,
    zeta: usize,
    rgrid: Vec<f64>,
    chi: Vec<f64>,
}

impl RadialOrbital {
    /// The grid must be strictly increasing with at least two points.
    pub fn new(l: usize, zeta: usize, rgrid: Vec<f64>, chi: Vec<f64>) -> Result<RadialOrbital> {
        if rgrid.len() != chi.len() {
            return Err(PsiInitError::Dimension(format!(
                "orbital l = {} zeta = {} has {} grid points but {} amplitudes",
                l,
                zeta,
                rgrid.len(),
                chi.len()
            )));
        }

        if rgrid.len() < 2 {
            return Err(PsiInitError::Value(format!(
                "orbital l = {} zeta = {} needs at least 2 grid points, got {}",
                l,
                zeta,
                rgrid.len()
            )));
        }

        if let Some(i) = rgrid.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(PsiInitError::Value(format!(
                "orbital l = {} zeta = {}: radial grid not strictly increasing at point {}",
                l,
                zeta,
                i + 1
            )));
        }

        Ok(RadialOrbital {
            l,
            zeta,
            rgrid,
            chi,
        })
    }

    pub fn get_l(&self) -> usize {
        self.l
    }

    pub fn get_zeta(&self) -> usize {
        self.zeta
    }

    pub fn get_rgrid(&self) -> &[f64] {
        &self.rgrid
    }

    pub fn get_chi(&self) -> &[f64] {
        &self.chi
    }

    pub fn get_nr(&self) -> usize {
        self.rgrid.len()
    }

    /// integral of r^2 chi^2 dr
    pub fn norm2(&self, kind: RadialKind) -> f64 {
        let y: Vec<f64> = match kind {
            RadialKind::Chi => self
                .rgrid
                .iter()
                .zip(self.chi.iter())
                .map(|(r, c)| r * r * c * c)
                .collect(),
            RadialKind::RChi => self.chi.iter().map(|u| u * u).collect(),
        };

        crate::radtab::integrate(&y, &self.rgrid)
    }

    fn scale(&mut self, f: f64) {
        self.chi.iter_mut().for_each(|c| *c *= f);
    }
}

/// The radial orbitals of one atom type, ordered by l then zeta.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomOrbitals {
    species: String,
    element: String,
    file: String,
    orbitals: Vec<RadialOrbital>,
}

impl AtomOrbitals {
    /// Orbitals are sorted by (l, zeta); for each l the zetas must be 0, 1, ...
    pub fn new(
        species: &str,
        element: &str,
        file: &str,
        mut orbitals: Vec<RadialOrbital>,
    ) -> Result<AtomOrbitals> {
        orbitals.sort_by_key(|o| (o.l, o.zeta));

        let mut expected = (usize::MAX, 0);

        for o in orbitals.iter() {
            let want = if o.l == expected.0 { expected.1 + 1 } else { 0 };

            if o.zeta != want {
                return Err(PsiInitError::Value(format!(
                    "species '{}': zeta indices of l = {} are not 0, 1, ... (found {})",
                    species, o.l, o.zeta
                )));
            }

            expected = (o.l, o.zeta);
        }

        Ok(AtomOrbitals {
            species: species.to_string(),
            element: element.to_string(),
            file: file.to_string(),
            orbitals,
        })
    }

    pub fn get_species(&self) -> &str {
        &self.species
    }

    pub fn get_element(&self) -> &str {
        &self.element
    }

    pub fn get_file(&self) -> &str {
        &self.file
    }

    pub fn get_orbitals(&self) -> &[RadialOrbital] {
        &self.orbitals
    }

    pub fn get_n_orbitals(&self) -> usize {
        self.orbitals.len()
    }

    pub fn get_lmax(&self) -> Option<usize> {
        self.orbitals.iter().map(|o| o.l).max()
    }

    pub fn get_nzeta(&self, l: usize) -> usize {
        self.orbitals.iter().filter(|o| o.l == l).count()
    }
}

/// Radial orbitals of every atom type, in type order.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialOrbitalStore {
    kind: RadialKind,
    types: Vec<AtomOrbitals>,
}

impl RadialOrbitalStore {
    pub fn from_tables(kind: RadialKind, types: Vec<AtomOrbitals>) -> Result<RadialOrbitalStore> {
        for (i, t) in types.iter().enumerate() {
            if types[..i].iter().any(|u| u.species == t.species) {
                return Err(PsiInitError::Value(format!(
                    "species '{}' appears twice",
                    t.species
                )));
            }
        }

        Ok(RadialOrbitalStore { kind, types })
    }

    /// Reads one orbital file per `(species, path)` on rank `root`, then
    /// broadcasts the tables (or the error) so every rank ends up with the
    /// same result.
    pub fn load(
        orbital_files: &[(String, String)],
        normalize: bool,
        comm: &dyn Comm,
        root: usize,
    ) -> Result<RadialOrbitalStore> {
        let mut parsed = None;

        if comm.rank() == root {
            parsed = Some(RadialOrbitalStore::read_files(orbital_files, normalize));
        }

        RadialOrbitalStore::bcast_result(parsed, comm, root)
    }

    fn read_files(orbital_files: &[(String, String)], normalize: bool) -> Result<RadialOrbitalStore> {
        let mut types = Vec::with_capacity(orbital_files.len());

        for (species, path) in orbital_files.iter() {
            let atom = orbfile::read_orb_file(species, path)?;

            log::info!(
                "orbital file '{}' for {}: {} radial functions, lmax = {}",
                path,
                species,
                atom.get_n_orbitals(),
                atom.get_lmax().unwrap_or(0)
            );

            types.push(atom);
        }

        let mut store = RadialOrbitalStore::from_tables(RadialKind::Chi, types)?;

        if normalize {
            store.normalize()?;
        }

        Ok(store)
    }

    /// Replicates `Some(result)` held by `root` onto every rank; the other
    /// ranks pass `None`.
    pub fn bcast_result(
        result: Option<Result<RadialOrbitalStore>>,
        comm: &dyn Comm,
        root: usize,
    ) -> Result<RadialOrbitalStore> {
        let mut bytes = Vec::new();

        if comm.rank() == root {
            let mut w = WireWriter::new();

            let result = result.unwrap_or_else(|| {
                Err(PsiInitError::Comm(
                    "root rank holds no radial tables to broadcast".to_string(),
                ))
            });

            match result {
                Ok(store) => {
                    w.put_u8(0);
                    store.write(&mut w);
                }

                Err(e) => {
                    w.put_u8(1);
                    w.put_error(&e);
                }
            }

            bytes = w.into_bytes();
        }

        comm.bcast_bytes(&mut bytes, root)?;

        let mut r = WireReader::new(&bytes);

        match r.get_u8()? {
            0 => RadialOrbitalStore::read(&mut r),

            _ => Err(r.get_error()?),
        }
    }

    /// Flat byte image, identical on every rank after a broadcast.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();

        self.write(&mut w);

        w.into_bytes()
    }

    fn write(&self, w: &mut WireWriter) {
        w.put_u8(match self.kind {
            RadialKind::Chi => 0,
            RadialKind::RChi => 1,
        });

        w.put_usize(self.types.len());

        for t in self.types.iter() {
            w.put_str(&t.species);
            w.put_str(&t.element);
            w.put_str(&t.file);
            w.put_usize(t.orbitals.len());

            for o in t.orbitals.iter() {
                w.put_usize(o.l);
                w.put_usize(o.zeta);
                w.put_f64s(&o.rgrid);
                w.put_f64s(&o.chi);
            }
        }
    }

    fn read(r: &mut WireReader) -> Result<RadialOrbitalStore> {
        let kind = match r.get_u8()? {
            0 => RadialKind::Chi,
            _ => RadialKind::RChi,
        };

        let ntype = r.get_usize()?;

        let mut types = Vec::new();

        for _ in 0..ntype {
            let species = r.get_str()?;
            let element = r.get_str()?;
            let file = r.get_str()?;
            let norb = r.get_usize()?;

            let mut orbitals = Vec::new();

            for _ in 0..norb {
                let l = r.get_usize()?;
                let zeta = r.get_usize()?;
                let rgrid = r.get_f64s()?;
                let chi = r.get_f64s()?;

                orbitals.push(RadialOrbital {
                    l,
                    zeta,
                    rgrid,
                    chi,
                });
            }

            types.push(AtomOrbitals {
                species,
                element,
                file,
                orbitals,
            });
        }

        if !r.is_empty() {
            return Err(PsiInitError::Comm(
                "trailing bytes after broadcast radial tables".to_string(),
            ));
        }

        Ok(RadialOrbitalStore { kind, types })
    }

    /// Scales every orbital so that its r^2 chi^2 integral is one.
    pub fn normalize(&mut self) -> Result<()> {
        let kind = self.kind;

        for t in self.types.iter_mut() {
            for o in t.orbitals.iter_mut() {
                let n2 = o.norm2(kind);

                if !(n2 > 0.0) {
                    return Err(PsiInitError::Value(format!(
                        "species '{}' orbital l = {} zeta = {} has zero norm",
                        t.species, o.l, o.zeta
                    )));
                }

                o.scale(1.0 / n2.sqrt());
            }
        }

        Ok(())
    }

    pub fn get_kind(&self) -> RadialKind {
        self.kind
    }

    pub fn get_n_types(&self) -> usize {
        self.types.len()
    }

    pub fn get_types(&self) -> &[AtomOrbitals] {
        &self.types
    }

    pub fn type_index(&self, species: &str) -> Option<usize> {
        self.types.iter().position(|t| t.species == species)
    }

    pub fn get_type(&self, it: usize) -> Result<&AtomOrbitals> {
        self.types.get(it).ok_or_else(|| {
            PsiInitError::Key(format!(
                "atom type {} out of range, {} types loaded",
                it,
                self.types.len()
            ))
        })
    }

    pub fn get_orbital(&self, it: usize, ichi: usize) -> Result<&RadialOrbital> {
        let t = self.get_type(it)?;

        t.orbitals.get(ichi).ok_or_else(|| {
            PsiInitError::Key(format!(
                "species '{}' has {} radial functions, index {} requested",
                t.species,
                t.orbitals.len(),
                ichi
            ))
        })
    }

    /// Orbital file paths in type order.
    pub fn external_orbs(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.file.as_str()).collect()
    }

    /// Grid sizes, [itype][ichi].
    pub fn nr(&self) -> Vec<Vec<usize>> {
        self.types
            .iter()
            .map(|t| t.orbitals.iter().map(|o| o.get_nr()).collect())
            .collect()
    }

    pub fn nr_of_type(&self, it: usize) -> Result<Vec<usize>> {
        Ok(self
            .get_type(it)?
            .orbitals
            .iter()
            .map(|o| o.get_nr())
            .collect())
    }

    pub fn nr_of(&self, it: usize, ichi: usize) -> Result<usize> {
        Ok(self.get_orbital(it, ichi)?.get_nr())
    }

    pub fn chi(&self, it: usize, ichi: usize) -> Result<&[f64]> {
        Ok(self.get_orbital(it, ichi)?.get_chi())
    }

    pub fn chi_at(&self, it: usize, ichi: usize, ir: usize) -> Result<f64> {
        let chi = self.chi(it, ichi)?;

        chi.get(ir).copied().ok_or_else(|| {
            PsiInitError::Key(format!(
                "radial point {} out of range for type {} orbital {} ({} points)",
                ir,
                it,
                ichi,
                chi.len()
            ))
        })
    }

    pub fn rgrid(&self, it: usize, ichi: usize) -> Result<&[f64]> {
        Ok(self.get_orbital(it, ichi)?.get_rgrid())
    }

    pub fn rgrid_at(&self, it: usize, ichi: usize, ir: usize) -> Result<f64> {
        let r = self.rgrid(it, ichi)?;

        r.get(ir).copied().ok_or_else(|| {
            PsiInitError::Key(format!(
                "radial point {} out of range for type {} orbital {} ({} points)",
                ir,
                it,
                ichi,
                r.len()
            ))
        })
    }

    pub fn element(&self, it: usize) -> Result<&str> {
        Ok(self.get_type(it)?.get_element())
    }

    pub fn lmax(&self, it: usize) -> Result<usize> {
        Ok(self.get_type(it)?.get_lmax().unwrap_or(0))
    }

    pub fn nzeta(&self, it: usize, l: usize) -> Result<usize> {
        Ok(self.get_type(it)?.get_nzeta(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwmpi::SerialComm;

    fn grid(n: usize, dr: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dr).collect()
    }

    fn gaussian_store() -> RadialOrbitalStore {
        let r = grid(801, 0.01);
        let s: Vec<f64> = r.iter().map(|r| 2.0 * (-r * r).exp()).collect();
        let p: Vec<f64> = r.iter().map(|r| r * (-r * r).exp()).collect();

        let si = AtomOrbitals::new(
            "Si",
            "Si",
            "Si.orb",
            vec![
                RadialOrbital::new(1, 0, r.clone(), p).unwrap(),
                RadialOrbital::new(0, 0, r.clone(), s).unwrap(),
            ],
        )
        .unwrap();

        RadialOrbitalStore::from_tables(RadialKind::Chi, vec![si]).unwrap()
    }

    #[test]
    fn test_orbitals_are_sorted_and_counted() {
        let store = gaussian_store();

        assert_eq!(store.get_orbital(0, 0).unwrap().get_l(), 0);
        assert_eq!(store.get_orbital(0, 1).unwrap().get_l(), 1);
        assert_eq!(store.lmax(0).unwrap(), 1);
        assert_eq!(store.nzeta(0, 1).unwrap(), 1);
        assert_eq!(store.nzeta(0, 2).unwrap(), 0);
        assert_eq!(store.nr(), vec![vec![801, 801]]);
        assert_eq!(store.nr_of(0, 1).unwrap(), 801);
        assert_eq!(store.external_orbs(), vec!["Si.orb"]);
        assert!((store.rgrid_at(0, 0, 3).unwrap() - 0.03).abs() < 1.0e-15);
        assert!((store.chi_at(0, 0, 0).unwrap() - 2.0).abs() < 1.0e-15);

        assert!(matches!(store.get_orbital(0, 2), Err(PsiInitError::Key(_))));
        assert!(matches!(store.chi_at(0, 0, 801), Err(PsiInitError::Key(_))));
        assert!(matches!(store.element(1), Err(PsiInitError::Key(_))));
    }

    #[test]
    fn test_invalid_orbitals() {
        assert!(matches!(
            RadialOrbital::new(0, 0, vec![0.0, 0.1, 0.1], vec![1.0; 3]),
            Err(PsiInitError::Value(_))
        ));

        assert!(matches!(
            RadialOrbital::new(0, 0, vec![0.0, 0.1], vec![1.0; 3]),
            Err(PsiInitError::Dimension(_))
        ));

        assert!(matches!(
            RadialOrbital::new(0, 0, vec![0.0], vec![1.0]),
            Err(PsiInitError::Value(_))
        ));

        let r = grid(5, 0.1);
        let orbs = vec![
            RadialOrbital::new(0, 0, r.clone(), vec![1.0; 5]).unwrap(),
            RadialOrbital::new(0, 2, r.clone(), vec![1.0; 5]).unwrap(),
        ];
        assert!(matches!(
            AtomOrbitals::new("O", "O", "O.orb", orbs),
            Err(PsiInitError::Value(_))
        ));
    }

    #[test]
    fn test_normalize() {
        let mut store = gaussian_store();

        store.normalize().unwrap();

        for o in store.get_types()[0].get_orbitals() {
            assert!((o.norm2(RadialKind::Chi) - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_bytes_round_trip_through_serial_broadcast() {
        let store = gaussian_store();
        let bytes = store.to_bytes();

        let copy = RadialOrbitalStore::bcast_result(Some(Ok(store.clone())), &SerialComm, 0).unwrap();

        assert_eq!(copy, store);
        assert_eq!(copy.to_bytes(), bytes);
    }

    #[test]
    fn test_root_error_is_broadcast() {
        let err = PsiInitError::FileNotFound {
            path: "missing.orb".to_string(),
        };

        let got = RadialOrbitalStore::bcast_result(Some(Err(err.clone())), &SerialComm, 0);

        assert_eq!(got, Err(err));
    }
}
