#![allow(dead_code)]

use control::Control;
use crystal::Crystal;
use gvector::GVector;
use lattice::Lattice;
use pwbasis::PWBasis;
use std::fmt::Write;
use std::path::Path;
use vector3::Vector3f64;

pub fn gaussian(alpha: f64, l: usize, r: f64) -> f64 {
    r.powi(l as i32) * (-alpha * r * r).exp()
}

/// Writes an orbital file with `(l, zeta, amplitudes)` records on the grid
/// r_i = i dr and returns its path.
pub fn write_orb_file(
    dir: &Path,
    name: &str,
    element: &str,
    dr: f64,
    orbitals: &[(usize, usize, Vec<f64>)],
) -> String {
    let mesh = orbitals.first().map(|o| o.2.len()).unwrap_or(0);
    let lmax = orbitals.iter().map(|o| o.0).max().unwrap_or(0);

    let mut s = String::new();

    writeln!(s, "---------------------------------------------------------------------------").unwrap();
    writeln!(s, "Element                     {}", element).unwrap();
    writeln!(s, "Energy Cutoff(Ry)           100").unwrap();
    writeln!(s, "Radius Cutoff(a.u.)         {}", (mesh as f64 - 1.0) * dr).unwrap();
    writeln!(s, "Lmax                        {}", lmax).unwrap();

    for (l, label) in ["S", "P", "D", "F"].iter().enumerate().take(lmax + 1) {
        let n = orbitals.iter().filter(|o| o.0 == l).count();
        writeln!(s, "Number of {}orbital-->       {}", label, n).unwrap();
    }

    writeln!(s, "---------------------------------------------------------------------------").unwrap();
    writeln!(s, "SUMMARY  END").unwrap();
    writeln!(s).unwrap();
    writeln!(s, "Mesh                        {}", mesh).unwrap();
    writeln!(s, "dr                          {}", dr).unwrap();

    for (l, zeta, chi) in orbitals.iter() {
        writeln!(s, "                Type                   L                   N").unwrap();
        writeln!(s, "                   0                   {}                   {}", l, zeta).unwrap();

        for (i, v) in chi.iter().enumerate() {
            write!(s, " {:.16e}", v).unwrap();
            if i % 4 == 3 {
                writeln!(s).unwrap();
            }
        }

        writeln!(s).unwrap();
    }

    let path = dir.join(name);
    std::fs::write(&path, s).unwrap();

    path.to_str().unwrap().to_string()
}

/// Gaussian s and p orbitals on a 0.01 bohr grid out to 12 bohr.
pub fn gaussian_sp_orbitals(alpha: f64) -> Vec<(usize, usize, Vec<f64>)> {
    let r: Vec<f64> = (0..1201).map(|i| i as f64 * 0.01).collect();

    vec![
        (0, 0, r.iter().map(|&r| gaussian(alpha, 0, r)).collect()),
        (1, 0, r.iter().map(|&r| gaussian(alpha, 1, r)).collect()),
    ]
}

/// Two species "A" and "B", each with one s and one p orbital.
pub fn two_species_files(dir: &Path) -> Vec<(String, String)> {
    let a = write_orb_file(dir, "A.orb", "A", 0.01, &gaussian_sp_orbitals(1.0));
    let b = write_orb_file(dir, "B.orb", "B", 0.01, &gaussian_sp_orbitals(0.7));

    vec![("A".to_string(), a), ("B".to_string(), b)]
}

pub fn two_species_crystal(alat: f64) -> Crystal {
    Crystal::new(
        Lattice::cubic(alat),
        &["A", "B"],
        &[Vector3f64::new(0.0, 0.0, 0.0), Vector3f64::new(0.5, 0.25, 0.5)],
    )
}

pub fn kpoints() -> Vec<Vector3f64> {
    vec![
        Vector3f64::new(0.0, 0.0, 0.0),
        Vector3f64::new(0.1, 0.0, 0.0),
        Vector3f64::new(0.1, 0.1, 0.0),
        Vector3f64::new(0.0, 0.2, 0.1),
        Vector3f64::new(-0.1, 0.05, 0.2),
    ]
}

pub fn bases(gvec: &GVector, ecut: f64) -> Vec<PWBasis> {
    kpoints()
        .into_iter()
        .enumerate()
        .map(|(ik, xk)| PWBasis::new(xk, ik, ecut, gvec))
        .collect()
}

pub fn control(init_wfc: &str, files: &[(String, String)], nband: usize, ecut: f64) -> Control {
    let mut control = Control::new();

    control.set_init_wfc(init_wfc).unwrap();
    control.set_nband(nband);
    control
        .parse_str(&format!("ecut_wfc = {}", ecut * dwconsts::HA_TO_EV))
        .unwrap();

    for (species, path) in files.iter() {
        control.add_orbital_file(species, path);
    }

    control
}
