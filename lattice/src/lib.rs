use vector3::*;

use std::{f64::consts, fmt};

/// Three cell vectors a, b, c in cartesian coordinates (bohr, or 1/bohr for
/// a reciprocal lattice).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lattice {
    a: Vector3f64,
    b: Vector3f64,
    c: Vector3f64,
}

impl Lattice {
    pub fn new(a: &[f64], b: &[f64], c: &[f64]) -> Lattice {
        Lattice {
            a: Vector3f64::new(a[0], a[1], a[2]),
            b: Vector3f64::new(b[0], b[1], b[2]),
            c: Vector3f64::new(c[0], c[1], c[2]),
        }
    }

    pub fn cubic(alat: f64) -> Lattice {
        Lattice::new(&[alat, 0.0, 0.0], &[0.0, alat, 0.0], &[0.0, 0.0, alat])
    }

    // ( a x b ) . c
    fn signed_volume(&self) -> f64 {
        self.a.cross_product(&self.b).dot_product(&self.c)
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    // ra = 2 x PI x (b x c) / volume
    // rb = 2 x PI x (c x a) / volume
    // rc = 2 x PI x (a x b) / volume
    pub fn reciprocal(&self) -> Lattice {
        let factor = 2.0 * consts::PI / self.signed_volume();

        Lattice {
            a: self.b.cross_product(&self.c) * factor,
            b: self.c.cross_product(&self.a) * factor,
            c: self.a.cross_product(&self.b) * factor,
        }
    }

    pub fn get_vector_a(&self) -> Vector3f64 {
        self.a
    }

    pub fn get_vector_b(&self) -> Vector3f64 {
        self.b
    }

    pub fn get_vector_c(&self) -> Vector3f64 {
        self.c
    }

    pub fn scaled_by(&mut self, f: f64) {
        self.a = self.a * f;
        self.b = self.b * f;
        self.c = self.c * f;
    }

    pub fn frac_to_cart(&self, pos_f: Vector3f64) -> Vector3f64 {
        self.a * pos_f.x + self.b * pos_f.y + self.c * pos_f.z
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (a, b, c) = (self.a, self.b, self.c);

        write!(f,
               "{}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}", "Lattice",
               a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z)
    }
}

#[test]
fn test_lattice_reciprocal_is_dual() {
    let latt = Lattice::new(&[1.0, 0.1, 0.0], &[0.0, 1.0, 0.2], &[0.0, 0.3, 1.0]);
    let blatt = latt.reciprocal();

    let real = [latt.get_vector_a(), latt.get_vector_b(), latt.get_vector_c()];
    let recip = [blatt.get_vector_a(), blatt.get_vector_b(), blatt.get_vector_c()];

    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j { 2.0 * consts::PI } else { 0.0 };
            assert!((real[i].dot_product(&recip[j]) - expected).abs() < 1.0e-12);
        }
    }
}

#[test]
fn test_lattice_volume_and_scaling() {
    let mut latt = Lattice::cubic(2.0);
    assert!((latt.volume() - 8.0).abs() < 1.0e-14);

    latt.scaled_by(0.5);
    assert!((latt.volume() - 1.0).abs() < 1.0e-14);

    let pos_c = latt.frac_to_cart(Vector3f64::new(0.5, 0.25, 0.0));
    assert_eq!(pos_c, Vector3f64::new(0.5, 0.25, 0.0));
}
