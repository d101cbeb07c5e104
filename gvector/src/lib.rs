use itertools::multizip;
use lattice::Lattice;
use vector3::{Vector3f64, Vector3i32};

/// Reciprocal lattice vectors G on an n1 x n2 x n3 Miller box, ordered by |G|.
#[derive(Debug)]
pub struct GVector {
    miller: Vec<Vector3i32>,
    cart: Vec<Vector3f64>,
}

impl GVector {
    /// `latt` is the real-space lattice; the reciprocal one is built here.
    pub fn new(latt: &Lattice, n1: usize, n2: usize, n3: usize) -> GVector {
        let blatt = latt.reciprocal();

        let nsize = n1 * n2 * n3;

        let mut t_miller = vec![Vector3i32::zeros(); nsize];

        set_miller(t_miller.as_mut_slice(), n1, n2, n3);

        let mut t_cart = vec![Vector3f64::zeros(); nsize];

        miller_to_cart(t_cart.as_mut_slice(), t_miller.as_slice(), &blatt);

        let t_g: Vec<f64> = t_cart.iter().map(|g| g.norm2()).collect();

        let ordered_index = utility::argsort(&t_g);

        let cart = ordered_index.iter().map(|&j| t_cart[j]).collect();

        let miller = ordered_index.iter().map(|&j| t_miller[j]).collect();

        GVector { miller, cart }
    }

    /// Smallest odd Miller box holding every G with |G| <= gmax.
    pub fn for_cutoff(latt: &Lattice, gmax: f64) -> GVector {
        // |G . a_i| <= gmax |a_i|, and G . a_i = 2 pi m_i
        let n = |a: Vector3f64| {
            let m = (gmax * a.norm2() / (2.0 * std::f64::consts::PI)).ceil() as usize;
            2 * m + 1
        };

        GVector::new(
            latt,
            n(latt.get_vector_a()),
            n(latt.get_vector_b()),
            n(latt.get_vector_c()),
        )
    }

    pub fn get_miller(&self) -> &[Vector3i32] {
        self.miller.as_slice()
    }

    pub fn get_cart(&self) -> &[Vector3f64] {
        self.cart.as_slice()
    }

    pub fn get_n_gvectors(&self) -> usize {
        self.cart.len()
    }

    // |k+G|^2 <= 2*Ecut
    pub fn get_g_vector_index(&self, ecut: f64, xk: Vector3f64) -> Vec<usize> {
        let two_ecut = 2.0 * ecut;

        self.cart
            .iter()
            .enumerate()
            .filter(|(_, g)| {
                let kg = xk + **g;
                kg.dot_product(&kg) <= two_ecut
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get_n_plane_waves(&self, ecut: f64, xk: Vector3f64) -> usize {
        self.get_g_vector_index(ecut, xk).len()
    }
}

// x = i * a.x + j * b.x + k * c.x
// y = i * a.y + j * b.y + k * c.y
// z = i * a.z + j * b.z + k * c.z
fn miller_to_cart(cart: &mut [Vector3f64], miller: &[Vector3i32], blatt: &Lattice) {
    let a = blatt.get_vector_a();
    let b = blatt.get_vector_b();
    let c = blatt.get_vector_c();

    for (ct, mi) in multizip((cart.iter_mut(), miller.iter())) {
        let m = mi.to_f64();

        *ct = a * m.x + b * m.y + c * m.z;
    }
}

fn set_miller(miller: &mut [Vector3i32], n1: usize, n2: usize, n3: usize) {
    let i1 = utility::fft_left_end(n1);
    let i2 = utility::fft_left_end(n2);
    let i3 = utility::fft_left_end(n3);

    let j1 = utility::fft_right_end(n1);
    let j2 = utility::fft_right_end(n2);
    let j3 = utility::fft_right_end(n3);

    let mut ig = 0;
    for i in i1..j1 + 1 {
        for j in i2..j2 + 1 {
            for k in i3..j3 + 1 {
                miller[ig] = Vector3i32::new(i, j, k);

                ig += 1;
            }
        }
    }
}

#[test]
fn test_gvector_sorted_and_counted() {
    use dwconsts::*;

    let latt = Lattice::cubic(3.0 * ANG_TO_BOHR);

    let gvec = GVector::new(&latt, 20, 20, 20);

    assert_eq!(gvec.get_n_gvectors(), 8000);
    assert_eq!(gvec.get_miller()[0], Vector3i32::zeros());

    let norms: Vec<f64> = gvec.get_cart().iter().map(|g| g.norm2()).collect();
    assert!(norms.windows(2).all(|w| w[0] <= w[1]));

    let xk = Vector3f64::zeros();
    let n_small = gvec.get_n_plane_waves(20.0, xk);
    let n_large = gvec.get_n_plane_waves(120.0, xk);
    assert!(n_small > 0 && n_small < n_large);
}

#[test]
fn test_gvector_for_cutoff_contains_sphere() {
    let latt = Lattice::cubic(10.0);
    let gmax = 3.0;

    let gvec = GVector::for_cutoff(&latt, gmax);

    // spacing 2 pi / 10; shells along x reach m = 4 (|G| = 2.51) but not m = 5
    let along_x = gvec
        .get_miller()
        .iter()
        .zip(gvec.get_cart())
        .filter(|(m, g)| m.y == 0 && m.z == 0 && g.norm2() <= gmax)
        .count();

    assert_eq!(along_x, 9);
}
