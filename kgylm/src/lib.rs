use gvector::GVector;
use pwbasis::PWBasis;
use vector3::Vector3f64;

//
// Y_lm(k+G) for all l <= lmax at the plane waves of one k-point
//
// (l, m) is stored at row l*l + l + m; each row has one value per plane wave
// in basis order.
//
pub struct KGYLM {
    lmax: usize,
    npw: usize,
    data: Vec<f64>,
}

impl KGYLM {
    pub fn new(lmax: usize, gvec: &GVector, pwwfc: &PWBasis) -> KGYLM {
        let kg_cart = pwwfc.get_kg_cart(gvec);

        KGYLM::from_kg_cart(lmax, &kg_cart)
    }

    pub fn from_kg_cart(lmax: usize, kg_cart: &[Vector3f64]) -> KGYLM {
        let npw = kg_cart.len();

        let mut data = vec![0.0; (lmax + 1) * (lmax + 1) * npw];

        for l in 0..lmax + 1 {
            for m in utility::get_quant_num_m(l) {
                let row = lm_row(l, m);

                let ylm = &mut data[row * npw..(row + 1) * npw];

                for (y, xkg) in ylm.iter_mut().zip(kg_cart.iter()) {
                    *y = special::real_spherical_harmonics(l, m, *xkg);
                }
            }
        }

        KGYLM { lmax, npw, data }
    }

    pub fn get_lmax(&self) -> usize {
        self.lmax
    }

    pub fn get_n_plane_waves(&self) -> usize {
        self.npw
    }

    /// None when l exceeds the tabulated lmax or |m| > l.
    pub fn get_data(&self, l: usize, m: i32) -> Option<&[f64]> {
        if l > self.lmax || m.unsigned_abs() as usize > l {
            return None;
        }

        let row = lm_row(l, m);

        Some(&self.data[row * self.npw..(row + 1) * self.npw])
    }
}

fn lm_row(l: usize, m: i32) -> usize {
    ((l * l + l) as i64 + m as i64) as usize
}
