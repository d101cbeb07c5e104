use gvector::GVector;
use vector3::Vector3f64;

/// Plane-wave basis of one k-point, ordered by |k+G|.
#[derive(Debug, Default, Clone)]
pub struct PWBasis {
    k_cart: Vector3f64, // in cartesian coordinates
    k_index: usize,     // index of this xk in all xks
    npw: usize,         // number of plane waves
    gindex: Vec<usize>, // indices of G vectors used in this set of plane wave basis
    kg: Vec<f64>,       // norms of the vectors xk+gvec
}

impl PWBasis {
    pub fn get_kg(&self) -> &[f64] {
        self.kg.as_slice()
    }

    pub fn get_k_cart(&self) -> Vector3f64 {
        self.k_cart
    }

    pub fn get_k_index(&self) -> usize {
        self.k_index
    }

    pub fn get_gindex(&self) -> &[usize] {
        self.gindex.as_slice()
    }

    pub fn get_n_plane_waves(&self) -> usize {
        self.npw
    }

    /// All G with |k+G|^2 / 2 <= ecut (hartree).
    pub fn new(k_cart: Vector3f64, k_index: usize, ecut: f64, gvec: &GVector) -> PWBasis {
        let gindex = gvec.get_g_vector_index(ecut, k_cart);

        PWBasis::from_gindex(k_cart, k_index, &gindex, gvec)
    }

    /// Basis over an explicit list of G vector indices.
    pub fn from_gindex(
        k_cart: Vector3f64,
        k_index: usize,
        t_gindex: &[usize],
        gvec: &GVector,
    ) -> PWBasis {
        let npw = t_gindex.len();

        let mut t_kg = vec![0.0; npw];

        compute_kg(gvec, k_cart, t_gindex, t_kg.as_mut_slice());

        // sort |k+G|

        let ordered_index = utility::argsort(&t_kg);

        let gindex = ordered_index.iter().map(|&j| t_gindex[j]).collect();

        let kg = ordered_index.iter().map(|&j| t_kg[j]).collect();

        PWBasis {
            k_cart,
            k_index,
            npw,
            gindex,
            kg,
        }
    }

    /// Cartesian k+G of every plane wave, in basis order.
    pub fn get_kg_cart(&self, gvec: &GVector) -> Vec<Vector3f64> {
        let gcart = gvec.get_cart();

        self.gindex.iter().map(|&j| self.k_cart + gcart[j]).collect()
    }
}

fn compute_kg(gvec: &GVector, xk: Vector3f64, gindex: &[usize], kg: &mut [f64]) {
    let gcart = gvec.get_cart();

    for (i, &j) in gindex.iter().enumerate() {
        let xkg = xk + gcart[j];

        kg[i] = xkg.norm2();
    }
}
