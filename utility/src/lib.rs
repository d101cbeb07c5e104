use itertools::multizip;
use rand::Rng;
use std::cmp::Ordering;
use std::f64::consts;
use types::*;

/// m = -l, ..., +l
pub fn get_quant_num_m(l: usize) -> Vec<i32> {
    (0..2 * l + 1).map(|im| im as i32 - l as i32).collect()
}

/// Indices that sort `v` ascending; NaN compares equal so the sort is total.
pub fn argsort<T: PartialOrd>(v: &[T]) -> Vec<usize> {
    let mut idx = (0..v.len()).collect::<Vec<_>>();

    idx.sort_by(|&i, &j| v[i].partial_cmp(&v[j]).unwrap_or(Ordering::Equal));

    idx
}

/// N even, 8
///
/// n : 0 1 2 3 4 5 6 7
///
/// i : 0 1 2 3 4 -3 -2 -1
///
/// N Odd, 7
///
/// n : 0 1 2 3 4 5 6
///
/// i : 0 1 2 3 -3 -2 -1
pub fn fft_left_end(n: usize) -> i32 {
    let nn = n as i32;

    if n % 2 == 0 {
        -(nn - 2) / 2
    } else {
        -(nn - 1) / 2
    }
}

pub fn fft_right_end(n: usize) -> i32 {
    let nn = n as i32;

    if n % 2 == 0 {
        nn / 2
    } else {
        (nn - 1) / 2
    }
}

pub fn zdot_product(u: &[c64], v: &[c64]) -> c64 {
    assert_eq!(u.len(), v.len());

    multizip((u.iter(), v.iter()))
        .map(|(x, y)| x.conj() * (*y))
        .sum()
}

pub fn vec_norm(v: &[c64]) -> f64 {
    v.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

pub fn normalize_vector_c64(v: &mut [c64]) {
    let s = vec_norm(v);

    if s > 0.0 {
        v.iter_mut().for_each(|x| *x /= s);
    }
}

/// Random amplitudes t (cos 2πt, sin 2πt), t in [-0.5, 0.5), damped by
/// `1 / (1 + kg^2)` and normalized.
pub fn make_damped_rand_vector<R: Rng>(rng: &mut R, kg: &[f64], v: &mut [c64]) {
    assert_eq!(kg.len(), v.len());

    for (y, g) in multizip((v.iter_mut(), kg.iter())) {
        let t = rng.gen_range(-0.5f64, 0.5f64);
        let theta = t * 2.0 * consts::PI;

        let damp = 1.0 / (1.0 + g * g);

        *y = c64 {
            re: t * theta.cos() * damp,
            im: t * theta.sin() * damp,
        };
    }

    normalize_vector_c64(v);
}
