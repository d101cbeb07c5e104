use std::f64::consts;
use vector3::*;

// https://en.wikipedia.org/wiki/Bessel_function#Spherical_Bessel_functions:_jn,_yn
//
// Power series below x = max(n, 1), where upward recurrence would lose
// digits; upward recurrence from j0, j1 above it.
pub fn spherical_bessel_jn(n: usize, x: f64) -> f64 {
    if x < 0.0 {
        let parity = if n % 2 == 0 { 1.0 } else { -1.0 };
        return parity * spherical_bessel_jn(n, -x);
    }

    if x <= (n as f64).max(1.0) {
        return spherical_bessel_jn_series(n, x);
    }

    let j0 = x.sin() / x;

    if n == 0 {
        return j0;
    }

    let mut jm = j0;
    let mut j = x.sin() / x / x - x.cos() / x;

    for k in 1..n {
        let jp = (2 * k + 1) as f64 / x * j - jm;
        jm = j;
        j = jp;
    }

    j
}

// j_n(x) = x^n / (2n+1)!! * sum_k (-x^2/2)^k / (k! (2n+3)(2n+5)...(2n+2k+1))
fn spherical_bessel_jn_series(n: usize, x: f64) -> f64 {
    let mut term = 1.0;

    for i in 0..n {
        term *= x / (2 * i + 3) as f64;
    }
    // term = x^n / (2n+1)!!, the loop above divides by 3*5*...*(2n+1)

    let hx2 = -0.5 * x * x;
    let mut sum = term;

    for k in 1..200 {
        term *= hx2 / (k as f64 * (2 * n + 2 * k + 1) as f64);
        sum += term;

        if term.abs() <= dwconsts::EPS20 * sum.abs() || term == 0.0 {
            break;
        }
    }

    sum
}

/// Associated Legendre P_l^m(x), Condon-Shortley phase included, m >= 0.
fn associated_legendre(l: usize, m: usize, x: f64) -> f64 {
    let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();

    let mut pmm = 1.0;
    let mut fact = 1.0;

    for _ in 0..m {
        pmm *= -fact * somx2;
        fact += 2.0;
    }

    if l == m {
        return pmm;
    }

    let mut pmmp1 = x * (2 * m + 1) as f64 * pmm;

    if l == m + 1 {
        return pmmp1;
    }

    let mut pll = 0.0;

    for ll in m + 2..=l {
        pll = (x * (2 * ll - 1) as f64 * pmmp1 - (ll + m - 1) as f64 * pmm) / (ll - m) as f64;
        pmm = pmmp1;
        pmmp1 = pll;
    }

    pll
}

// sqrt( (2l+1)/(4pi) * (l-m)!/(l+m)! )
fn ylm_norm(l: usize, m: usize) -> f64 {
    let mut ratio = 1.0;

    for k in (l - m + 1)..=(l + m) {
        ratio /= k as f64;
    }

    ((2 * l + 1) as f64 / (4.0 * consts::PI) * ratio).sqrt()
}

//
// Real spherical harmonics of the direction of v, built from the complex
// ones with the Condon-Shortley phase:
//
//   m > 0 : sqrt(2) Re Y_l^m
//   m = 0 : Y_l^0
//   m < 0 : sqrt(2) Im Y_l^|m|
//
// so that (1,-1), (1,0), (1,1) are -c y/r, c z/r, -c x/r.
// A zero vector is taken along +z.
//
pub fn real_spherical_harmonics(l: usize, m: i32, v: Vector3f64) -> f64 {
    assert!(
        m.unsigned_abs() as usize <= l,
        "|m| = {} exceeds l = {}",
        m.abs(),
        l
    );

    let rnorm = v.norm2();

    let (cos_theta, phi) = if rnorm < dwconsts::EPS20 {
        (1.0, 0.0)
    } else {
        ((v.z / rnorm).clamp(-1.0, 1.0), v.y.atan2(v.x))
    };

    let am = m.unsigned_abs() as usize;

    let plm = ylm_norm(l, am) * associated_legendre(l, am, cos_theta);

    match m {
        0 => plm,
        m if m > 0 => consts::SQRT_2 * plm * (am as f64 * phi).cos(),
        _ => consts::SQRT_2 * plm * (am as f64 * phi).sin(),
    }
}
