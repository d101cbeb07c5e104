use itertools::multizip;

/// Composite Simpson on a mapped grid: sum of y * rab with rab = dr/di.
///
/// Odd point counts use the 1/3 rule throughout; even counts use 1/3 up to
/// the last four points and the 3/8 rule on those. Two points fall back to
/// the trapezoid.
pub fn simpson_rab(y: &[f64], rab: &[f64]) -> f64 {
    assert_eq!(y.len(), rab.len());

    let len = y.len();

    match len {
        0 | 1 => return 0.0,
        2 => return 0.5 * (y[0] * rab[0] + y[1] * rab[1]),
        _ => {}
    }

    let n = if len % 2 == 0 { len - 3 } else { len };

    let r12 = 1.0 / 3.0;

    let mut t1;

    let mut t2;

    let mut t3 = y[0] * rab[0] * r12;

    let mut s = 0.0;

    for i in (0..n - 1).step_by(2) {
        t1 = t3;

        t2 = y[i + 1] * rab[i + 1] * r12;

        t3 = y[i + 2] * rab[i + 2] * r12;

        s += t1 + 4.0 * t2 + t3;
    }

    if len % 2 == 0 {
        let n = len;

        let r38 = 3.0 / 8.0;

        s += y[n - 4] * rab[n - 4] * r38
            + 3.0 * y[n - 3] * rab[n - 3] * r38
            + 3.0 * y[n - 2] * rab[n - 2] * r38
            + y[n - 1] * rab[n - 1] * r38;
    }

    s
}

/// Composite Simpson on a uniform grid of spacing dx.
pub fn simpson(y: &[f64], dx: f64) -> f64 {
    let rab = vec![dx; y.len()];

    simpson_rab(y, &rab)
}

/// Trapezoid rule on an arbitrary increasing grid.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    assert_eq!(y.len(), x.len());

    multizip((y.windows(2), x.windows(2)))
        .map(|(yy, xx)| 0.5 * (yy[0] + yy[1]) * (xx[1] - xx[0]))
        .sum()
}

/// True when consecutive spacings of `x` agree to `tol` relative to the
/// first spacing.
pub fn is_uniform(x: &[f64], tol: f64) -> bool {
    if x.len() < 3 {
        return true;
    }

    let h = x[1] - x[0];

    x.windows(2).all(|w| ((w[1] - w[0]) - h).abs() <= tol * h.abs())
}

#[test]
fn test_simpson() {
    let y: Vec<f64> = (0..5).map(|i| i as f64).collect();
    let sum = simpson(&y[..], 1.0);
    assert!((sum - 8.0).abs() < 1.0e-14);
}

#[test]
fn test_simpson_rab_odd_count_matches_analytic() {
    // Integrate y = x^2 on [0, 4] with dx = 1.
    let y = vec![0.0, 1.0, 4.0, 9.0, 16.0];
    let rab = vec![1.0; y.len()];

    let got = simpson_rab(&y, &rab);
    let expected = 64.0 / 3.0;
    assert!((got - expected).abs() < 1.0e-12);
}

#[test]
fn test_simpson_rab_even_count_uses_38_tail() {
    // Integrate y = x^3 on [0, 5] with 6 points (dx = 1).
    // Composite Simpson 1/3 + 3/8 should be exact for cubic polynomials.
    let y = vec![0.0, 1.0, 8.0, 27.0, 64.0, 125.0];
    let rab = vec![1.0; y.len()];

    let got = simpson_rab(&y, &rab);
    let expected = 625.0 / 4.0;
    assert!((got - expected).abs() < 1.0e-12);
}

#[test]
fn test_simpson_rab_four_points_is_pure_38() {
    let y = vec![0.0, 1.0, 8.0, 27.0];
    let got = simpson(&y, 1.0);
    assert!((got - 81.0 / 4.0).abs() < 1.0e-12);
}

#[test]
fn test_simpson_short_inputs() {
    assert_eq!(simpson(&[], 0.1), 0.0);
    assert_eq!(simpson(&[3.0], 0.1), 0.0);
    assert!((simpson(&[1.0, 3.0], 0.5) - 1.0).abs() < 1.0e-15);
}

#[test]
fn test_trapezoid_on_log_grid() {
    // y = 1 on [1, e^2] sampled logarithmically
    let x: Vec<f64> = (0..201).map(|i| (i as f64 * 0.01).exp()).collect();
    let y = vec![1.0; x.len()];

    let got = trapezoid(&y, &x);
    assert!((got - ((2.0f64).exp() - 1.0)).abs() < 1.0e-12);
    assert!(!is_uniform(&x, 1.0e-8));
}

#[test]
fn test_is_uniform() {
    let x: Vec<f64> = (0..50).map(|i| 0.01 * i as f64).collect();
    assert!(is_uniform(&x, 1.0e-8));
}
