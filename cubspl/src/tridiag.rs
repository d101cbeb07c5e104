// Thomas algorithm for a diagonally dominant tridiagonal system.
//
//   sub[i] x[i-1] + diag[i] x[i] + sup[i] x[i+1] = rhs[i]
//
// sub[0] and sup[n-1] are ignored.
pub(crate) fn solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();

    let mut cp = vec![0.0; n];
    let mut dp = vec![0.0; n];

    cp[0] = sup[0] / diag[0];
    dp[0] = rhs[0] / diag[0];

    for i in 1..n {
        let denom = diag[i] - sub[i] * cp[i - 1];

        cp[i] = sup[i] / denom;
        dp[i] = (rhs[i] - sub[i] * dp[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];

    x[n - 1] = dp[n - 1];

    for i in (0..n - 1).rev() {
        x[i] = dp[i] - cp[i] * x[i + 1];
    }

    x
}

// Cyclic tridiagonal system by Sherman-Morrison; `alpha` is the bottom-left
// corner A[n-1][0], `beta` the top-right corner A[0][n-1]. Needs n >= 3.
pub(crate) fn solve_cyclic(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    alpha: f64,
    beta: f64,
    rhs: &[f64],
) -> Vec<f64> {
    let n = diag.len();

    let gamma = -diag[0];

    let mut bb = diag.to_vec();

    bb[0] = diag[0] - gamma;
    bb[n - 1] = diag[n - 1] - alpha * beta / gamma;

    let x = solve(sub, &bb, sup, rhs);

    let mut u = vec![0.0; n];

    u[0] = gamma;
    u[n - 1] = alpha;

    let z = solve(sub, &bb, sup, &u);

    let fact = (x[0] + beta * x[n - 1] / gamma) / (1.0 + z[0] + beta * z[n - 1] / gamma);

    x.iter().zip(z.iter()).map(|(xi, zi)| xi - fact * zi).collect()
}
