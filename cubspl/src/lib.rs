//! Interpolating cubic splines on an increasing grid.
//!
//! The spline is stored as one cubic per interval,
//!
//! ```text
//! s(x) = c[0] + c[1] t + c[2] t^2 + c[3] t^3,   t = x - x_i,
//! ```
//!
//! with continuous value, first and second derivative at interior nodes.
//! Outside `[x_0, x_{n-1}]` the first/last interval polynomial is continued,
//! so evaluation never fails.

mod tridiag;

use std::fmt;

/// End conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// s'' = 0 at both ends
    Natural,
    /// s, s', s'' equal at both ends; requires y_0 == y_{n-1}
    Periodic,
}

impl BoundaryCondition {
    pub fn from_str(s: &str) -> Option<BoundaryCondition> {
        match s.trim().to_lowercase().as_str() {
            "natural" => Some(BoundaryCondition::Natural),
            "periodic" => Some(BoundaryCondition::Periodic),
            _ => None,
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Natural => write!(f, "natural"),
            BoundaryCondition::Periodic => write!(f, "periodic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplineError {
    /// fewer nodes than the boundary condition needs
    TooFewPoints { got: usize, need: usize },
    LengthMismatch { nx: usize, ny: usize },
    /// x[i+1] <= x[i]
    NotIncreasing { index: usize },
    /// periodic ends with y_0 != y_{n-1}
    PeriodicMismatch { first: f64, last: f64 },
}

impl fmt::Display for SplineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplineError::TooFewPoints { got, need } => {
                write!(f, "spline needs at least {} points, got {}", need, got)
            }
            SplineError::LengthMismatch { nx, ny } => {
                write!(f, "spline abscissa has {} points but ordinate has {}", nx, ny)
            }
            SplineError::NotIncreasing { index } => {
                write!(f, "spline abscissa is not strictly increasing at index {}", index)
            }
            SplineError::PeriodicMismatch { first, last } => write!(
                f,
                "periodic spline needs equal end values, got {} and {}",
                first, last
            ),
        }
    }
}

impl std::error::Error for SplineError {}

const UNIFORM_TOL: f64 = 1.0e-10;
const PERIODIC_TOL: f64 = 1.0e-10;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    coeffs: Vec<[f64; 4]>,
    // 1/h when the grid is uniform, used for O(1) interval lookup
    inv_h: Option<f64>,
    bc: BoundaryCondition,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64], bc: BoundaryCondition) -> Result<CubicSpline, SplineError> {
        let n = x.len();

        if n != y.len() {
            return Err(SplineError::LengthMismatch { nx: n, ny: y.len() });
        }

        let need = match bc {
            BoundaryCondition::Natural => 2,
            BoundaryCondition::Periodic => 4,
        };

        if n < need {
            return Err(SplineError::TooFewPoints { got: n, need });
        }

        if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SplineError::NotIncreasing { index: index + 1 });
        }

        let m = match bc {
            BoundaryCondition::Natural => natural_second_derivatives(x, y),

            BoundaryCondition::Periodic => {
                let (first, last) = (y[0], y[n - 1]);

                if (first - last).abs() > PERIODIC_TOL * first.abs().max(last.abs()).max(1.0) {
                    return Err(SplineError::PeriodicMismatch { first, last });
                }

                periodic_second_derivatives(x, y)
            }
        };

        let coeffs = (0..n - 1)
            .map(|i| {
                let h = x[i + 1] - x[i];

                [
                    y[i],
                    (y[i + 1] - y[i]) / h - h * (2.0 * m[i] + m[i + 1]) / 6.0,
                    0.5 * m[i],
                    (m[i + 1] - m[i]) / (6.0 * h),
                ]
            })
            .collect();

        let inv_h = if integral::is_uniform(x, UNIFORM_TOL) {
            Some(1.0 / (x[1] - x[0]))
        } else {
            None
        };

        Ok(CubicSpline {
            x: x.to_vec(),
            coeffs,
            inv_h,
            bc,
        })
    }

    pub fn get_boundary_condition(&self) -> BoundaryCondition {
        self.bc
    }

    pub fn get_x(&self) -> &[f64] {
        &self.x
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    // interval holding x; the end intervals extend to infinity
    fn interval(&self, x: f64) -> usize {
        let last = self.coeffs.len() - 1;

        match self.inv_h {
            Some(inv_h) => {
                let t = ((x - self.x[0]) * inv_h).floor();

                if t <= 0.0 {
                    0
                } else {
                    (t as usize).min(last)
                }
            }

            None => self.x.partition_point(|&xi| xi <= x).saturating_sub(1).min(last),
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        let i = self.interval(x);
        let c = &self.coeffs[i];
        let t = x - self.x[i];

        c[0] + t * (c[1] + t * (c[2] + t * c[3]))
    }

    pub fn eval_deriv(&self, x: f64) -> f64 {
        let i = self.interval(x);
        let c = &self.coeffs[i];
        let t = x - self.x[i];

        c[1] + t * (2.0 * c[2] + t * 3.0 * c[3])
    }

    pub fn eval_many(&self, x: &[f64], y: &mut [f64]) {
        for (xi, yi) in x.iter().zip(y.iter_mut()) {
            *yi = self.eval(*xi);
        }
    }
}

fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();

    let mut m = vec![0.0; n];

    if n < 3 {
        return m;
    }

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // interior nodes 1..n-1
    let ni = n - 2;
    let mut sub = vec![0.0; ni];
    let mut diag = vec![0.0; ni];
    let mut sup = vec![0.0; ni];
    let mut rhs = vec![0.0; ni];

    for k in 0..ni {
        let i = k + 1;

        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    let inner = tridiag::solve(&sub, &diag, &sup, &rhs);

    m[1..n - 1].copy_from_slice(&inner);

    m
}

fn periodic_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();

    // unknowns M_0 .. M_{N-1}, M_N = M_0
    let nn = n - 1;

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let mut sub = vec![0.0; nn];
    let mut diag = vec![0.0; nn];
    let mut sup = vec![0.0; nn];
    let mut rhs = vec![0.0; nn];

    for i in 0..nn {
        let h_prev = h[(i + nn - 1) % nn];
        let h_next = h[i];

        let y_prev = if i == 0 { y[nn - 1] } else { y[i - 1] };

        sub[i] = h_prev;
        diag[i] = 2.0 * (h_prev + h_next);
        sup[i] = h_next;
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h_next - (y[i] - y_prev) / h_prev);
    }

    let corner = h[nn - 1];

    let mut m = tridiag::solve_cyclic(&sub, &diag, &sup, corner, corner, &rhs);

    m.push(m[0]);

    m
}
