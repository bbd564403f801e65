use integrate::adaptive_quadrature;

use crate::error::CosmoError;

/// Natural cubic spline over a set of strictly increasing nodes.
///
/// Outside the sampled range the spline does not extrapolate: it returns the
/// fixed values `y0` (below the first node) and `yf` (above the last one).
/// This is the boundary behaviour the tracer kernels rely on, e.g. n(z) is
/// zero outside its samples while b(z) is held at its end values.
pub struct SplineParams {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivs: Vec<f64>,
    y0: f64,
    yf: f64,
}

impl SplineParams {
    pub fn new(x: &[f64], y: &[f64], y0: f64, yf: f64) -> Result<Self, CosmoError> {
        if x.len() != y.len() {
            return Err(CosmoError::Inconsistent {
                reason: format!("{} x-values but {} y-values", x.len(), y.len()),
            });
        }
        if x.len() < 2 {
            return Err(CosmoError::Spline {
                reason: "need at least two nodes".to_string(),
            });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CosmoError::Spline {
                reason: "x-values must be strictly increasing".to_string(),
            });
        }

        let second_derivs = solve_natural_second_derivatives(x, y);
        Ok(SplineParams {
            x: x.to_vec(),
            y: y.to_vec(),
            second_derivs,
            y0,
            yf,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Evaluate the spline, clamping to `y0`/`yf` outside the node range.
    pub fn eval(&self, x: f64) -> f64 {
        if x <= self.x[0] {
            return self.y0;
        }
        if x >= self.x[self.x.len() - 1] {
            return self.yf;
        }
        let i = self.x.partition_point(|&xi| xi <= x) - 1;
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - x) / h;
        let b = (x - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.second_derivs[i]
                + (b * b * b - b) * self.second_derivs[i + 1])
                * h
                * h
                / 6.0
    }

    /// Integrate the spline over `[lo, hi]` with adaptive Simpson quadrature.
    pub fn integrate(&self, lo: f64, hi: f64, epsrel: f64) -> Result<f64, CosmoError> {
        let min_h = 1e-7;
        adaptive_quadrature::adaptive_simpson_method(|x| self.eval(x), lo, hi, min_h, epsrel)
            .map_err(|_| CosmoError::Integration {
                what: "spline integral",
            })
    }
}

// Thomas algorithm for the natural-spline tridiagonal system. The boundary
// second derivatives are zero, so only the n-2 interior values are solved for.
fn solve_natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n <= 2 {
        return m;
    }

    let k = n - 2;
    let mut diag = vec![0.0; k];
    let mut lower = vec![0.0; k];
    let mut upper = vec![0.0; k];
    let mut rhs = vec![0.0; k];

    for i in 1..=k {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        lower[i - 1] = h0;
        diag[i - 1] = 2.0 * (h0 + h1);
        upper[i - 1] = h1;
        rhs[i - 1] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
    }

    for i in 1..k {
        let w = lower[i] / diag[i - 1];
        diag[i] -= w * upper[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }

    m[k] = rhs[k - 1] / diag[k - 1];
    for i in (0..k - 1).rev() {
        m[i + 1] = (rhs[i] - upper[i] * m[i + 2]) / diag[i];
    }
    m
}

/// Evenly spaced grid from `a` to `b` inclusive, with endpoint verification.
pub fn linear_spacing(a: f64, b: f64, n: usize) -> Result<Vec<f64>, CosmoError> {
    if n < 2 {
        return Err(CosmoError::Inconsistent {
            reason: format!("linear spacing needs at least two points, got {}", n),
        });
    }
    let step = (b - a) / ((n - 1) as f64);
    let grid: Vec<f64> = (0..n).map(|i| a + (i as f64) * step).collect();
    if (grid[0] - a).abs() > 1e-5 || (grid[n - 1] - b).abs() > 1e-5 {
        return Err(CosmoError::Linspace { a, b, n });
    }
    Ok(grid)
}
