use integrate::adaptive_quadrature;
use libm::{exp, log};

use crate::constants::{K_MAX, K_MIN_DEFAULT, K_PIVOT};
use crate::cosmology::Cosmology;
use crate::error::CosmoError;
use crate::spline::{linear_spacing, SplineParams};

/// Linear matter power spectrum: power-law primordial spectrum tilted about
/// `K_PIVOT`, BBKS transfer function, amplitude fixed by sigma8 at z = 0.
///
/// The growth factor is tabulated on a spline at construction so that
/// evaluation inside the Limber integrand stays cheap.
pub struct MatterPower {
    norm: f64,
    shape: f64,
    n_s: f64,
    growth: SplineParams,
}

// BBKS transfer function of the shape variable q = k / (Omega_m h^2).
fn transfer_bbks(q: f64) -> f64 {
    if q < 1e-8 {
        return 1.;
    }
    let poly = 1. + 3.89 * q + (16.1 * q).powi(2) + (5.46 * q).powi(3) + (6.71 * q).powi(4);
    log(1. + 2.34 * q) / (2.34 * q) * poly.powf(-0.25)
}

// Fourier transform of a top-hat window of radius r, evaluated at kr.
fn tophat_window(x: f64) -> f64 {
    if x < 1e-4 {
        return 1. - x * x / 10.;
    }
    3. * (x.sin() - x * x.cos()) / (x * x * x)
}

impl MatterPower {
    pub fn new(cosmo: &Cosmology) -> Result<Self, CosmoError> {
        let h = cosmo.h0 / 100.;
        let shape = cosmo.omega_m * h * h;
        let n_s = cosmo.n_s;

        // Growth factor table over the scale factors the tracers can reach.
        let a_grid = linear_spacing(0.05, 1.0, 64)?;
        let mut d_grid = Vec::with_capacity(a_grid.len());
        for &a in &a_grid {
            d_grid.push(cosmo.growth_factor(a)?);
        }
        let d_first = d_grid[0];
        let d_last = d_grid[d_grid.len() - 1];
        let growth = SplineParams::new(&a_grid, &d_grid, d_first, d_last)?;

        // Fix the amplitude so the top-hat variance at 8 Mpc/h equals sigma8^2.
        let r8 = 8. / h;
        let shape_integrand = move |lnk: f64| {
            let k = exp(lnk);
            let t = transfer_bbks(k / shape);
            let w = tophat_window(k * r8);
            k * k * k * (k / K_PIVOT).powf(n_s) * t * t * w * w
        };
        let min_h = 1e-7;
        let variance_unnorm = adaptive_quadrature::adaptive_simpson_method(
            shape_integrand,
            log(K_MIN_DEFAULT),
            log(K_MAX),
            min_h,
            1e-9,
        )
        .map_err(|_| CosmoError::Integration {
            what: "sigma8 normalization",
        })?
            / (2. * std::f64::consts::PI * std::f64::consts::PI);

        Ok(MatterPower {
            norm: cosmo.sigma8 * cosmo.sigma8 / variance_unnorm,
            shape,
            n_s,
            growth,
        })
    }

    /// P(k, a) in Mpc^3, for k in 1/Mpc.
    pub fn eval(&self, k: f64, a: f64) -> f64 {
        let t = transfer_bbks(k / self.shape);
        let d = self.growth.eval(a);
        self.norm * (k / K_PIVOT).powf(self.n_s) * t * t * d * d
    }
}
