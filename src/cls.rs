//! Limber-approximation angular power spectra between two tracers.
//!
//! Each tracer contributes a transfer function Delta_ell(k); the spectrum is
//! the integral of k * Delta1 * Delta2 * P(k, a) over log10 k, evaluated at
//! the Limber distance chi = (ell + 1/2) / k.

use std::f64::consts::LN_10;

use integrate::adaptive_quadrature;
use libm::log10;
use rayon::prelude::*;

use crate::constants::{K_MAX, K_MIN_DEFAULT};
use crate::cosmology::Cosmology;
use crate::error::CosmoError;
use crate::power::MatterPower;
use crate::tracer::{ClTracer, TracerKind};

// Density contribution to number counts: n(z) b(z) H(z)/c at the Limber distance.
fn transfer_dens(
    ell: f64,
    k: f64,
    cosmo: &Cosmology,
    clt: &ClTracer,
) -> Result<f64, CosmoError> {
    let chi = (ell + 0.5) / k;
    if chi > clt.chi_max {
        return Ok(0.);
    }
    let a = cosmo.scale_factor_of_chi(chi)?;
    let z = 1. / a - 1.;
    let pz = clt.spl_nz.eval(z);
    let bz = match &clt.spl_bz {
        Some(spl) => spl.eval(z),
        None => 1.,
    };
    Ok(pz * bz * cosmo.h_factor(z))
}

// Redshift-space distortion contribution, from the two Limber multipole
// evaluation points (ell + 1/2) / k and (ell + 3/2) / k.
fn transfer_rsd(
    ell: f64,
    k: f64,
    cosmo: &Cosmology,
    clt: &ClTracer,
) -> Result<f64, CosmoError> {
    let chi0 = (ell + 0.5) / k;
    let chi1 = (ell + 1.5) / k;
    if chi0 > clt.chi_max && chi1 > clt.chi_max {
        return Ok(0.);
    }
    let a0 = cosmo.scale_factor_of_chi(chi0.min(clt.chi_max))?;
    let a1 = cosmo.scale_factor_of_chi(chi1.min(clt.chi_max))?;
    let z0 = 1. / a0 - 1.;
    let z1 = 1. / a1 - 1.;
    let pz0 = clt.spl_nz.eval(z0);
    let pz1 = clt.spl_nz.eval(z1);
    let gf1 = cosmo.growth_factor(a1)? / cosmo.growth_factor(a0)?;
    let fg0 = cosmo.growth_rate(a0)?;
    let fg1 = cosmo.growth_rate(a1)?;
    let h0 = cosmo.h_factor(z0);
    let h1 = cosmo.h_factor(z1);
    let term0 = pz0 * fg0 * h0 * (1. + 8. * ell) / ((2. * ell + 1.) * (2. * ell + 1.));
    let term1 = pz1 * fg1 * gf1 * h1 * ((ell + 0.5) / (ell + 1.5)).sqrt() * 4. / (2. * ell + 3.);
    Ok(term0 - term1)
}

// Magnification contribution to number counts, through the precomputed
// magnification window.
fn transfer_mag(
    ell: f64,
    k: f64,
    cosmo: &Cosmology,
    clt: &ClTracer,
) -> Result<f64, CosmoError> {
    let chi = (ell + 0.5) / k;
    if chi > clt.chi_max {
        return Ok(0.);
    }
    let w = match &clt.spl_window {
        Some(spl) => spl.eval(chi),
        None => 0.,
    };
    if w <= 0. {
        return Ok(0.);
    }
    let a = cosmo.scale_factor_of_chi(chi)?;
    Ok(-2. * clt.prefac_lensing * ell * (ell + 1.) * w / (a * chi * k * k))
}

// Shear contribution, through the precomputed lensing window.
fn transfer_wl(ell: f64, k: f64, cosmo: &Cosmology, clt: &ClTracer) -> Result<f64, CosmoError> {
    let chi = (ell + 0.5) / k;
    if chi > clt.chi_max {
        return Ok(0.);
    }
    let w = match &clt.spl_window {
        Some(spl) => spl.eval(chi),
        None => 0.,
    };
    if w <= 0. {
        return Ok(0.);
    }
    Ok(clt.prefac_lensing * ell * (ell + 1.) * w / (cosmo.scale_factor_of_chi(chi)? * chi * k * k))
}

// Intrinsic alignment contribution to shear (nonlinear alignment model).
fn transfer_ia_nla(
    ell: f64,
    k: f64,
    cosmo: &Cosmology,
    clt: &ClTracer,
) -> Result<f64, CosmoError> {
    let chi = (ell + 0.5) / k;
    if chi > clt.chi_max {
        return Ok(0.);
    }
    let a = cosmo.scale_factor_of_chi(chi)?;
    let z = 1. / a - 1.;
    let pz = clt.spl_nz.eval(z);
    let ba = match &clt.spl_ba {
        Some(spl) => spl.eval(z),
        None => 0.,
    };
    let rf = match &clt.spl_rf {
        Some(spl) => spl.eval(z),
        None => 0.,
    };
    let prefac = ((ell + 2.) * (ell + 1.) * ell * (ell - 1.)).sqrt() / ((ell + 0.5) * (ell + 0.5));
    Ok(pz * ba * rf * cosmo.h_factor(z) * prefac)
}

// Sum of the contributions active for this tracer.
fn transfer_wrap(
    ell: f64,
    k: f64,
    cosmo: &Cosmology,
    clt: &ClTracer,
) -> Result<f64, CosmoError> {
    match clt.kind {
        TracerKind::NumberCounts => {
            let mut out = transfer_dens(ell, k, cosmo, clt)?;
            if clt.has_rsd {
                out += transfer_rsd(ell, k, cosmo, clt)?;
            }
            if clt.has_magnification {
                out += transfer_mag(ell, k, cosmo, clt)?;
            }
            Ok(out)
        }
        TracerKind::WeakLensing => {
            let mut out = transfer_wl(ell, k, cosmo, clt)?;
            if clt.has_intrinsic_alignment {
                out += transfer_ia_nla(ell, k, cosmo, clt)?;
            }
            Ok(out)
        }
    }
}

// log10 k interval over which the Limber kernel of the tracer pair has
// support, clipped to the library's wavenumber bounds.
fn k_interval(clt1: &ClTracer, clt2: &ClTracer, ell: f64) -> (f64, f64) {
    let (mut chi_min, chi_max) = match (clt1.kind, clt2.kind) {
        (TracerKind::NumberCounts, TracerKind::NumberCounts) => (
            clt1.chi_min.max(clt2.chi_min),
            clt1.chi_max.min(clt2.chi_max),
        ),
        (TracerKind::NumberCounts, _) => (clt1.chi_min, clt1.chi_max),
        (_, TracerKind::NumberCounts) => (clt2.chi_min, clt2.chi_max),
        _ => (
            0.5 * (ell + 0.5) / K_MAX,
            2. * (ell + 0.5) / K_MIN_DEFAULT,
        ),
    };
    if chi_min <= 0. {
        chi_min = 0.5 * (ell + 0.5) / K_MAX;
    }
    let lkmax = 2.0_f64.min(log10(2. * (ell + 0.5) / chi_min));
    let lkmin = (-4.0_f64).max(log10(0.5 * (ell + 0.5) / chi_max));
    (lkmin, lkmax)
}

/// Angular power spectrum between two tracers at multipole `ell`.
pub fn angular_cl(
    cosmo: &Cosmology,
    power: &MatterPower,
    ell: i32,
    clt1: &ClTracer,
    clt2: &ClTracer,
) -> Result<f64, CosmoError> {
    let ell = ell as f64;
    let (lkmin, lkmax) = k_interval(clt1, clt2, ell);
    let chi_support = clt1.chi_max.max(clt2.chi_max);

    let integrand = |lk: f64| {
        let k = 10.0_f64.powf(lk);
        let chi = (ell + 0.5) / k;
        if chi > chi_support {
            return 0.;
        }
        let a = match cosmo.scale_factor_of_chi(chi) {
            Ok(a) => a,
            Err(_) => return f64::NAN,
        };
        let t1 = match transfer_wrap(ell, k, cosmo, clt1) {
            Ok(t) => t,
            Err(_) => return f64::NAN,
        };
        let t2 = match transfer_wrap(ell, k, cosmo, clt2) {
            Ok(t) => t,
            Err(_) => return f64::NAN,
        };
        k * t1 * t2 * power.eval(k, a)
    };

    let min_h = 1e-7;
    let result =
        adaptive_quadrature::adaptive_simpson_method(integrand, lkmin, lkmax, min_h, 1e-8)
            .map_err(|_| CosmoError::Integration {
                what: "angular power spectrum",
            })?;
    if !result.is_finite() {
        return Err(CosmoError::Integration {
            what: "angular power spectrum",
        });
    }
    Ok(LN_10 * result / (ell + 0.5))
}

/// Angular power spectrum over a set of multipoles, parallelized over ell.
pub fn angular_cl_spectrum(
    cosmo: &Cosmology,
    power: &MatterPower,
    ells: &[i32],
    clt1: &ClTracer,
    clt2: &ClTracer,
) -> Result<Vec<f64>, CosmoError> {
    ells.par_iter()
        .map(|&ell| angular_cl(cosmo, power, ell, clt1, clt2))
        .collect()
}
