use integrate::adaptive_quadrature;
use libm::exp;

use crate::constants::{DCHI_WINDOW, EPSREL_DNDZ, Z_MAX_SOURCES, Z_MIN_SOURCES};
use crate::cosmology::Cosmology;
use crate::error::CosmoError;
use crate::spline::{linear_spacing, SplineParams};

/// The kind of observable a tracer samples the matter field with.
/// The discriminants are the integer tags published through the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TracerKind {
    NumberCounts = 1,
    WeakLensing = 2,
}

/// Analytic source redshift distributions, valid on
/// `[Z_MIN_SOURCES, Z_MAX_SOURCES]`. The weak-lensing variants follow the
/// fiducial/optimistic/conservative photometric estimates of Chang et al.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DndzModel {
    Clustering = 1,
    WlFid = 2,
    WlCons = 3,
    WlOpt = 4,
}

/// Unnormalized dN/dz for one of the analytic models. Zero outside the
/// supported redshift range; tracer construction takes care of normalization.
pub fn dndz(model: DndzModel, z: f64) -> f64 {
    if !(Z_MIN_SOURCES..=Z_MAX_SOURCES).contains(&z) {
        return 0.;
    }
    let (alpha, beta, z0) = match model {
        DndzModel::Clustering => (2.0, 1.0, 0.3),
        DndzModel::WlFid => (1.24, 1.01, 0.51),
        DndzModel::WlCons => (1.28, 0.97, 0.41),
        DndzModel::WlOpt => (1.23, 1.05, 0.59),
    };
    z.powf(alpha) * exp(-(z / z0).powf(beta))
}

/// A tracer of the matter field: a normalized redshift distribution plus the
/// kernels needed for its Limber transfer function. The lensing and
/// magnification windows are precomputed on a comoving-distance grid at
/// construction, so the object is immutable and cheap to evaluate afterwards.
pub struct ClTracer {
    pub(crate) kind: TracerKind,
    pub(crate) has_rsd: bool,
    pub(crate) has_magnification: bool,
    pub(crate) has_intrinsic_alignment: bool,
    pub(crate) chi_min: f64,
    pub(crate) chi_max: f64,
    pub(crate) prefac_lensing: f64,
    pub(crate) spl_nz: SplineParams,
    pub(crate) spl_bz: Option<SplineParams>,
    pub(crate) spl_sz: Option<SplineParams>,
    // Lensing window for WeakLensing tracers, magnification window for
    // NumberCounts tracers with magnification.
    pub(crate) spl_window: Option<SplineParams>,
    pub(crate) spl_ba: Option<SplineParams>,
    pub(crate) spl_rf: Option<SplineParams>,
}

impl ClTracer {
    /// Galaxy number counts with a bias function b(z). The bias is held at
    /// its end values outside the sampled range.
    pub fn number_counts(
        cosmo: &Cosmology,
        z_n: &[f64],
        n: &[f64],
        z_b: &[f64],
        b: &[f64],
        has_rsd: bool,
    ) -> Result<ClTracer, CosmoError> {
        let spl_nz = normalized_dndz_spline(z_n, n)?;
        let spl_bz = end_clamped_spline(z_b, b, "b(z)")?;
        let chi_min = cosmo.comoving_distance(z_n[0])?;
        let chi_max = cosmo.comoving_distance(z_n[z_n.len() - 1])?;
        Ok(ClTracer {
            kind: TracerKind::NumberCounts,
            has_rsd,
            has_magnification: false,
            has_intrinsic_alignment: false,
            chi_min,
            chi_max,
            prefac_lensing: lensing_prefactor(cosmo),
            spl_nz,
            spl_bz: Some(spl_bz),
            spl_sz: None,
            spl_window: None,
            spl_ba: None,
            spl_rf: None,
        })
    }

    /// Number counts including the magnification bias contribution, which
    /// needs the magnification bias function s(z) and a precomputed
    /// magnification window.
    pub fn number_counts_with_magnification(
        cosmo: &Cosmology,
        z_n: &[f64],
        n: &[f64],
        z_b: &[f64],
        b: &[f64],
        z_s: &[f64],
        s: &[f64],
        has_rsd: bool,
    ) -> Result<ClTracer, CosmoError> {
        let mut tracer = ClTracer::number_counts(cosmo, z_n, n, z_b, b, has_rsd)?;
        let spl_sz = end_clamped_spline(z_s, s, "s(z)")?;
        let z_max = z_n[z_n.len() - 1];
        let window = tabulate_window(cosmo, &tracer.spl_nz, Some(&spl_sz), tracer.chi_max, z_max)?;
        tracer.has_magnification = true;
        tracer.spl_sz = Some(spl_sz);
        tracer.spl_window = Some(window);
        Ok(tracer)
    }

    /// Weak lensing shear tracer. The lensing window is tabulated from zero
    /// out to the distance of the furthest sources.
    pub fn lensing(cosmo: &Cosmology, z_n: &[f64], n: &[f64]) -> Result<ClTracer, CosmoError> {
        let spl_nz = normalized_dndz_spline(z_n, n)?;
        let z_max = z_n[z_n.len() - 1];
        let chi_max = cosmo.comoving_distance(z_max)?;
        let window = tabulate_window(cosmo, &spl_nz, None, chi_max, z_max)?;
        Ok(ClTracer {
            kind: TracerKind::WeakLensing,
            has_rsd: false,
            has_magnification: false,
            has_intrinsic_alignment: false,
            chi_min: 0.,
            chi_max,
            prefac_lensing: lensing_prefactor(cosmo),
            spl_nz,
            spl_bz: None,
            spl_sz: None,
            spl_window: Some(window),
            spl_ba: None,
            spl_rf: None,
        })
    }

    /// Weak lensing with an intrinsic-alignment contribution, described by
    /// an alignment bias ba(z) and an aligned (red) fraction rf(z).
    pub fn lensing_with_alignment(
        cosmo: &Cosmology,
        z_n: &[f64],
        n: &[f64],
        z_ba: &[f64],
        ba: &[f64],
        z_rf: &[f64],
        rf: &[f64],
    ) -> Result<ClTracer, CosmoError> {
        let mut tracer = ClTracer::lensing(cosmo, z_n, n)?;
        tracer.spl_ba = Some(end_clamped_spline(z_ba, ba, "ba(z)")?);
        tracer.spl_rf = Some(end_clamped_spline(z_rf, rf, "rf(z)")?);
        tracer.has_intrinsic_alignment = true;
        Ok(tracer)
    }

    pub fn kind(&self) -> TracerKind {
        self.kind
    }

    pub fn chi_min(&self) -> f64 {
        self.chi_min
    }

    pub fn chi_max(&self) -> f64 {
        self.chi_max
    }
}

fn lensing_prefactor(cosmo: &Cosmology) -> f64 {
    let hub = cosmo.h_factor(0.);
    1.5 * hub * hub * cosmo.omega_m
}

// Spline of n(z), rescaled so it integrates to one over the sampled range.
// n(z) is zero outside the samples.
fn normalized_dndz_spline(z_n: &[f64], n: &[f64]) -> Result<SplineParams, CosmoError> {
    let raw = SplineParams::new(z_n, n, 0., 0.)?;
    let norm = raw.integrate(z_n[0], z_n[z_n.len() - 1], EPSREL_DNDZ)?;
    if !(norm > 0.) {
        return Err(CosmoError::Inconsistent {
            reason: "n(z) must have a positive integral".to_string(),
        });
    }
    let normalized: Vec<f64> = n.iter().map(|v| v / norm).collect();
    SplineParams::new(z_n, &normalized, 0., 0.)
}

fn end_clamped_spline(z: &[f64], f: &[f64], what: &str) -> Result<SplineParams, CosmoError> {
    if z.is_empty() || f.is_empty() {
        return Err(CosmoError::Inconsistent {
            reason: format!("no samples given for {}", what),
        });
    }
    SplineParams::new(z, f, f[0], f[f.len() - 1])
}

// Lensing efficiency at one comoving distance:
//   w(chi) = int_chi^chi_max dchi'  H(z')/c n(z') sinn(chi'-chi)/sinn(chi')
// with the extra (1 - 2.5 s(z')) factor when a magnification bias spline
// is given. The chi = 0 limit replaces the distance ratio by one.
fn window_at(
    cosmo: &Cosmology,
    spl_nz: &SplineParams,
    spl_sz: Option<&SplineParams>,
    z_of_chi: &SplineParams,
    chi: f64,
    chi_max: f64,
) -> Result<f64, CosmoError> {
    if chi_max - chi < 1e-12 {
        return Ok(0.);
    }
    let integrand = |chip: f64| {
        let z = z_of_chi.eval(chip);
        let mut weight = cosmo.h_factor(z) * spl_nz.eval(z);
        if let Some(spl_sz) = spl_sz {
            weight *= 1. - 2.5 * spl_sz.eval(z);
        }
        if chi == 0. {
            weight
        } else {
            weight * cosmo.sinn(chip - chi) / cosmo.sinn(chip)
        }
    };
    let min_h = 1e-7;
    adaptive_quadrature::adaptive_simpson_method(integrand, chi, chi_max, min_h, 1e-6).map_err(
        |_| CosmoError::Integration {
            what: "lensing window",
        },
    )
}

// Tabulate the window on an evenly spaced comoving-distance grid and wrap it
// in a spline. Beyond chi_max the window is zero. Redshift as a function of
// distance is itself tabulated first, so the kernel integrand does not have
// to invert the distance integral at every evaluation.
fn tabulate_window(
    cosmo: &Cosmology,
    spl_nz: &SplineParams,
    spl_sz: Option<&SplineParams>,
    chi_max: f64,
    z_max: f64,
) -> Result<SplineParams, CosmoError> {
    let z_grid = linear_spacing(0., z_max, 128)?;
    let mut chi_grid = Vec::with_capacity(z_grid.len());
    for &z in &z_grid {
        chi_grid.push(cosmo.comoving_distance(z)?);
    }
    let z_of_chi = SplineParams::new(&chi_grid, &z_grid, 0., z_max)?;

    let nchi = ((chi_max / DCHI_WINDOW) as usize + 1).max(8);
    let grid = linear_spacing(0., chi_max, nchi)?;
    let mut values = Vec::with_capacity(nchi);
    for &chi in &grid {
        values.push(window_at(cosmo, spl_nz, spl_sz, &z_of_chi, chi, chi_max)?);
    }
    let w0 = values[0];
    SplineParams::new(&grid, &values, w0, 0.)
}
