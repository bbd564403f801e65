//! Physical constants, unit conversions and numerical tuning parameters.
//!
//! These are the values republished by the symbol table in [`crate::symbols`],
//! so host-language wrappers see exactly what the core computes with.

pub const SPEED_OF_LIGHT: f64 = 299_792.458; // km/s
pub const CLIGHT_HMPC: f64 = 2997.92458; // c in units of 100 km/s, i.e. c/H0 in Mpc for h = 1
pub const GNEWT: f64 = 6.67384e-11; // m^3 kg^-1 s^-2
pub const MPC_TO_METER: f64 = 3.08567758e22;
pub const PC_TO_METER: f64 = 3.08567758e16;
pub const SOLAR_MASS: f64 = 1.9891e30; // kg
pub const RHO_CRITICAL: f64 = 2.7744948e11; // h^2 Msun / Mpc^3

/// Pivot scale for the primordial power-law tilt, 1/Mpc.
pub const K_PIVOT: f64 = 0.05;

// Relative tolerances for the adaptive quadrature routines.
pub const EPSREL_DIST: f64 = 1e-6;
pub const EPSREL_GROWTH: f64 = 1e-6;
pub const EPSREL_DNDZ: f64 = 1e-6;

/// Smallest scale factor the growth computations evaluate at.
pub const EPS_SCALEFAC_GROWTH: f64 = 1e-6;

// Redshift range over which the analytic source distributions are defined.
pub const Z_MIN_SOURCES: f64 = 0.1;
pub const Z_MAX_SOURCES: f64 = 3.0;

// Wavenumber bounds used to clip the Limber integration interval, 1/Mpc.
pub const K_MIN_DEFAULT: f64 = 5e-5;
pub const K_MAX: f64 = 1e3;

/// Spacing of the comoving-distance grid the lensing windows are tabulated on, Mpc.
pub const DCHI_WINDOW: f64 = 5.0;
