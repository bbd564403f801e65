use integrate::adaptive_quadrature;
use libm::{sinh, sqrt};
use roots::find_root_brent;
use roots::SimpleConvergency;

use crate::constants::{EPSREL_DIST, EPSREL_GROWTH, EPS_SCALEFAC_GROWTH, SPEED_OF_LIGHT};
use crate::error::CosmoError;

/// Background cosmology. Distances are in Mpc, H0 in km/s/Mpc.
pub struct Cosmology {
    pub omega_m: f64,
    pub omega_k: f64,
    pub omega_l: f64,
    pub h0: f64,
    /// Spectral index of the primordial power spectrum.
    pub n_s: f64,
    /// Amplitude of matter fluctuations in 8 Mpc/h spheres at z = 0.
    pub sigma8: f64,
}

impl Cosmology {
    pub fn e_func(&self, z: f64) -> f64 {
        (self.omega_m * (1.0 + z).powi(3) + self.omega_k * (1.0 + z).powi(2) + self.omega_l).sqrt()
    }

    /// E(a) for scale factor a = 1/(1+z).
    pub fn e_func_a(&self, a: f64) -> f64 {
        self.e_func(1. / a - 1.)
    }

    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT / self.h0
    }

    pub fn h_at_z(&self, z: f64) -> f64 {
        self.h0 * self.e_func(z)
    }

    /// H(z)/c in 1/Mpc. This is dz/dchi, the factor that turns a redshift
    /// distribution into a distribution over comoving distance.
    pub fn h_factor(&self, z: f64) -> f64 {
        self.h_at_z(z) / SPEED_OF_LIGHT
    }

    pub fn comoving_distance(&self, z: f64) -> Result<f64, CosmoError> {
        if z < 1e-7 {
            return Ok(0.);
        }
        let min_h = 1e-7;
        let f = |z: f64| 1. / self.e_func(z);
        let integral = adaptive_quadrature::adaptive_simpson_method(f, 0.0, z, min_h, EPSREL_DIST)
            .map_err(|_| CosmoError::Integration {
                what: "comoving distance",
            })?;
        Ok(self.hubble_distance() * integral)
    }

    /// Scale factor at a given comoving distance, by Brent inversion of
    /// the distance integral.
    pub fn scale_factor_of_chi(&self, chi: f64) -> Result<f64, CosmoError> {
        if chi <= 0. {
            return Ok(1.);
        }
        let f = |z: f64| match self.comoving_distance(z) {
            Ok(d) => d - chi,
            Err(_) => f64::NAN,
        };
        let mut convergency = SimpleConvergency {
            eps: 1e-8f64,
            max_iter: 60,
        };
        let z = find_root_brent(1e-9, 1200., &f, &mut convergency).map_err(|_| {
            CosmoError::Root {
                what: "scale factor of chi",
            }
        })?;
        Ok(1. / (1. + z))
    }

    /// Curvature-dependent transverse comoving distance for a radial
    /// comoving distance `chi`. Reduces to `chi` when the universe is flat.
    pub fn sinn(&self, chi: f64) -> f64 {
        let h_dist = self.hubble_distance();
        match self.omega_k {
            val if val > 0. => h_dist / sqrt(val) * sinh(sqrt(val) * chi / h_dist),
            val if val < 0. => h_dist / sqrt(-val) * (sqrt(-val) * chi / h_dist).sin(),
            _ => chi,
        }
    }

    // int_0^a da' / (a' E(a'))^3, the integral behind the growing mode.
    fn growth_integral(&self, a: f64) -> Result<f64, CosmoError> {
        let min_h = 1e-9;
        let f = |ap: f64| {
            if ap <= 0. {
                return 0.;
            }
            let ae = ap * self.e_func_a(ap);
            1. / (ae * ae * ae)
        };
        adaptive_quadrature::adaptive_simpson_method(f, 0.0, a, min_h, EPSREL_GROWTH).map_err(
            |_| CosmoError::Integration {
                what: "growth factor",
            },
        )
    }

    // Unnormalized growth, 2.5 * Omega_m * E(a) * growth_integral(a).
    // For Einstein-de Sitter this is exactly a.
    fn growth_unnorm(&self, a: f64) -> Result<f64, CosmoError> {
        Ok(2.5 * self.omega_m * self.e_func_a(a) * self.growth_integral(a)?)
    }

    /// Linear growth factor D(a), normalized so that D(1) = 1.
    pub fn growth_factor(&self, a: f64) -> Result<f64, CosmoError> {
        Ok(self.growth_unnorm(a)? / self.growth_unnorm(1.)?)
    }

    /// Logarithmic growth rate f = dlnD/dlna, differentiating the growing
    /// mode in closed form:
    ///   f = dlnE/dlna + 1 / (a^2 E^3 * growth_integral(a)).
    pub fn growth_rate(&self, a: f64) -> Result<f64, CosmoError> {
        let a = a.max(EPS_SCALEFAC_GROWTH);
        let e = self.e_func_a(a);
        let dlne_dlna =
            -(3. * self.omega_m / a.powi(3) + 2. * self.omega_k / a.powi(2)) / (2. * e * e);
        let integral = self.growth_integral(a)?;
        Ok(dlne_dlna + 1. / (a * a * e * e * e * integral))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_lcdm() -> Cosmology {
        Cosmology {
            omega_m: 0.3,
            omega_k: 0.,
            omega_l: 0.7,
            h0: 70.,
            n_s: 0.96,
            sigma8: 0.8,
        }
    }

    #[test]
    fn test_e_func_basic_lcdm() {
        let e = flat_lcdm().e_func(0.3);
        assert!((e - 1.16580444329227).abs() < 1e-5);
    }

    #[test]
    fn testing_flat_cosmo_versus_celestial() {
        // Same reference value as the celestial R package.
        let cosmo = flat_lcdm();
        let chi = cosmo.comoving_distance(0.3).unwrap();
        assert!((chi - 1194.397).abs() < 1e-2);
        // Flat universe, so sinn is the identity.
        assert!((cosmo.sinn(chi) - chi).abs() < 1e-10);
    }

    #[test]
    fn testing_scale_factor_of_chi_inverts_the_distance() {
        let cosmo = flat_lcdm();
        let z = 0.3;
        let chi = cosmo.comoving_distance(z).unwrap();
        let a = cosmo.scale_factor_of_chi(chi).unwrap();
        assert!((1. / a - 1. - z).abs() < 1e-6);
        assert_eq!(cosmo.scale_factor_of_chi(0.).unwrap(), 1.);
    }

    #[test]
    fn testing_h_at_z() {
        // Comparing to celestials h grow function with a flat cosmology.
        let cosmo = Cosmology {
            omega_m: 0.3,
            omega_k: 0.,
            omega_l: 0.7,
            h0: 100.,
            n_s: 0.96,
            sigma8: 0.8,
        };
        assert!((cosmo.h_at_z(0.3) - 116.5804).abs() < 1e-4);
    }

    #[test]
    fn growth_in_einstein_de_sitter_is_the_scale_factor() {
        let cosmo = Cosmology {
            omega_m: 1.,
            omega_k: 0.,
            omega_l: 0.,
            h0: 70.,
            n_s: 1.,
            sigma8: 0.8,
        };
        for &a in &[0.1, 0.25, 0.5, 0.9] {
            assert!((cosmo.growth_factor(a).unwrap() - a).abs() < 1e-4);
            assert!((cosmo.growth_rate(a).unwrap() - 1.).abs() < 1e-3);
        }
    }

    #[test]
    fn growth_is_normalized_and_suppressed_in_lcdm() {
        let cosmo = flat_lcdm();
        assert!((cosmo.growth_factor(1.).unwrap() - 1.).abs() < 1e-10);
        // Dark energy suppresses growth relative to EdS: D(a) > a at a < 1
        // once normalized to D(1) = 1, and 0 < f < 1 today.
        let a = 0.5;
        assert!(cosmo.growth_factor(a).unwrap() > a);
        let f = cosmo.growth_rate(1.).unwrap();
        assert!(f > 0.4 && f < 1.);
    }

    #[test]
    fn curved_sinn_branches() {
        let open = Cosmology {
            omega_m: 0.3,
            omega_k: 0.1,
            omega_l: 0.6,
            h0: 70.,
            n_s: 0.96,
            sigma8: 0.8,
        };
        let closed = Cosmology {
            omega_k: -0.1,
            ..open
        };
        let chi = 1000.;
        // sinh grows faster than its argument, sin slower.
        assert!(open.sinn(chi) > chi);
        assert!(closed.sinn(chi) < chi);
    }
}
