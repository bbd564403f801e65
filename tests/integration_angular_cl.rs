use limber::{angular_cl, angular_cl_spectrum, ClTracer, Cosmology, MatterPower};

fn read_dndz() -> (Vec<f64>, Vec<f64>) {
    let rdr = csv::Reader::from_path("tests/test_dndz.csv");

    let mut zs = Vec::new();
    let mut ns = Vec::new();
    for result in rdr.expect("No file").records() {
        let record = result.unwrap();
        zs.push(record[0].parse::<f64>().unwrap());
        ns.push(record[1].parse::<f64>().unwrap());
    }
    (zs, ns)
}

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
fn spectra_from_a_sampled_source_distribution() {
    let (zs, ns) = read_dndz();
    assert!(zs.len() > 10);

    let cosmo = flat_lcdm();
    let power = MatterPower::new(&cosmo).unwrap();

    let bias = vec![1.4; zs.len()];
    let counts = ClTracer::number_counts(&cosmo, &zs, &ns, &zs, &bias, false).unwrap();
    let shear = ClTracer::lensing(&cosmo, &zs, &ns).unwrap();

    let ells = [20, 50];
    let counts_auto = angular_cl_spectrum(&cosmo, &power, &ells, &counts, &counts).unwrap();
    assert_eq!(counts_auto.len(), ells.len());
    for cl in &counts_auto {
        assert!(cl.is_finite());
        assert!(*cl > 0.);
    }

    let shear_auto = angular_cl(&cosmo, &power, 50, &shear, &shear).unwrap();
    assert!(shear_auto.is_finite());
    assert!(shear_auto > 0.);

    // Galaxies trace the same matter the shear responds to, so the cross
    // spectrum is non-negative and symmetric in the tracer order.
    let cross = angular_cl(&cosmo, &power, 50, &counts, &shear).unwrap();
    let cross_flipped = angular_cl(&cosmo, &power, 50, &shear, &counts).unwrap();
    assert!(cross >= 0.);
    assert!((cross - cross_flipped).abs() <= 1e-10 * cross.abs().max(1e-30));
}

#[test]
fn bias_scales_the_counts_spectrum_quadratically() {
    let (zs, ns) = read_dndz();
    let cosmo = flat_lcdm();
    let power = MatterPower::new(&cosmo).unwrap();

    let unit_bias = vec![1.0; zs.len()];
    let double_bias = vec![2.0; zs.len()];
    let t1 = ClTracer::number_counts(&cosmo, &zs, &ns, &zs, &unit_bias, false).unwrap();
    let t2 = ClTracer::number_counts(&cosmo, &zs, &ns, &zs, &double_bias, false).unwrap();

    let c1 = angular_cl(&cosmo, &power, 30, &t1, &t1).unwrap();
    let c2 = angular_cl(&cosmo, &power, 30, &t2, &t2).unwrap();
    assert!((c2 / c1 - 4.).abs() < 1e-3);
}
