//! Closed-form redshift fits of Hu & Sugiyama (1996), astro-ph/9510117.
//!
//! Both depend only on the physical baryon and matter densities.

/// Redshift of the last scattering surface z*.
pub fn z_star(omega_b: f64, omega_m: f64) -> f64 {
    let g1 = 0.0783 * omega_b.powf(-0.238) / (1.0 + 39.5 * omega_b.powf(0.763));
    let g2 = 0.56 / (1.0 + 21.1 * omega_b.powf(1.81));
    1048.0 * (1.0 + 0.00124 * omega_b.powf(-0.738)) * (1.0 + g1 * omega_m.powf(g2))
}

/// Redshift of the baryon drag epoch z_d.
pub fn z_drag(omega_b: f64, omega_m: f64) -> f64 {
    let b1 = 0.313 * omega_m.powf(-0.419) * (1.0 + 0.607 * omega_m.powf(0.674));
    let b2 = 0.238 * omega_m.powf(0.223);
    let b3 = omega_m.powf(0.251) / (1.0 + 0.659 * omega_m.powf(0.828));
    1345.0 * b3 * (1.0 + b1 * omega_b.powf(b2))
}
