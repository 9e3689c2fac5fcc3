//! Adaptive Gauss–Kronrod quadrature.
//!
//! Every distance and sound-horizon integral in the crate goes through
//! [`integrate`]. The rule is the 21-point Kronrod extension of the 10-point
//! Gauss rule; the difference between the two estimates is used as the local
//! error. The subinterval with the largest error is bisected until the total
//! error satisfies:
//!
//! ```text
//! error ≤ max(abs_tol, rel_tol · |I|)
//! ```
//!
//! Numerical notes:
//! - A semi-infinite upper bound `b = +∞` is mapped onto `(0, 1]` with
//!   `z = a + (1 - t)/t`, `dz = dt/t²`. The Kronrod nodes never touch the
//!   endpoints, so `t = 0` is never evaluated.
//! - Steep but integrable features (the sign flip of the dark-energy ratio,
//!   the radiation era near recombination) only cost extra subdivisions.
//! - Running out of subdivisions is an error, never a silent approximation.

use thiserror::Error;

/// Kronrod abscissae on `[0, 1]` (symmetric rule, centre last).
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// Kronrod weights matching [`XGK`].
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_208_067_774_949,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// 10-point Gauss weights for the odd Kronrod nodes `XGK[1], XGK[3], ..., XGK[9]`.
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

/// Failure of a definite integral.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum IntegrationError {
    #[error("invalid integration bounds [{a}, {b}]")]
    InvalidBounds { a: f64, b: f64 },

    #[error("integrand is not finite at x = {x} (value {value})")]
    NonFinite { x: f64, value: f64 },

    #[error(
        "integral did not converge after {subdivisions} subintervals \
         (estimate {estimate:e}, error {error:e})"
    )]
    NotConverged {
        estimate: f64,
        error: f64,
        subdivisions: usize,
    },
}

/// Accuracy requirements for [`integrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadOptions {
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Maximum number of subintervals kept by the adaptive loop.
    pub max_subdivisions: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            abs_tol: 1e-14,
            rel_tol: 1e-10,
            max_subdivisions: 1000,
        }
    }
}

/// Result of a converged integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    /// Estimated absolute error.
    pub error: f64,
    /// Number of subintervals in the final partition.
    pub subdivisions: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// Integrate `f` over `[a, b]`.
///
/// `a` must be finite; `b` may be `+∞`. For `b < a` the negated integral over
/// `[b, a]` is returned, and `a == b` gives exactly zero.
pub fn integrate<F>(f: F, a: f64, b: f64, opts: &QuadOptions) -> Result<Quadrature, IntegrationError>
where
    F: Fn(f64) -> f64,
{
    if a.is_nan() || b.is_nan() || !a.is_finite() || b == f64::NEG_INFINITY {
        return Err(IntegrationError::InvalidBounds { a, b });
    }

    if b == f64::INFINITY {
        // z = a + (1 - t)/t maps t ∈ (0, 1] onto [a, ∞).
        let mapped = |t: f64| {
            let z = a + (1.0 - t) / t;
            f(z) / (t * t)
        };
        return adaptive(mapped, 0.0, 1.0, opts).map_err(|e| match e {
            IntegrationError::NonFinite { x, value } => IntegrationError::NonFinite {
                x: a + (1.0 - x) / x,
                value,
            },
            other => other,
        });
    }

    if a == b {
        return Ok(Quadrature {
            value: 0.0,
            error: 0.0,
            subdivisions: 0,
        });
    }

    if b < a {
        let q = adaptive(f, b, a, opts)?;
        return Ok(Quadrature { value: -q.value, ..q });
    }

    adaptive(f, a, b, opts)
}

fn adaptive<F>(f: F, a: f64, b: f64, opts: &QuadOptions) -> Result<Quadrature, IntegrationError>
where
    F: Fn(f64) -> f64,
{
    let limit = opts.max_subdivisions.max(1);
    let mut segments = vec![kronrod21(&f, a, b)?];

    loop {
        let value: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();

        if !value.is_finite() {
            return Err(IntegrationError::NonFinite { x: (a + b) / 2.0, value });
        }
        if error <= opts.abs_tol.max(opts.rel_tol * value.abs()) {
            return Ok(Quadrature {
                value,
                error,
                subdivisions: segments.len(),
            });
        }

        let not_converged = IntegrationError::NotConverged {
            estimate: value,
            error,
            subdivisions: segments.len(),
        };
        if segments.len() >= limit {
            return Err(not_converged);
        }

        // Split the worst segment.
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);

        // The interval cannot be halved any further in f64.
        if !(mid > seg.a && mid < seg.b) {
            return Err(not_converged);
        }

        segments.push(kronrod21(&f, seg.a, mid)?);
        segments.push(kronrod21(&f, mid, seg.b)?);
    }
}

/// Apply the 21-point Kronrod rule (and its embedded 10-point Gauss rule) on `[a, b]`.
fn kronrod21<F>(f: &F, a: f64, b: f64) -> Result<Segment, IntegrationError>
where
    F: Fn(f64) -> f64,
{
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let eval = |x: f64| {
        let value = f(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(IntegrationError::NonFinite { x, value })
        }
    };

    let f_centre = eval(centre)?;
    let mut kronrod = WGK[10] * f_centre;
    let mut gauss = 0.0;

    for (j, (&x, &w)) in XGK.iter().zip(WGK.iter()).take(10).enumerate() {
        let dx = half * x;
        let pair = eval(centre - dx)? + eval(centre + dx)?;
        kronrod += w * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    let value = kronrod * half;
    let error = ((kronrod - gauss) * half).abs();
    Ok(Segment { a, b, value, error })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> QuadOptions {
        QuadOptions::default()
    }

    #[test]
    fn polynomial_is_integrated_exactly() {
        // x^5 - 2x^2 + 1 over [0, 2] = 64/6 - 16/3 + 2.
        let q = integrate(|x| x.powi(5) - 2.0 * x * x + 1.0, 0.0, 2.0, &opts()).unwrap();
        let exact = 64.0 / 6.0 - 16.0 / 3.0 + 2.0;
        assert!((q.value - exact).abs() < 1e-12, "got {}", q.value);
    }

    #[test]
    fn zero_width_interval_is_exactly_zero() {
        let q = integrate(|x| x.exp(), 1.5, 1.5, &opts()).unwrap();
        assert_eq!(q.value, 0.0);
        assert_eq!(q.subdivisions, 0);
    }

    #[test]
    fn reversed_bounds_negate() {
        let fwd = integrate(|x| x.sin(), 0.0, 2.0, &opts()).unwrap();
        let rev = integrate(|x| x.sin(), 2.0, 0.0, &opts()).unwrap();
        assert!((fwd.value + rev.value).abs() < 1e-14);
        assert!((fwd.value - (1.0 - 2.0_f64.cos())).abs() < 1e-12);
    }

    #[test]
    fn semi_infinite_interval() {
        // ∫_1^∞ dx / x² = 1
        let q = integrate(|x| 1.0 / (x * x), 1.0, f64::INFINITY, &opts()).unwrap();
        assert!((q.value - 1.0).abs() < 1e-10, "got {}", q.value);

        // ∫_0^∞ e^{-x} dx = 1
        let q = integrate(|x| (-x).exp(), 0.0, f64::INFINITY, &opts()).unwrap();
        assert!((q.value - 1.0).abs() < 1e-10, "got {}", q.value);
    }

    #[test]
    fn jump_discontinuity_converges_with_subdivision() {
        let step = |x: f64| if x < 1.0 / 3.0 { 1.0 } else { 2.0 };
        let q = integrate(step, 0.0, 1.0, &opts()).unwrap();
        assert!((q.value - 5.0 / 3.0).abs() < 1e-9, "got {}", q.value);
        assert!(q.subdivisions > 1);
    }

    #[test]
    fn non_finite_integrand_is_reported() {
        let err = integrate(|x| (x - 1.0).sqrt(), 0.0, 2.0, &opts()).unwrap_err();
        assert!(matches!(err, IntegrationError::NonFinite { .. }), "got {err:?}");
    }

    #[test]
    fn subdivision_budget_is_an_error() {
        let tight = QuadOptions {
            abs_tol: 0.0,
            rel_tol: 1e-15,
            max_subdivisions: 2,
        };
        let err = integrate(|x| if x < 0.3 { 0.0 } else { 1.0 }, 0.0, 1.0, &tight).unwrap_err();
        assert!(matches!(err, IntegrationError::NotConverged { .. }), "got {err:?}");
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let err = integrate(|x| x, f64::NAN, 1.0, &opts()).unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidBounds { .. }));
        let err = integrate(|x| x, f64::INFINITY, 1.0, &opts()).unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidBounds { .. }));
    }
}
