//! Bracketed bisection.
//!
//! The calibrator solves a single monotonic scalar equation `r(x) = 0` on a
//! fixed bracket. Which bound moves is decided from the residual signs at the
//! bracket ends, so the same routine works for statistics that increase with
//! `x` and for statistics that decrease with `x`.
//!
//! Termination:
//! - early exit as soon as `|r(mid)| ≤ tolerance`
//! - otherwise a soft cap of `max_iterations` midpoints, after which the last
//!   midpoint is returned with `converged = false`

use thiserror::Error;

/// Failure of a bracketed root search.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error("invalid bracket [{lo}, {hi}]")]
    InvalidBracket { lo: f64, hi: f64 },

    #[error("invalid solver settings: tolerance = {tolerance}, max_iterations = {max_iterations}")]
    InvalidSettings { tolerance: f64, max_iterations: usize },

    #[error(
        "residual does not change sign over [{lo}, {hi}] \
         (r(lo) = {residual_lo:e}, r(hi) = {residual_hi:e}); \
         the statistic is not monotonic or the model is unphysical"
    )]
    NotBracketed {
        lo: f64,
        hi: f64,
        residual_lo: f64,
        residual_hi: f64,
    },

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },
}

/// Stopping rules for [`bisect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Outcome of a bisection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    pub root: f64,
    /// Residual at `root`.
    pub residual: f64,
    pub iterations: usize,
    /// `false` when the iteration cap was reached before `|residual| ≤ tolerance`.
    pub converged: bool,
}

/// Find a root of `residual` in `[lo, hi]`.
///
/// The residual closure may fail (e.g. an integral inside it does not
/// converge); such failures are propagated unchanged.
pub fn bisect<F, E>(mut residual: F, lo: f64, hi: f64, opts: BisectOptions) -> Result<Bisection, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<CalibrationError>,
{
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(CalibrationError::InvalidBracket { lo, hi }.into());
    }
    if !(opts.tolerance.is_finite() && opts.tolerance > 0.0) || opts.max_iterations == 0 {
        return Err(CalibrationError::InvalidSettings {
            tolerance: opts.tolerance,
            max_iterations: opts.max_iterations,
        }
        .into());
    }

    let mut eval = |x: f64| -> Result<f64, E> {
        let r = residual(x)?;
        if r.is_finite() {
            Ok(r)
        } else {
            Err(CalibrationError::NonFiniteResidual { x, residual: r }.into())
        }
    };

    let residual_lo = eval(lo)?;
    let residual_hi = eval(hi)?;

    let lo_positive = if residual_lo == 0.0 {
        residual_hi < 0.0
    } else {
        residual_lo > 0.0
    };
    let hi_positive = residual_hi > 0.0 || (residual_hi == 0.0 && !lo_positive);
    if lo_positive == hi_positive {
        return Err(CalibrationError::NotBracketed {
            lo,
            hi,
            residual_lo,
            residual_hi,
        }
        .into());
    }

    let (mut a, mut b) = (lo, hi);
    let mut last = Bisection {
        root: 0.5 * (a + b),
        residual: f64::NAN,
        iterations: 0,
        converged: false,
    };

    for iteration in 1..=opts.max_iterations {
        let mid = 0.5 * (a + b);
        let r = eval(mid)?;
        tracing::trace!(iteration, x = mid, residual = r, "bisection step");

        last = Bisection {
            root: mid,
            residual: r,
            iterations: iteration,
            converged: r.abs() <= opts.tolerance,
        };
        if last.converged {
            return Ok(last);
        }

        if (r > 0.0) == lo_positive {
            a = mid;
        } else {
            b = mid;
        }
    }

    Ok(last)
}
