//! Memoized H0 calibrations.
//!
//! Calibration dominates the cost of every sweep (each bisection step is one
//! or two adaptive integrals), so results are kept per
//! `(constant-set fingerprint, model bit pattern)`. The cache is `Sync` and is
//! shared by reference across rayon workers.
//!
//! Only successful calibrations are stored; a failing tuple is re-evaluated
//! (and fails again) on the next lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::domain::{Calibration, Cosmology, Model, ModelKey};
use crate::error::ModelError;

use super::calibrate::find_h0;

type CacheKey = (u64, ModelKey);

#[derive(Debug, Default)]
pub struct CalibrationCache {
    entries: RwLock<HashMap<CacheKey, Calibration>>,
    solves: AtomicUsize,
}

impl CalibrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached calibration for `(cosmo, model)`, calibrating on a miss.
    ///
    /// Two workers missing on the same key at the same time may both solve;
    /// the results are identical and the first insert wins.
    pub fn get_or_calibrate(&self, cosmo: &Cosmology, model: Model) -> Result<Calibration, ModelError> {
        let key = (cosmo.fingerprint(), model.key());

        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied();
        if let Some(calibration) = cached {
            return Ok(calibration);
        }

        let calibration = find_h0(cosmo, model)?;
        self.solves.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(*entries.entry(key).or_insert(calibration))
    }

    /// Number of cached calibrations.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times the calibrator actually ran.
    pub fn solves(&self) -> usize {
        self.solves.load(Ordering::Relaxed)
    }
}
