//! Closed sampling intervals.
//!
//! Every numeric ratio the pipeline draws comes from a [`ParameterRange`]
//! validated at construction, so an inverted interval is rejected before any
//! sampling starts rather than surfacing as a panic inside `rand`.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Real;

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("inverted range: min {min} > max {max}")]
    Inverted { min: Real, max: Real },
    #[error("non-finite range bound")]
    NonFinite,
}

/// Closed interval `[min, max]` with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    min: Real,
    max: Real,
}

impl ParameterRange {
    pub fn new(min: Real, max: Real) -> Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RangeError::NonFinite);
        }
        if min > max {
            return Err(RangeError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    /// The symmetric interval `[-max_abs, max_abs]`.
    pub fn symmetric(max_abs: Real) -> Result<Self, RangeError> {
        Self::new(-max_abs.abs(), max_abs.abs())
    }

    /// A degenerate single-point interval.
    pub fn constant(value: Real) -> Result<Self, RangeError> {
        Self::new(value, value)
    }

    pub fn min(&self) -> Real {
        self.min
    }

    pub fn max(&self) -> Real {
        self.max
    }

    pub fn contains(&self, value: Real) -> bool {
        value >= self.min && value <= self.max
    }

    /// Uniform draw; a degenerate range collapses to its constant.
    pub fn sample(&self, rng: &mut StdRng) -> Real {
        if self.min == self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

/// One [`ParameterRange`] per axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisRanges(pub [ParameterRange; 3]);

impl AxisRanges {
    /// Symmetric per-axis ranges `[-max_i, max_i]`.
    pub fn symmetric(max_abs: [Real; 3]) -> Result<Self, RangeError> {
        Ok(Self([
            ParameterRange::symmetric(max_abs[0])?,
            ParameterRange::symmetric(max_abs[1])?,
            ParameterRange::symmetric(max_abs[2])?,
        ]))
    }

    /// Draw one value per axis, in axis order.
    pub fn sample(&self, rng: &mut StdRng) -> [Real; 3] {
        [
            self.0[0].sample(rng),
            self.0[1].sample(rng),
            self.0[2].sample(rng),
        ]
    }

    pub fn contains(&self, values: [Real; 3]) -> bool {
        self.0[0].contains(values[0])
            && self.0[1].contains(values[1])
            && self.0[2].contains(values[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn inverted_range_rejected() {
        assert!(matches!(
            ParameterRange::new(2.0, 1.0),
            Err(RangeError::Inverted { .. })
        ));
    }

    #[test]
    fn degenerate_range_is_constant() {
        let r = ParameterRange::constant(0.25).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(r.sample(&mut rng), 0.25);
        }
    }

    #[test]
    fn samples_stay_in_bounds() {
        let r = ParameterRange::new(-1.5, 3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(r.contains(r.sample(&mut rng)));
        }
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let r = ParameterRange::new(0.0, 1.0).unwrap();
        let a: Vec<Real> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..16).map(|_| r.sample(&mut rng)).collect()
        };
        let b: Vec<Real> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..16).map(|_| r.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
