//! Light emission sampling.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use endosynth_core::{Iso3, LightParams, Real};

/// One scene light: emission strength plus a camera-relative transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDescriptor {
    /// Emission strength drawn from the configured range.
    pub emission: Real,
    /// Transform relative to the camera frame; the light rides with the
    /// endoscope tip.
    pub transform: Iso3,
}

/// Draw the light descriptor. A degenerate emission range collapses to a
/// constant; there is no validity check beyond range containment.
pub fn sample_light(light: &LightParams, rng: &mut StdRng) -> LightDescriptor {
    LightDescriptor {
        emission: light.emission.sample(rng),
        transform: Iso3::identity(),
    }
}
